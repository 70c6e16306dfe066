//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`],
//! which splits text hierarchically by a priority list of separators
//! (paragraph break, line break, sentence terminator, space) and falls
//! back to a hard character cut when no separator applies.

/// A strategy for splitting document text into ordered chunks.
///
/// Implementations produce plain text pieces; metadata and embeddings are
/// attached later by the pipeline. Output order matches source order.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` for empty input. No returned chunk is empty.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Separator priority list, most structural first. The empty-string hard
/// cut is the implicit final fallback.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits text hierarchically: paragraphs, then lines, then sentences,
/// then words, then a hard character cut.
///
/// Splitting prefers the earliest separator in the priority list that keeps
/// a chunk under `chunk_size` characters. Separators stay attached to the
/// preceding piece, so concatenating the output of a separator-based split
/// reconstructs the input exactly. Only the hard-cut fallback introduces
/// overlap, of exactly `chunk_overlap` characters between neighbors.
///
/// # Example
///
/// ```rust,ignore
/// use hrkb_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 200);
/// let chunks = chunker.split(&policy_text);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — overlapping characters between hard-cut neighbors
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        split_and_merge(text, self.chunk_size, self.chunk_overlap, &SEPARATORS)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split text by a separator, then merge pieces into chunks that respect
/// `chunk_size`. A merged run that still exceeds `chunk_size` is split
/// further using the next separator in the list.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }
    if separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];

    let segments = split_keeping_separator(text, separator);
    if segments.len() <= 1 {
        // This separator does not occur here — try the next one.
        return split_and_merge(text, chunk_size, chunk_overlap, remaining_separators);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if char_len(&current) + char_len(segment) <= chunk_size {
            current.push_str(segment);
        } else {
            // Current chunk is full — process it
            flush(current, chunk_size, chunk_overlap, remaining_separators, &mut chunks);
            current = segment.to_string();
        }
    }

    if !current.is_empty() {
        flush(current, chunk_size, chunk_overlap, remaining_separators, &mut chunks);
    }

    chunks
}

/// Emit a completed run, recursing into finer separators if it is oversize.
fn flush(
    run: String,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
    chunks: &mut Vec<String>,
) {
    if char_len(&run) > chunk_size {
        chunks.extend(split_and_merge(&run, chunk_size, chunk_overlap, separators));
    } else {
        chunks.push(run);
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding piece, so no characters are lost.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Hard character cut with overlap. Operates on char boundaries.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 20);
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = RecursiveChunker::new(100, 20);
        assert_eq!(chunker.split("hello world"), vec!["hello world".to_string()]);
    }

    #[test]
    fn paragraph_split_reconstructs_input() {
        let text = "first paragraph here.\n\nsecond paragraph follows.\n\nand a third one.";
        let chunker = RecursiveChunker::new(30, 5);
        let chunks = chunker.split(text);
        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn prefers_structural_separators_over_hard_cut() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunker = RecursiveChunker::new(20, 4);
        let chunks = chunker.split(text);
        // Word-boundary splitting keeps every chunk within the size limit
        // and loses nothing.
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20, "oversize chunk: {chunk:?}");
        }
    }

    #[test]
    fn hard_cut_applies_exact_overlap() {
        // No separators at all forces the character-cut fallback.
        let text = "a".repeat(25);
        let chunks = split_by_size(&text, 10, 3);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let suffix: String = prev[prev.len() - 3..].iter().collect();
            let prefix: String = next[..3].iter().collect();
            assert_eq!(suffix, prefix);
        }
        // Stripping the 3-char overlap from every chunk after the first
        // reconstructs the input.
        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.chars().skip(3));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn hard_cut_is_char_boundary_safe() {
        let text = "héllo wörld ".repeat(40).replace(' ', "");
        let chunker = RecursiveChunker::new(16, 4);
        // Must not panic on multibyte characters.
        let chunks = chunker.split(&text);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn output_order_matches_source_order() {
        let text = (0..50).map(|i| format!("sentence number {i}. ")).collect::<String>();
        let chunker = RecursiveChunker::new(80, 10);
        let chunks = chunker.split(&text);
        let mut last_pos = 0;
        for chunk in &chunks {
            let pos = text[last_pos..].find(chunk.as_str()).map(|p| p + last_pos);
            let pos = pos.expect("chunk text not found in source order");
            assert!(pos >= last_pos);
            last_pos = pos;
        }
    }
}
