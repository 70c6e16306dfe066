//! Heuristic PII detection on user questions.
//!
//! The built-in detector flags capitalized two-word sequences as likely
//! personal names. It is a weak approximation (false positives on any
//! capitalized phrase, false negatives on single names), so it lives
//! behind a trait and a stronger detector can be substituted without
//! touching the engine. Detection never blocks a question; it only
//! annotates the response.

use regex::Regex;

/// Detects personally identifying information in text.
pub trait PiiDetector: Send + Sync {
    /// Whether the text appears to contain PII.
    fn detect(&self, text: &str) -> bool;
}

/// Flags capitalized two-word sequences such as "Jane Doe".
#[derive(Debug)]
pub struct NameHeuristicDetector {
    pattern: Regex,
}

impl NameHeuristicDetector {
    /// Create the detector.
    pub fn new() -> Self {
        // Two consecutive capitalized words.
        let pattern = Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").expect("valid name pattern");
        Self { pattern }
    }
}

impl Default for NameHeuristicDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PiiDetector for NameHeuristicDetector {
    fn detect(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}
