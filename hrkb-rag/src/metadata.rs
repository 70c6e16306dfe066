//! Metadata tagging for freshly chunked text.

use chrono::{Local, NaiveDate};

use crate::document::{ChunkMetadata, SourceKind};

/// Optional provenance fields supplied by the caller at ingestion time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagOptions {
    /// Date after which the content should be considered stale.
    pub valid_until: Option<NaiveDate>,
    /// Document version label.
    pub version: Option<String>,
}

/// Pair ordered chunk texts with provenance metadata.
///
/// `upload_date` is stamped once at call time, so every chunk from one call
/// shares identical `source`, `kind`, and `upload_date`. Pure aside from
/// the date read.
pub fn tag_chunks(
    chunks: Vec<(String, Option<u32>)>,
    source: &str,
    kind: SourceKind,
    options: &TagOptions,
) -> Vec<(String, ChunkMetadata)> {
    let upload_date = Local::now().date_naive();
    tag_chunks_on(chunks, source, kind, options, upload_date)
}

/// [`tag_chunks`] with an explicit date, for deterministic tests.
pub fn tag_chunks_on(
    chunks: Vec<(String, Option<u32>)>,
    source: &str,
    kind: SourceKind,
    options: &TagOptions,
    upload_date: NaiveDate,
) -> Vec<(String, ChunkMetadata)> {
    chunks
        .into_iter()
        .map(|(text, page)| {
            let metadata = ChunkMetadata {
                source: source.to_string(),
                kind,
                upload_date,
                page,
                valid_until: options.valid_until,
                version: options.version.clone(),
            };
            (text, metadata)
        })
        .collect()
}
