//! Data types for documents, chunks, and search results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of content a source holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// An uploaded file (PDF, DOCX, plain text).
    Document,
    /// A scraped web page.
    Webpage,
    /// An HR policy document.
    Policy,
    /// A how-to guide.
    Guide,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceKind::Document => "document",
            SourceKind::Webpage => "webpage",
            SourceKind::Policy => "policy",
            SourceKind::Guide => "guide",
        };
        f.write_str(s)
    }
}

/// Provenance metadata attached to every chunk.
///
/// All chunks sharing the same `source` belong to one logical document and
/// are deleted or replaced as a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Filename or URL identifying the parent document.
    pub source: String,
    /// The kind of content.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// The date the chunk was ingested.
    pub upload_date: NaiveDate,
    /// Page number within the parent document, where the loader provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Date after which the content should be considered stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    /// Document version label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A segment of a document with its vector embedding — the atomic
/// retrievable unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, assigned at insertion.
    pub id: String,
    /// The chunk's literal text content.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Position of this chunk within its parent document (source order).
    pub chunk_index: usize,
    /// Provenance metadata.
    pub metadata: ChunkMetadata,
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// Per-source summary reported by the document catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSummary {
    /// The source identifier.
    pub source: String,
    /// The kind of content.
    pub kind: SourceKind,
    /// The date the source was ingested.
    pub upload_date: NaiveDate,
    /// Number of chunks stored for this source.
    pub chunk_count: u64,
}

/// One contiguous piece of loaded document text.
///
/// Loaders that know about pages (PDF) produce one segment per page;
/// other formats produce a single segment with no page number.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The segment's text.
    pub text: String,
    /// One-based page number, where the format provides one.
    pub page: Option<u32>,
}

/// Raw document content ready for ingestion: ordered text segments.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// Ordered segments in source order.
    pub segments: Vec<Segment>,
}

impl LoadedDocument {
    /// Create a document from a single block of text with no page numbers.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { segments: vec![Segment { text: text.into(), page: None }] }
    }
}
