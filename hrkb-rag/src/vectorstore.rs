//! Vector store trait for persisting and searching embedded chunks.

use async_trait::async_trait;

use crate::document::{Chunk, ChunkMetadata, SearchResult};
use crate::error::Result;

/// One page of a [`scroll`](VectorStore::scroll) over a collection:
/// chunk ids with their metadata, no vectors or text.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    /// The records on this page, in store order.
    pub records: Vec<(String, ChunkMetadata)>,
    /// Opaque token for the next page, or `None` when exhausted.
    pub next_offset: Option<String>,
}

/// A storage backend for embedded chunks with similarity search and
/// source-scoped deletion.
///
/// Implementations manage named collections of [`Chunk`]s. Both the
/// ingestion path and the question-answering path share one collection and
/// the [`ChunkMetadata`] schema, so every backend must round-trip the
/// metadata faithfully.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection if it does not exist. Idempotent.
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Upsert chunks into a collection. Chunks must have embeddings set.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Search for the `top_k` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending cosine similarity. Ties break
    /// by insertion order.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Delete every chunk whose metadata `source` exactly equals `source`.
    ///
    /// Exact match only — `policy.pdf` must not touch `policy.pdf.bak`.
    /// Returns the number of chunks deleted; zero matches is a valid
    /// outcome, not an error.
    async fn delete_by_source(&self, collection: &str, source: &str) -> Result<u64>;

    /// Page through the collection's chunk ids and metadata.
    ///
    /// Pass `None` to start, then the returned `next_offset` until it is
    /// `None`. Lets callers enumerate large collections without a single
    /// unbounded fetch.
    async fn scroll(
        &self,
        collection: &str,
        offset: Option<String>,
        limit: usize,
    ) -> Result<ScrollPage>;
}
