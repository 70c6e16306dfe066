//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps chunks in insertion order behind a
//! `tokio::sync::RwLock`. Suitable for development and tests; search ties
//! break by insertion order because the sort is stable.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{ScrollPage, VectorStore};

/// An in-memory [`VectorStore`] using cosine similarity for search.
///
/// Collections map names to a `Vec` of chunks kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<Chunk>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(collection: &str) -> RagError {
        RagError::Search {
            backend: "InMemory".to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        for chunk in chunks {
            // Replacing in place keeps the original insertion position.
            match store.iter_mut().find(|c| c.id == chunk.id) {
                Some(existing) => *existing = chunk.clone(),
                None => store.push(chunk.clone()),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut scored: Vec<SearchResult> = store
            .iter()
            .map(|chunk| {
                let score = cosine_similarity(&chunk.embedding, embedding);
                SearchResult { chunk: chunk.clone(), score }
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_by_source(&self, collection: &str, source: &str) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        let before = store.len();
        store.retain(|chunk| chunk.metadata.source != source);
        Ok((before - store.len()) as u64)
    }

    async fn scroll(
        &self,
        collection: &str,
        offset: Option<String>,
        limit: usize,
    ) -> Result<ScrollPage> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let start: usize = match offset {
            Some(token) => token.parse().map_err(|_| RagError::Search {
                backend: "InMemory".to_string(),
                message: format!("invalid scroll offset '{token}'"),
            })?,
            None => 0,
        };

        let end = (start + limit).min(store.len());
        let records = store[start.min(store.len())..end]
            .iter()
            .map(|chunk| (chunk.id.clone(), chunk.metadata.clone()))
            .collect();
        let next_offset = (end < store.len()).then(|| end.to_string());

        Ok(ScrollPage { records, next_offset })
    }
}
