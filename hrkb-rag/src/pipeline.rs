//! Ingestion pipeline: chunk, tag, embed, store.
//!
//! [`IngestionPipeline`] composes a [`Chunker`], the metadata tagger, an
//! [`EmbeddingProvider`], and a [`VectorStore`]. All chunks of one call are
//! embedded before anything is written, and storage happens in a single
//! upsert, so a failed call commits nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrkb_rag::{IngestionPipeline, RagConfig, InMemoryVectorStore, RecursiveChunker};
//!
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! let count = pipeline.ingest(&document, "handbook.pdf", SourceKind::Document, &TagOptions::default()).await?;
//! ```

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, LoadedDocument, SourceKind};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::metadata::{TagOptions, tag_chunks};
use crate::vectorstore::VectorStore;

/// The ingestion half of the retrieval core.
///
/// Construct one via [`IngestionPipeline::builder()`]. The target collection
/// is created lazily on first ingest and exactly once per pipeline instance.
pub struct IngestionPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    collection_ready: OnceCell<()>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Return a reference to the vector store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Create the collection if missing. Runs at most once per pipeline.
    async fn ensure_collection(&self) -> Result<()> {
        self.collection_ready
            .get_or_try_init(|| async {
                self.store
                    .ensure_collection(&self.config.collection, self.embedder.dimensions())
                    .await
            })
            .await?;
        Ok(())
    }

    /// Ingest a document's content under the given source identifier.
    ///
    /// Chunks every segment in order, tags chunks with provenance, embeds
    /// the batch, and stores all chunk/vector/metadata triples. Returns the
    /// number of chunks stored.
    ///
    /// Either every chunk of this call is embedded and stored, or none is:
    /// embedding runs to completion before the single store write.
    pub async fn ingest(
        &self,
        document: &LoadedDocument,
        source: &str,
        kind: SourceKind,
        options: &TagOptions,
    ) -> Result<usize> {
        let mut pieces: Vec<(String, Option<u32>)> = Vec::new();
        for segment in &document.segments {
            for text in self.chunker.split(&segment.text) {
                pieces.push((text, segment.page));
            }
        }

        if pieces.is_empty() {
            info!(source, chunk_count = 0, "ingested document (empty)");
            return Ok(0);
        }

        let tagged = tag_chunks(pieces, source, kind, options);
        let texts: Vec<&str> = tagged.iter().map(|(text, _)| text.as_str()).collect();

        let embeddings = self.embedder.embed_batch(&texts).await.inspect_err(|e| {
            error!(source, error = %e, "embedding failed during ingestion");
        })?;

        if embeddings.len() != tagged.len() {
            return Err(RagError::Pipeline(format!(
                "embedder returned {} vectors for {} chunks of '{source}'",
                embeddings.len(),
                tagged.len()
            )));
        }

        let chunks: Vec<Chunk> = tagged
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(chunk_index, ((text, metadata), embedding))| Chunk {
                id: uuid::Uuid::new_v4().to_string(),
                text,
                embedding,
                chunk_index,
                metadata,
            })
            .collect();

        self.ensure_collection().await?;

        self.store.upsert(&self.config.collection, &chunks).await.inspect_err(|e| {
            error!(source, error = %e, "upsert failed during ingestion");
        })?;

        let chunk_count = chunks.len();
        info!(source, %kind, chunk_count, "ingested document");
        Ok(chunk_count)
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedder` and `store` are required; `config` and `chunker` default to
/// [`RagConfig::default()`] and a [`RecursiveChunker`] sized from the config.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker. Defaults to a [`RecursiveChunker`] sized
    /// from the configuration.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the [`IngestionPipeline`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `embedder` or `store` is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)));

        Ok(IngestionPipeline { config, chunker, embedder, store, collection_ready: OnceCell::new() })
    }
}
