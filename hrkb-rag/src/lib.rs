//! # hrkb-rag
//!
//! Retrieval core for the HR knowledge-base chatbot: documents are chunked,
//! tagged with provenance, embedded, and stored in a vector database; the
//! question-answering path retrieves the most similar chunks from the same
//! collection.
//!
//! ## Overview
//!
//! - [`Chunker`] / [`RecursiveChunker`] — separator-priority text splitting
//! - [`metadata::tag_chunks`] — provenance stamping (source, type, date)
//! - [`EmbeddingProvider`] — embedding seam, with an OpenAI backend behind
//!   the `openai` feature
//! - [`VectorStore`] — storage seam, with [`InMemoryVectorStore`] built in
//!   and a Qdrant backend behind the `qdrant` feature
//! - [`IngestionPipeline`] — chunk → tag → embed → store
//! - [`DocumentCatalog`] — list/ingest/delete/update whole sources
//! - `loaders` feature — PDF/DOCX/text file loading
//! - `firecrawl` feature — web page scraping to markdown
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hrkb_rag::{DocumentCatalog, IngestionPipeline, InMemoryVectorStore, RagConfig};
//! use hrkb_rag::document::{LoadedDocument, SourceKind};
//! use hrkb_rag::metadata::TagOptions;
//!
//! let pipeline = Arc::new(
//!     IngestionPipeline::builder()
//!         .config(RagConfig::default())
//!         .embedder(Arc::new(embedder))
//!         .store(Arc::new(InMemoryVectorStore::new()))
//!         .build()?,
//! );
//! let catalog = DocumentCatalog::new(pipeline);
//!
//! let doc = LoadedDocument::from_text(policy_text);
//! let count = catalog
//!     .ingest_document(&doc, "policy.pdf", SourceKind::Policy, &TagOptions::default())
//!     .await?;
//! ```

pub mod catalog;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod metadata;
pub mod pipeline;
pub mod vectorstore;

#[cfg(feature = "loaders")]
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;
#[cfg(feature = "firecrawl")]
pub mod scraper;

pub use catalog::DocumentCatalog;
pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, ChunkMetadata, LoadedDocument, SearchResult, Segment, SourceKind, SourceSummary,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use metadata::TagOptions;
pub use pipeline::{IngestionPipeline, IngestionPipelineBuilder};
pub use vectorstore::{ScrollPage, VectorStore};

#[cfg(feature = "openai")]
pub use openai::OpenAiEmbeddings;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
#[cfg(feature = "firecrawl")]
pub use scraper::FirecrawlScraper;
