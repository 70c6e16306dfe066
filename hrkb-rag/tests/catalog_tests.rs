//! Integration tests for the ingestion pipeline and document catalog.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hrkb_rag::document::{LoadedDocument, Segment, SourceKind};
use hrkb_rag::embedding::EmbeddingProvider;
use hrkb_rag::error::{RagError, Result};
use hrkb_rag::metadata::TagOptions;
use hrkb_rag::vectorstore::{ScrollPage, VectorStore};
use hrkb_rag::{Chunk, DocumentCatalog, IngestionPipeline, InMemoryVectorStore, RagConfig, SearchResult};

const DIM: usize = 8;

/// Deterministic embedder: buckets byte values into a fixed-size vector.
struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIM];
        for (i, b) in text.bytes().enumerate() {
            v[i % DIM] += b as f32;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder that fails every call after the first `allowed` texts.
struct FailingEmbedder {
    allowed: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    fn after(allowed: usize) -> Self {
        Self { allowed, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(RagError::Embedding {
                provider: "stub".to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        StubEmbedder.embed(text).await
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Store wrapper that counts collection-creation calls.
struct CountingStore {
    inner: InMemoryVectorStore,
    ensure_calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self { inner: InMemoryVectorStore::new(), ensure_calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl VectorStore for CountingStore {
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.ensure_collection(name, dimensions).await
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        self.inner.upsert(collection, chunks).await
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        self.inner.search(collection, embedding, top_k).await
    }

    async fn delete_by_source(&self, collection: &str, source: &str) -> Result<u64> {
        self.inner.delete_by_source(collection, source).await
    }

    async fn scroll(
        &self,
        collection: &str,
        offset: Option<String>,
        limit: usize,
    ) -> Result<ScrollPage> {
        self.inner.scroll(collection, offset, limit).await
    }
}

/// A document that chunks into exactly one chunk per segment.
fn three_segment_doc() -> LoadedDocument {
    LoadedDocument {
        segments: vec![
            Segment { text: "vacation accrues at four percent".to_string(), page: Some(1) },
            Segment { text: "overtime requires written approval".to_string(), page: Some(2) },
            Segment { text: "terminations need two weeks notice".to_string(), page: Some(3) },
        ],
    }
}

fn catalog_with(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> DocumentCatalog {
    let pipeline = IngestionPipeline::builder()
        .config(RagConfig::default())
        .embedder(embedder)
        .store(store)
        .build()
        .unwrap();
    DocumentCatalog::new(Arc::new(pipeline))
}

#[tokio::test]
async fn ingest_list_ask_delete_roundtrip() {
    let store = Arc::new(InMemoryVectorStore::new());
    let catalog = catalog_with(Arc::new(StubEmbedder), store.clone());

    let count = catalog
        .ingest_document(&three_segment_doc(), "policy.pdf", SourceKind::Policy, &TagOptions::default())
        .await
        .unwrap();
    assert_eq!(count, 3);

    let sources = catalog.list_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].source, "policy.pdf");
    assert_eq!(sources[0].kind, SourceKind::Policy);
    assert_eq!(sources[0].chunk_count, 3);

    // The retrieval path sees the same chunks with page metadata intact.
    let query = StubEmbedder.embed("what about overtime approval?").await.unwrap();
    let results = store.search("hr_knowledge", &query, 5).await.unwrap();
    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.chunk.metadata.source, "policy.pdf");
        assert!(result.chunk.metadata.page.is_some());
    }

    let deleted = catalog.delete_source("policy.pdf").await.unwrap();
    assert_eq!(deleted, 3);
    assert!(catalog.list_sources().await.unwrap().is_empty());
}

#[tokio::test]
async fn collection_is_created_exactly_once() {
    let store = Arc::new(CountingStore::new());
    let catalog = catalog_with(Arc::new(StubEmbedder), store.clone());

    for source in ["a.txt", "b.txt"] {
        catalog
            .ingest_document(
                &LoadedDocument::from_text("some policy text"),
                source,
                SourceKind::Document,
                &TagOptions::default(),
            )
            .await
            .unwrap();
    }

    assert_eq!(store.ensure_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delete_never_touches_other_sources() {
    let catalog = catalog_with(Arc::new(StubEmbedder), Arc::new(InMemoryVectorStore::new()));

    catalog
        .ingest_document(&three_segment_doc(), "a.pdf", SourceKind::Document, &TagOptions::default())
        .await
        .unwrap();
    catalog
        .ingest_document(&three_segment_doc(), "a.pdf.bak", SourceKind::Document, &TagOptions::default())
        .await
        .unwrap();

    assert_eq!(catalog.delete_source("a.pdf").await.unwrap(), 3);

    let sources = catalog.list_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].source, "a.pdf.bak");
    assert_eq!(sources[0].chunk_count, 3);
}

#[tokio::test]
async fn deleting_an_absent_source_reports_zero() {
    let catalog = catalog_with(Arc::new(StubEmbedder), Arc::new(InMemoryVectorStore::new()));
    catalog
        .ingest_document(
            &LoadedDocument::from_text("anything"),
            "present.txt",
            SourceKind::Document,
            &TagOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(catalog.delete_source("absent.txt").await.unwrap(), 0);
}

#[tokio::test]
async fn update_replaces_the_document() {
    let catalog = catalog_with(Arc::new(StubEmbedder), Arc::new(InMemoryVectorStore::new()));

    catalog
        .ingest_document(&three_segment_doc(), "guide.md", SourceKind::Guide, &TagOptions::default())
        .await
        .unwrap();

    let count = catalog
        .update_source(
            "guide.md",
            &LoadedDocument::from_text("a single replacement chunk"),
            SourceKind::Guide,
            &TagOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(count, 1);

    let sources = catalog.list_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].chunk_count, 1);
}

#[tokio::test]
async fn failed_update_reports_the_document_absent() {
    let store = Arc::new(InMemoryVectorStore::new());

    // Seed through a working pipeline.
    let seeder = catalog_with(Arc::new(StubEmbedder), store.clone());
    seeder
        .ingest_document(&three_segment_doc(), "policy.pdf", SourceKind::Policy, &TagOptions::default())
        .await
        .unwrap();

    // A catalog whose embedder fails on the first new text: the delete
    // succeeds, re-ingestion cannot.
    let broken = catalog_with(Arc::new(FailingEmbedder::after(0)), store.clone());
    let err = broken
        .update_source(
            "policy.pdf",
            &LoadedDocument::from_text("replacement"),
            SourceKind::Policy,
            &TagOptions::default(),
        )
        .await
        .unwrap_err();

    match err {
        RagError::UpdateIncomplete { source, cause } => {
            assert_eq!(source, "policy.pdf");
            assert!(matches!(*cause, RagError::Embedding { .. }));
        }
        other => panic!("expected UpdateIncomplete, got {other}"),
    }

    // The document is gone, not silently unchanged.
    assert!(broken.list_sources().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_ingest_commits_nothing() {
    let store = Arc::new(InMemoryVectorStore::new());

    let seeder = catalog_with(Arc::new(StubEmbedder), store.clone());
    seeder
        .ingest_document(
            &LoadedDocument::from_text("existing content"),
            "existing.txt",
            SourceKind::Document,
            &TagOptions::default(),
        )
        .await
        .unwrap();

    // Two texts embed fine, the third fails: no partial document.
    let catalog = catalog_with(Arc::new(FailingEmbedder::after(2)), store.clone());
    let err = catalog
        .ingest_document(&three_segment_doc(), "policy.pdf", SourceKind::Policy, &TagOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));

    let sources = catalog.list_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].source, "existing.txt");
}

#[tokio::test]
async fn empty_document_ingests_zero_chunks() {
    let catalog = catalog_with(Arc::new(StubEmbedder), Arc::new(InMemoryVectorStore::new()));
    let count = catalog
        .ingest_document(
            &LoadedDocument { segments: vec![] },
            "empty.txt",
            SourceKind::Document,
            &TagOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(count, 0);
}
