//! Document lifecycle management at source granularity.
//!
//! [`DocumentCatalog`] is the admin surface over the shared collection:
//! list sources, ingest, delete a whole source, or replace one. A document
//! is the set of all chunks sharing a `source`, so every operation here
//! works on that unit, never on individual chunks.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::document::{LoadedDocument, SourceKind, SourceSummary};
use crate::error::{RagError, Result};
use crate::metadata::TagOptions;
use crate::pipeline::IngestionPipeline;

/// Page size used when scanning the collection.
const SCROLL_PAGE: usize = 256;

/// Lifecycle manager for logical documents in the shared collection.
///
/// Document-level operations against the same source are serialized through
/// a per-source async mutex; operations on different sources proceed
/// concurrently, and the question-answering read path takes no lock.
pub struct DocumentCatalog {
    pipeline: Arc<IngestionPipeline>,
    source_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentCatalog {
    /// Create a catalog over an ingestion pipeline and its collection.
    pub fn new(pipeline: Arc<IngestionPipeline>) -> Self {
        Self { pipeline, source_locks: Mutex::new(HashMap::new()) }
    }

    async fn lock_for(&self, source: &str) -> Arc<Mutex<()>> {
        let mut locks = self.source_locks.lock().await;
        locks.entry(source.to_string()).or_default().clone()
    }

    /// Ingest a document under the given source identifier.
    ///
    /// Returns the number of chunks stored.
    pub async fn ingest_document(
        &self,
        document: &LoadedDocument,
        source: &str,
        kind: SourceKind,
        options: &TagOptions,
    ) -> Result<usize> {
        let lock = self.lock_for(source).await;
        let _guard = lock.lock().await;
        self.pipeline.ingest(document, source, kind, options).await
    }

    /// List every source in the collection with summary metadata.
    ///
    /// Pages through the store rather than fetching everything at once, so
    /// large collections are fine. Sources are returned in name order.
    pub async fn list_sources(&self) -> Result<Vec<SourceSummary>> {
        let collection = &self.pipeline.config().collection;
        let store = self.pipeline.store();

        let mut summaries: BTreeMap<String, SourceSummary> = BTreeMap::new();
        let mut offset = None;

        loop {
            let page = store.scroll(collection, offset, SCROLL_PAGE).await?;
            for (_, metadata) in page.records {
                summaries
                    .entry(metadata.source.clone())
                    .or_insert_with(|| SourceSummary {
                        source: metadata.source.clone(),
                        kind: metadata.kind,
                        upload_date: metadata.upload_date,
                        chunk_count: 0,
                    })
                    .chunk_count += 1;
            }
            match page.next_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(summaries.into_values().collect())
    }

    /// Delete every chunk belonging to `source`.
    ///
    /// Returns the number of chunks deleted. Zero means nothing matched,
    /// which is a valid outcome rather than an error.
    pub async fn delete_source(&self, source: &str) -> Result<u64> {
        let lock = self.lock_for(source).await;
        let _guard = lock.lock().await;

        let collection = &self.pipeline.config().collection;
        let deleted = self.pipeline.store().delete_by_source(collection, source).await?;
        info!(source, deleted, "deleted source");
        Ok(deleted)
    }

    /// Replace a source's content: delete all existing chunks, then ingest
    /// the new content under the same source identifier.
    ///
    /// The two steps are not atomic. If ingestion fails after the delete
    /// succeeded, the document is absent from the store and the error is
    /// [`RagError::UpdateIncomplete`], so the caller knows reconciliation
    /// is needed rather than assuming the old content survived.
    pub async fn update_source(
        &self,
        source: &str,
        new_document: &LoadedDocument,
        kind: SourceKind,
        options: &TagOptions,
    ) -> Result<usize> {
        let lock = self.lock_for(source).await;
        let _guard = lock.lock().await;

        let collection = &self.pipeline.config().collection;
        let deleted = self.pipeline.store().delete_by_source(collection, source).await?;

        match self.pipeline.ingest(new_document, source, kind, options).await {
            Ok(chunk_count) => {
                info!(source, deleted, chunk_count, "updated source");
                Ok(chunk_count)
            }
            Err(cause) => {
                warn!(source, deleted, error = %cause, "re-ingestion failed after delete; source is absent");
                Err(RagError::UpdateIncomplete { source: source.to_string(), cause: Box::new(cause) })
            }
        }
    }
}
