//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Chunk text and typed metadata are stored as payload, with the metadata
//! nested under a `metadata` key so source filtering uses the
//! `metadata.source` payload path.

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    PointId, PointStruct, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::document::{Chunk, ChunkMetadata, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{ScrollPage, VectorStore};

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections are created with cosine distance. Point ids must be UUIDs,
/// which the ingestion pipeline assigns at insertion.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::Search { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Exact-match keyword filter on the nested `metadata.source` field.
    fn source_filter(source: &str) -> Filter {
        Filter::must([Condition::matches("metadata.source", source.to_string())])
    }

    fn build_payload(chunk: &Chunk) -> Result<Payload> {
        let metadata = serde_json::to_value(&chunk.metadata).map_err(|e| RagError::Search {
            backend: "qdrant".to_string(),
            message: format!("failed to serialize metadata: {e}"),
        })?;

        let mut payload_map = serde_json::Map::new();
        payload_map.insert("text".to_string(), serde_json::Value::String(chunk.text.clone()));
        payload_map.insert("chunk_index".to_string(), serde_json::Value::from(chunk.chunk_index));
        payload_map.insert("metadata".to_string(), metadata);

        Payload::try_from(serde_json::Value::Object(payload_map)).map_err(|e| RagError::Search {
            backend: "qdrant".to_string(),
            message: format!("failed to build payload: {e}"),
        })
    }

    /// Convert a Qdrant payload value back to JSON.
    fn value_to_json(value: &QdrantValue) -> serde_json::Value {
        match &value.kind {
            Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
            Some(Kind::IntegerValue(i)) => serde_json::Value::from(*i),
            Some(Kind::DoubleValue(d)) => serde_json::Value::from(*d),
            Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
            Some(Kind::ListValue(list)) => serde_json::Value::Array(
                list.values.iter().map(Self::value_to_json).collect(),
            ),
            Some(Kind::StructValue(map)) => serde_json::Value::Object(
                map.fields.iter().map(|(k, v)| (k.clone(), Self::value_to_json(v))).collect(),
            ),
            Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
        }
    }

    fn parse_metadata(
        payload: &std::collections::HashMap<String, QdrantValue>,
    ) -> Result<ChunkMetadata> {
        let value = payload.get("metadata").map(Self::value_to_json).ok_or_else(|| {
            RagError::Search {
                backend: "qdrant".to_string(),
                message: "point payload is missing 'metadata'".to_string(),
            }
        })?;
        serde_json::from_value(value).map_err(|e| RagError::Search {
            backend: "qdrant".to_string(),
            message: format!("malformed chunk metadata in payload: {e}"),
        })
    }

    fn point_id_to_string(id: &PointId) -> String {
        match &id.point_id_options {
            Some(PointIdOptions::Uuid(s)) => s.clone(),
            Some(PointIdOptions::Num(n)) => n.to_string(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        if collections.collections.iter().any(|c| c.name == name) {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points = chunks
            .iter()
            .map(|chunk| {
                let payload = Self::build_payload(chunk)?;
                Ok(PointStruct::new(chunk.id.clone(), chunk.embedding.clone(), payload))
            })
            .collect::<Result<Vec<PointStruct>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = chunks.len(), "upserted chunks to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored.id.as_ref().map(Self::point_id_to_string).unwrap_or_default();
                let text = scored
                    .payload
                    .get("text")
                    .and_then(|v| match &v.kind {
                        Some(Kind::StringValue(s)) => Some(s.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                let chunk_index = scored
                    .payload
                    .get("chunk_index")
                    .and_then(|v| match &v.kind {
                        Some(Kind::IntegerValue(i)) => Some(*i as usize),
                        _ => None,
                    })
                    .unwrap_or_default();
                let metadata = Self::parse_metadata(&scored.payload)?;

                Ok(SearchResult {
                    chunk: Chunk { id, text, embedding: Vec::new(), chunk_index, metadata },
                    score: scored.score,
                })
            })
            .collect()
    }

    async fn delete_by_source(&self, collection: &str, source: &str) -> Result<u64> {
        let filter = Self::source_filter(source);

        let count = self
            .client
            .count(CountPointsBuilder::new(collection).filter(filter.clone()).exact(true))
            .await
            .map_err(Self::map_err)?;
        let matched = count.result.map(|r| r.count).unwrap_or(0);
        if matched == 0 {
            debug!(collection, source, "no chunks matched for deletion");
            return Ok(0);
        }

        self.client
            .delete_points(DeletePointsBuilder::new(collection).points(filter).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, source, count = matched, "deleted chunks from qdrant");
        Ok(matched)
    }

    async fn scroll(
        &self,
        collection: &str,
        offset: Option<String>,
        limit: usize,
    ) -> Result<ScrollPage> {
        let mut builder = ScrollPointsBuilder::new(collection)
            .limit(limit as u32)
            .with_payload(true)
            .with_vectors(false);
        if let Some(token) = offset {
            builder = builder.offset(PointId::from(token));
        }

        let response = self.client.scroll(builder).await.map_err(Self::map_err)?;

        let records = response
            .result
            .into_iter()
            .map(|point| {
                let id = point.id.as_ref().map(Self::point_id_to_string).unwrap_or_default();
                let metadata = Self::parse_metadata(&point.payload)?;
                Ok((id, metadata))
            })
            .collect::<Result<Vec<_>>>()?;

        let next_offset = response.next_page_offset.as_ref().map(Self::point_id_to_string);

        Ok(ScrollPage { records, next_offset })
    }
}
