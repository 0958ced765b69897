// Vector store backed by Qdrant
use anyhow::Context;
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        point_id::PointIdOptions, value::Kind, CountPointsBuilder, CreateCollectionBuilder,
        Distance, PointId, PointStruct, ScoredPoint, SearchParamsBuilder, SearchPointsBuilder,
        UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
    },
    Qdrant,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use super::VectorStore;
use crate::errors::{ClassifierError, Result};
use crate::types::complaint::{DOCUMENT_KEY, L1_KEY, L2_KEY, L3_KEY};
use crate::types::{ComplaintRecord, ProblemCodes, ScoredComplaint};

/// Default Qdrant gRPC endpoint
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default collection name
pub const DEFAULT_COLLECTION: &str = "complaints_collection";

/// HNSW search breadth, tuned high for recall
pub const DEFAULT_SEARCH_EF: u64 = 500;

/// Connection and collection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub url: String,
    pub collection: String,
    pub search_ef: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            search_ef: DEFAULT_SEARCH_EF,
        }
    }
}

/// Complaint store in a single Qdrant collection
pub struct QdrantStore {
    client: Qdrant,
    settings: StoreSettings,
}

impl QdrantStore {
    /// Connect to Qdrant; no request is issued until first use
    pub fn connect(settings: StoreSettings) -> Result<Self> {
        let client = Qdrant::from_url(&settings.url)
            .build()
            .context("Failed to create Qdrant client")?;

        Ok(Self { client, settings })
    }

    /// Collection this store reads and writes
    pub fn collection(&self) -> &str {
        &self.settings.collection
    }

    async fn exists(&self) -> Result<bool> {
        self.client
            .collection_exists(&self.settings.collection)
            .await
            .map_err(store_error("Failed to check collection"))
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }

        info!(collection = %self.settings.collection, dimension, "creating collection");
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.settings.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await
            .map_err(store_error("Failed to create collection"))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        if !self.exists().await? {
            return Ok(0);
        }

        let response = self.client
            .count(CountPointsBuilder::new(&self.settings.collection).exact(true))
            .await
            .map_err(store_error("Failed to count points"))?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn upsert_batch(&self, records: &[ComplaintRecord], vectors: Vec<Vec<f32>>) -> Result<()> {
        if records.len() != vectors.len() {
            return Err(ClassifierError::VectorStoreError(format!(
                "{} records but {} vectors",
                records.len(),
                vectors.len()
            )));
        }
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .iter()
            .zip(vectors)
            .map(|(record, vector)| PointStruct::new(record.index, vector, record_payload(record)))
            .collect();

        debug!(points = points.len(), "upserting batch");
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.settings.collection, points).wait(true))
            .await
            .map_err(store_error("Failed to upsert points"))?;

        Ok(())
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredComplaint>> {
        if limit == 0 || !self.exists().await? {
            return Ok(Vec::new());
        }

        let response = self.client
            .search_points(
                SearchPointsBuilder::new(&self.settings.collection, vector.to_vec(), limit as u64)
                    .with_payload(true)
                    .params(SearchParamsBuilder::default().hnsw_ef(self.settings.search_ef)),
            )
            .await
            .map_err(store_error("Failed to search points"))?;

        Ok(response.result.into_iter().map(scored_complaint).collect())
    }

    async fn reset(&self) -> Result<()> {
        if self.exists().await? {
            info!(collection = %self.settings.collection, "dropping collection");
            self.client
                .delete_collection(&self.settings.collection)
                .await
                .map_err(store_error("Failed to delete collection"))?;
        }
        Ok(())
    }
}

fn store_error<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> ClassifierError {
    move |e| ClassifierError::VectorStoreError(format!("{}: {}", what, e))
}

// Helper functions for payload conversion
fn record_payload(record: &ComplaintRecord) -> HashMap<String, QdrantValue> {
    let mut payload = HashMap::new();
    payload.insert(DOCUMENT_KEY.to_string(), QdrantValue::from(record.description.clone()));
    for (key, value) in record.codes.entries() {
        payload.insert(key.to_string(), QdrantValue::from(value.to_string()));
    }
    payload
}

fn scored_complaint(point: ScoredPoint) -> ScoredComplaint {
    let payload = point.payload;
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(qdrant_value_to_string)
            .unwrap_or_default()
    };

    ScoredComplaint {
        id: point_id_to_string(&point.id),
        score: point.score,
        document: text(DOCUMENT_KEY),
        codes: ProblemCodes::new(text(L1_KEY), text(L2_KEY), text(L3_KEY)),
    }
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(s.clone()),
        Kind::IntegerValue(i) => Some(i.to_string()),
        Kind::DoubleValue(f) => Some(f.to_string()),
        Kind::BoolValue(b) => Some(b.to_string()),
        _ => None,
    })
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    point_id
        .as_ref()
        .and_then(|id| match &id.point_id_options {
            Some(PointIdOptions::Num(n)) => Some(n.to_string()),
            Some(PointIdOptions::Uuid(u)) => Some(u.clone()),
            None => None,
        })
        .unwrap_or_else(|| "unknown".to_string())
}
