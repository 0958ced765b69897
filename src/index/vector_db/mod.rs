//! Persistent similarity index

pub mod manager;

pub use manager::{QdrantStore, StoreSettings, DEFAULT_COLLECTION, DEFAULT_QDRANT_URL, DEFAULT_SEARCH_EF};

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{ComplaintRecord, ScoredComplaint};

/// Vector store holding one point per complaint.
///
/// Ingestion is the only mutating operation and is expected to run with no
/// concurrent readers; implementations do not lock.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist yet
    async fn ensure_collection(&self, dimension: usize) -> Result<()>;

    /// Number of stored complaints (0 when the collection is missing)
    async fn count(&self) -> Result<u64>;

    /// Insert or overwrite a batch; `vectors[i]` belongs to `records[i]`
    async fn upsert_batch(&self, records: &[ComplaintRecord], vectors: Vec<Vec<f32>>) -> Result<()>;

    /// Nearest neighbours by cosine similarity, most similar first
    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredComplaint>>;

    /// Drop every stored complaint
    async fn reset(&self) -> Result<()>;
}
