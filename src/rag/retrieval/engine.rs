// Retrieval engine: embed the query, ask the store for its nearest complaints
use std::sync::Arc;
use tracing::debug;

use crate::errors::Result;
use crate::index::{Embedder, VectorStore};
use crate::rag::context::RetrievedContext;

/// Hits fetched per query before reranking
pub const DEFAULT_TOP_K: usize = 10;

/// Retrieves similar historical complaints for a query
#[derive(Clone)]
pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl ContextRetriever {
    /// The embedder must be the one used at ingestion
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Top `top_k` hits in the store's similarity-descending order
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievedContext> {
        if top_k == 0 {
            return Ok(RetrievedContext::default());
        }

        let query_embedding = self.embedder.embed(query)?;
        let hits = self.store.query(&query_embedding, top_k).await?;
        debug!(top_k, hits = hits.len(), "retrieved context");

        Ok(RetrievedContext::new(hits))
    }

    /// Retrieved hits rendered as interleaved text blocks; empty when nothing matched
    pub async fn get_relevant_context(&self, query: &str, top_k: usize) -> Result<String> {
        Ok(self.retrieve(query, top_k).await?.to_text())
    }
}
