// Re-ranking of context chunks against the query
pub mod cross_encoder;
pub mod scorer;

pub use cross_encoder::{CrossEncoder, DEFAULT_RERANKER_MODEL};
pub use scorer::{rank, rerank, rerank_context, RankedChunk, DEFAULT_RERANK_TOP_K};

use crate::errors::Result;

/// Joint (query, candidate) relevance model
pub trait RelevanceScorer: Send + Sync {
    /// One score per candidate, in candidate order; higher is more relevant
    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>>;
}
