//! Sentence embeddings

pub mod engine;
pub mod hub;

pub use engine::{EmbeddingEngine, DEFAULT_EMBEDDING_MODEL};

use crate::errors::{ClassifierError, Result};

/// Text-to-vector encoder.
///
/// Ingestion and querying must use the same implementation so both sides
/// live in one embedding space.
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts, one vector per input, in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Encode a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| ClassifierError::EmbeddingError("encoder returned no vector".to_string()))
    }

    /// Length of every produced vector
    fn dimension(&self) -> usize;
}
