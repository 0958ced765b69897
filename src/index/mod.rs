//! Similarity index over historical complaints
//!
//! Two seams sit here: [`Embedder`] turns text into vectors and
//! [`VectorStore`] keeps those vectors with their label payloads.
//! Production implementations run the sentence encoder in-process via
//! candle and talk to Qdrant over gRPC.

pub mod embedding;
pub mod vector_db;

pub use embedding::{Embedder, EmbeddingEngine};
pub use vector_db::{QdrantStore, VectorStore};
