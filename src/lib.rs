//! Complaint Classifier - retrieval-augmented problem coding
//!
//! Classifies a free-text complaint into a three-level (L1/L2/L3) problem
//! code by retrieving similar labelled complaints from a vector index,
//! optionally reranking them, and prompting a local chat model.
//!
//! # Architecture
//!
//! - **index**: sentence embeddings and the Qdrant-backed complaint store
//! - **ingest**: one-shot spreadsheet loading into the store
//! - **rag**: retrieval, reranking, prompting, thinking-tag separation
//! - **streaming**: Ollama chat streaming behind the `ChatModel` trait
//! - **repl** / **cli**: terminal surface and configuration

pub mod errors;
pub mod types;
pub mod index;
pub mod ingest;
pub mod streaming;
pub mod rag;
pub mod models;
pub mod cli;
pub mod repl;

// Re-export commonly used types
pub use errors::{ClassifierError, Result};

// Display mode abstraction for CLI and REPL
pub mod display_mode;
pub use display_mode::DisplayMode;

// Shared turn execution for CLI and REPL
pub mod execution;
