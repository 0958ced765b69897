//! Ollama model discovery
//!
//! Lists the chat models installed on the Ollama host so the user can pick
//! one. Embedding-only models are filtered out.

pub mod client;
pub mod types;

// Re-export key types for convenience
pub use client::{is_chat_model, resolve_model, OllamaModelClient};
pub use types::{ModelDetails, ModelInfo};
