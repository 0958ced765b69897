//! Chat-model streaming
//!
//! [`ChatModel`] is the seam the generator talks to; [`OllamaClient`]
//! implements it over Ollama's newline-delimited JSON chat endpoint.

pub mod client;
pub mod parser;

// Re-export commonly used types
pub use client::{fragments_from_bytes, OllamaClient, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use parser::{ChatChunk, JsonParser, MAX_BUFFER_SIZE};

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

use crate::errors::Result;

/// Ordered, finite, single-consumer sequence of generated text fragments.
///
/// An `Err` item means the transport failed after streaming began; nothing
/// follows it.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A hosted chat-completion model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as a single user message to `model` and stream the reply.
    ///
    /// Returns `Err` only when the request could not be started.
    async fn stream_chat(&self, model: &str, prompt: &str) -> Result<FragmentStream>;
}
