//! Error types for the complaint classifier
//!
//! One error enum for the whole crate. Model loading code builds its
//! messages with `anyhow::Context` and converts at the boundary.

use thiserror::Error;

/// Main error type for the classifier pipeline
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Turn state machine errors
    #[error("Invalid state transition from {from:?} on {event:?}: {reason}")]
    InvalidTransition {
        from: String,
        event: String,
        reason: String,
    },

    /// Sentence embedding failures
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    /// Vector store failures (connection, upsert, search)
    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    /// Cross-encoder scoring failures
    #[error("Reranker error: {0}")]
    RerankerError(String),

    /// Ingestion dataset problems (missing file, missing column)
    #[error("Dataset error: {0}")]
    DatasetError(String),

    /// Streaming errors
    #[error("Streaming error: {0}")]
    StreamingError(String),

    /// JSON parsing errors
    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Convert anyhow errors to ClassifierError
impl From<anyhow::Error> for ClassifierError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line
        ClassifierError::Generic(format!("{:#}", err))
    }
}
