//! Configuration management for the complaint classifier
//!
//! TOML configuration with defaults and validation. Read-only: the tool
//! never writes the file back.
//! Location: ~/.complaint-classifier/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{ClassifierError, Result};
use crate::index::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::index::vector_db::{StoreSettings, DEFAULT_COLLECTION, DEFAULT_QDRANT_URL, DEFAULT_SEARCH_EF};
use crate::ingest::INGEST_BATCH_SIZE;
use crate::rag::pipeline::{PipelineSettings, DEFAULT_CONTEXT_CHUNKS};
use crate::rag::reranking::{DEFAULT_RERANKER_MODEL, DEFAULT_RERANK_TOP_K};
use crate::rag::retrieval::DEFAULT_TOP_K;
use crate::streaming::DEFAULT_MODEL;

/// Directory under $HOME holding config and input history
pub const STATE_DIR_NAME: &str = ".complaint-classifier";

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub qdrant: QdrantConfig,
    pub models: ModelsConfig,
    pub retrieval: RetrievalConfig,
    pub ingest: IngestConfig,
}

/// Ollama connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub default_model: String,
}

/// Vector store connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
    pub collection: String,
    /// Query-time HNSW exploration factor
    pub search_ef: u64,
}

/// Local encoder models (Hugging Face ids)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub embedding_model: String,
    pub reranker_model: String,
}

/// Context sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub rerank_top_k: usize,
    pub context_chunks: usize,
    pub use_reranker: bool,
}

/// Dataset ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub dataset_path: PathBuf,
    pub batch_size: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            search_ef: DEFAULT_SEARCH_EF,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            reranker_model: DEFAULT_RERANKER_MODEL.to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            rerank_top_k: DEFAULT_RERANK_TOP_K,
            context_chunks: DEFAULT_CONTEXT_CHUNKS,
            use_reranker: true,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/translated_data.xlsx"),
            batch_size: INGEST_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load_default(),
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::ConfigError(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ClassifierError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the standard location when present, else built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.complaint-classifier/config.toml
    pub fn default_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn state_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(STATE_DIR_NAME))
    }

    /// REPL input history file
    pub fn history_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("history"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ingest.batch_size == 0 {
            return Err(ClassifierError::ConfigError(
                "ingest.batch_size must be greater than 0".to_string(),
            ));
        }

        if self.qdrant.search_ef == 0 {
            return Err(ClassifierError::ConfigError(
                "qdrant.search_ef must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.rerank_top_k > self.retrieval.top_k {
            return Err(ClassifierError::ConfigError(format!(
                "retrieval.rerank_top_k ({}) must not exceed retrieval.top_k ({})",
                self.retrieval.rerank_top_k, self.retrieval.top_k
            )));
        }

        if self.ollama.default_model.trim().is_empty() {
            return Err(ClassifierError::ConfigError(
                "ollama.default_model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            url: self.qdrant.url.clone(),
            collection: self.qdrant.collection.clone(),
            search_ef: self.qdrant.search_ef,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            retrieval_top_k: self.retrieval.top_k,
            rerank_top_k: self.retrieval.rerank_top_k,
            context_chunks: self.retrieval.context_chunks,
            use_reranker: self.retrieval.use_reranker,
        }
    }

    /// Pretty TOML for the `config` command
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClassifierError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.qdrant.collection, "complaints_collection");
        assert_eq!(config.qdrant.search_ef, 500);
        assert_eq!(config.retrieval.top_k, 10);
        assert_eq!(config.retrieval.rerank_top_k, 5);
        assert_eq!(config.ingest.batch_size, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_batch() {
        let mut config = Config::default();
        config.ingest.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_search_ef() {
        let mut config = Config::default();
        config.qdrant.search_ef = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rerank_exceeds_top_k() {
        let mut config = Config::default();
        config.retrieval.rerank_top_k = 11;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rerank_top_k"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[ollama]\nport = 9999\n\n[retrieval]\nuse_reranker = false").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.ollama.port, 9999);
        assert_eq!(config.ollama.host, "127.0.0.1");
        assert!(!config.retrieval.use_reranker);
        assert_eq!(config.retrieval.top_k, 10);
        assert_eq!(config.ollama_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\nbatch_size = 0").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ClassifierError::ConfigError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_projection() {
        let config = Config::default();
        assert_eq!(config.pipeline_settings(), PipelineSettings::default());
        assert_eq!(config.store_settings().url, DEFAULT_QDRANT_URL);
        assert!(config.to_toml().unwrap().contains("[qdrant]"));
    }
}
