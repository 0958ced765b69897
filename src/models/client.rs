//! Ollama API client for model discovery

use reqwest::Client;
use std::time::Duration;

use crate::errors::{ClassifierError, Result};
use crate::models::types::{ModelInfo, ModelsResponse};
use crate::streaming::DEFAULT_OLLAMA_URL;

/// HTTP client for Ollama's model endpoints
pub struct OllamaModelClient {
    client: Client,
    base_url: String,
}

impl OllamaModelClient {
    /// Create a new Ollama model client
    ///
    /// # Arguments
    /// * `base_url` - Base URL for Ollama API (default: http://127.0.0.1:11434)
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
        })
    }

    /// List all installed models (GET /api/tags)
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClassifierError::OllamaApiError(format!("Failed to connect to Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(ClassifierError::OllamaApiError(format!(
                "Failed to list models: HTTP {}",
                response.status()
            )));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::OllamaApiError(format!("Failed to parse response: {}", e)))?;

        Ok(models.models)
    }

    /// Installed models usable for chat, in the order Ollama reports them
    pub async fn list_chat_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(self
            .list_models()
            .await?
            .into_iter()
            .filter(|m| is_chat_model(&m.name))
            .collect())
    }

    /// Names of [`list_chat_models`](Self::list_chat_models)
    pub async fn available_chat_models(&self) -> Result<Vec<String>> {
        Ok(self
            .list_chat_models()
            .await?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }

    /// Check if Ollama server is reachable
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Embedding models cannot chat
pub fn is_chat_model(name: &str) -> bool {
    !name.contains("embed")
}

/// The configured model when installed, else the first installed chat model.
///
/// Falls back to `configured` when nothing is installed so the first turn
/// reports the missing model.
pub fn resolve_model(configured: &str, available: &[String]) -> String {
    if available.iter().any(|m| m == configured) {
        return configured.to_string();
    }
    available
        .first()
        .cloned()
        .unwrap_or_else(|| configured.to_string())
}
