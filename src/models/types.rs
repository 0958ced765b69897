//! Type definitions for Ollama model listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Information about an installed Ollama model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name (e.g., "llama3.1:8b")
    pub name: String,

    /// Model size in bytes
    #[serde(default)]
    pub size: u64,

    /// Last modification time
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub digest: String,

    #[serde(default)]
    pub details: Option<ModelDetails>,
}

/// Detailed model information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub family: Option<String>,

    /// Parameter size (e.g., "7B", "13B")
    #[serde(default)]
    pub parameter_size: Option<String>,

    /// Quantization level (e.g., "Q4_0", "Q4_K_M")
    #[serde(default)]
    pub quantization_level: Option<String>,
}

/// Response from Ollama /api/tags endpoint
#[derive(Debug, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

impl ModelInfo {
    /// Short description: parameter size and quantization, else file size
    pub fn description(&self) -> String {
        let parts: Vec<&str> = self
            .details
            .iter()
            .flat_map(|d| [d.parameter_size.as_deref(), d.quantization_level.as_deref()])
            .flatten()
            .collect();

        if parts.is_empty() {
            format_size(self.size)
        } else {
            parts.join(" ")
        }
    }
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.description())
    }
}

/// Format bytes into human-readable size
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base: f64 = 1024.0;
    let exponent = ((bytes as f64).log(base).floor() as usize).min(UNITS.len() - 1);
    let size = bytes as f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(4683087332), "4.36 GB");
    }

    #[test]
    fn test_parse_tags_response() {
        let json = r#"{"models":[{"name":"qwen2.5:7b-instruct","size":4683087332,
            "modified_at":"2024-10-01T12:00:00.000000-07:00","digest":"abc",
            "details":{"family":"qwen2","parameter_size":"7.6B","quantization_level":"Q4_K_M"}}]}"#;
        let parsed: ModelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.models.len(), 1);
        assert_eq!(parsed.models[0].description(), "7.6B Q4_K_M");
        assert!(parsed.models[0].modified_at.is_some());
    }

    #[test]
    fn test_description_falls_back_to_size() {
        let info = ModelInfo {
            name: "tiny:latest".to_string(),
            size: 1073741824,
            modified_at: None,
            digest: String::new(),
            details: None,
        };
        assert_eq!(info.to_string(), "tiny:latest (1.00 GB)");
    }
}
