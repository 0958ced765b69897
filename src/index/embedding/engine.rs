// Embedding engine - local sentence embeddings via candle
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_transformers::models::bert::BertModel;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::info;

use super::hub::{load_bert, pad_rows};
use super::Embedder;
use crate::errors::{ClassifierError, Result as ClassifierResult};

/// Sentence encoder used for both ingestion and queries
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Token limit the sentence encoder was trained with; longer text is cut
pub const EMBEDDING_MAX_TOKENS: usize = 256;

/// Embedding engine: BERT encoder + mean pooling + L2 normalisation
pub struct EmbeddingEngine {
    model: Arc<BertModel>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
    dimension: usize,
}

impl EmbeddingEngine {
    /// Create engine with the default sentence encoder (downloads on first use)
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_EMBEDDING_MODEL)
    }

    /// Create engine for a specific HuggingFace model id
    pub fn with_model(model_id: &str) -> Result<Self> {
        // CPU only
        let device = Device::Cpu;
        let loaded = load_bert(model_id, &device, EMBEDDING_MAX_TOKENS)?;
        info!(model = model_id, dimension = loaded.hidden_size, "embedding model loaded");

        Ok(Self {
            model: Arc::new(loaded.model),
            tokenizer: Arc::new(loaded.tokenizer),
            device,
            dimension: loaded.hidden_size,
        })
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let ids: Vec<Vec<u32>> = encodings.iter().map(|e| e.get_ids().to_vec()).collect();
        let masks: Vec<Vec<u32>> = encodings
            .iter()
            .map(|e| e.get_attention_mask().to_vec())
            .collect();

        let batch_size = texts.len();
        let (flat_ids, max_len) = pad_rows(&ids);
        let (flat_mask, _) = pad_rows(&masks);

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self.model.forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&hidden, &attention_mask)?;
        let normalized = Self::l2_normalize(&pooled)?;

        Ok(normalized.to_vec2::<f32>()?)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_embeddings.broadcast_div(&sum_mask)?)
    }

    fn l2_normalize(pooled: &Tensor) -> Result<Tensor> {
        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        Ok(pooled.broadcast_div(&norm)?)
    }
}

impl Embedder for EmbeddingEngine {
    fn embed_batch(&self, texts: &[&str]) -> ClassifierResult<Vec<Vec<f32>>> {
        self.encode(texts)
            .map_err(|e| ClassifierError::EmbeddingError(format!("{:#}", e)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
