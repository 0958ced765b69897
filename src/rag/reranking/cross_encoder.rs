// Cross-encoder relevance model (BERT sequence classification) via candle
use anyhow::Result;
use candle_core::{Device, IndexOp, Tensor};
use candle_nn::{linear, Linear, Module};
use candle_transformers::models::bert::BertModel;
use tokenizers::Tokenizer;
use tracing::info;

use super::RelevanceScorer;
use crate::errors::{ClassifierError, Result as ClassifierResult};
use crate::index::embedding::hub::{load_bert, pad_rows};

/// Default cross-encoder checkpoint
pub const DEFAULT_RERANKER_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

/// Token limit for a (query, document) pair
pub const RERANKER_MAX_TOKENS: usize = 512;

/// Scores (query, document) pairs with a single relevance logit
pub struct CrossEncoder {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl CrossEncoder {
    /// Load the default checkpoint (downloads on first use)
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_RERANKER_MODEL)
    }

    /// Load a BERT cross-encoder with a pooler and one-logit classifier head
    pub fn with_model(model_id: &str) -> Result<Self> {
        let device = Device::Cpu;
        let loaded = load_bert(model_id, &device, RERANKER_MAX_TOKENS)?;
        let hidden = loaded.hidden_size;

        let pooler = linear(hidden, hidden, loaded.vb.pp("bert.pooler.dense"))?;
        let classifier = linear(hidden, 1, loaded.vb.pp("classifier"))?;
        info!(model = model_id, "reranker loaded");

        Ok(Self {
            model: loaded.model,
            pooler,
            classifier,
            tokenizer: loaded.tokenizer,
            device,
        })
    }

    fn logits(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let pairs: Vec<(&str, &str)> = candidates.iter().map(|c| (query, *c)).collect();
        let encodings = self.tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let ids: Vec<Vec<u32>> = encodings.iter().map(|e| e.get_ids().to_vec()).collect();
        let type_ids: Vec<Vec<u32>> = encodings.iter().map(|e| e.get_type_ids().to_vec()).collect();
        let masks: Vec<Vec<u32>> = encodings
            .iter()
            .map(|e| e.get_attention_mask().to_vec())
            .collect();

        let batch = candidates.len();
        let (flat_ids, width) = pad_rows(&ids);
        let (flat_types, _) = pad_rows(&type_ids);
        let (flat_mask, _) = pad_rows(&masks);

        let input_ids = Tensor::from_vec(flat_ids, (batch, width), &self.device)?;
        let token_type_ids = Tensor::from_vec(flat_types, (batch, width), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch, width), &self.device)?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?.squeeze(1)?;

        Ok(logits.to_vec1::<f32>()?)
    }
}

impl RelevanceScorer for CrossEncoder {
    fn score(&self, query: &str, candidates: &[&str]) -> ClassifierResult<Vec<f32>> {
        self.logits(query, candidates)
            .map_err(|e| ClassifierError::RerankerError(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_relevant_pair_scores_higher() {
        let encoder = CrossEncoder::new().expect("Failed to load reranker");
        let scores = encoder
            .score(
                "laptop battery drains fast",
                &["Battery loses charge within an hour", "Paper jam in tray 2"],
            )
            .expect("Failed to score");
        assert_eq!(scores.len(), 2);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_pair_truncation_limit() {
        let encoder = CrossEncoder::new().expect("Failed to load reranker");
        let truncation = encoder.tokenizer.get_truncation().expect("truncation configured");
        assert_eq!(truncation.max_length, RERANKER_MAX_TOKENS);
    }
}
