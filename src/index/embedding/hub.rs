//! HuggingFace Hub download of BERT-family checkpoints

use anyhow::{Context, Result};
use candle_core::Device;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams};

/// A BERT checkpoint loaded onto a device
pub struct LoadedBert {
    pub model: BertModel,
    pub tokenizer: Tokenizer,
    pub hidden_size: usize,
    /// Kept so callers can load task heads that sit next to the encoder
    pub vb: VarBuilder<'static>,
}

/// Download (or reuse from the local hub cache) and load a BERT checkpoint.
///
/// Inputs are truncated to `max_tokens`, special tokens included.
pub fn load_bert(model_id: &str, device: &Device, max_tokens: usize) -> Result<LoadedBert> {
    let api = Api::new().context("Failed to create HuggingFace API client")?;
    let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

    let config_path = repo.get("config.json")
        .with_context(|| format!("Failed to download config for {}", model_id))?;
    let tokenizer_path = repo.get("tokenizer.json")
        .with_context(|| format!("Failed to download tokenizer for {}", model_id))?;
    let weights_path = repo.get("model.safetensors")
        .with_context(|| format!("Failed to download weights for {}", model_id))?;

    let config_contents = std::fs::read_to_string(config_path)
        .context("Failed to read model config")?;
    let config: Config = serde_json::from_str(&config_contents)
        .context("Failed to parse model config")?;
    let hidden_size = serde_json::from_str::<serde_json::Value>(&config_contents)?
        .get("hidden_size")
        .and_then(|v| v.as_u64())
        .context("Model config has no hidden_size")? as usize;

    let mut tokenizer = Tokenizer::from_file(tokenizer_path)
        .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_tokens,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], candle_core::DType::F32, device)
            .context("Failed to load model weights")?
    };

    let model = BertModel::load(vb.clone(), &config)
        .context("Failed to create BERT model")?;

    Ok(LoadedBert {
        model,
        tokenizer,
        hidden_size,
        vb,
    })
}

/// Right-pad token rows with zeros to a common length.
///
/// Returns the flattened buffer and the padded row length.
pub fn pad_rows(rows: &[Vec<u32>]) -> (Vec<u32>, usize) {
    let max_len = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * max_len);
    for row in rows {
        flat.extend_from_slice(row);
        flat.extend(std::iter::repeat(0u32).take(max_len - row.len()));
    }
    (flat, max_len)
}
