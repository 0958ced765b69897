// Re-ranking scorer for retrieved context chunks
use serde::Serialize;

use super::RelevanceScorer;
use crate::errors::{ClassifierError, Result};
use crate::rag::context::{split_chunks, CHUNK_SEPARATOR};

/// Chunks kept after reranking
pub const DEFAULT_RERANK_TOP_K: usize = 5;

/// A chunk with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk<'a> {
    pub text: &'a str,
    pub score: f32,
    /// Position in the input
    pub original_rank: usize,
}

/// Score every chunk and return the `top_k` best, best first.
///
/// Equal scores keep their input order (stable sort). A NaN score ranks
/// below every real score.
pub fn rank<'a>(
    scorer: &dyn RelevanceScorer,
    query: &str,
    chunks: &[&'a str],
    top_k: usize,
) -> Result<Vec<RankedChunk<'a>>> {
    if chunks.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }

    let scores = scorer.score(query, chunks)?;
    if scores.len() != chunks.len() {
        return Err(ClassifierError::RerankerError(format!(
            "scorer returned {} scores for {} chunks",
            scores.len(),
            chunks.len()
        )));
    }

    let mut ranked: Vec<RankedChunk<'a>> = chunks
        .iter()
        .copied()
        .zip(scores)
        .enumerate()
        .map(|(i, (text, score))| RankedChunk {
            text,
            score: if score.is_nan() { f32::NEG_INFINITY } else { score },
            original_rank: i,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k);

    Ok(ranked)
}

/// Rerank chunks and re-join the survivors' text
pub fn rerank(
    scorer: &dyn RelevanceScorer,
    query: &str,
    chunks: &[&str],
    top_k: usize,
) -> Result<String> {
    Ok(rank(scorer, query, chunks, top_k)?
        .iter()
        .map(|c| c.text)
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR))
}

/// Split a retriever context string into chunks, then [`rerank`] them
pub fn rerank_context(
    scorer: &dyn RelevanceScorer,
    query: &str,
    context: &str,
    top_k: usize,
) -> Result<String> {
    rerank(scorer, query, &split_chunks(context), top_k)
}
