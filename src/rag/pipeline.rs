// End-to-end classification turn: retrieve -> rerank -> generate
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::Result;
use crate::rag::context::take_chunks;
use crate::rag::generator::{build_rag_pipeline, ResponseStream};
use crate::rag::reranking::{rerank_context, RelevanceScorer, DEFAULT_RERANK_TOP_K};
use crate::rag::retrieval::{ContextRetriever, DEFAULT_TOP_K};
use crate::streaming::ChatModel;

/// Chunks passed to the model when reranking is off
pub const DEFAULT_CONTEXT_CHUNKS: usize = 5;

/// Pipeline sizing and reranker toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Hits fetched from the vector store
    pub retrieval_top_k: usize,
    /// Chunks kept after reranking
    pub rerank_top_k: usize,
    /// Chunks kept without reranking
    pub context_chunks: usize,
    pub use_reranker: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retrieval_top_k: DEFAULT_TOP_K,
            rerank_top_k: DEFAULT_RERANK_TOP_K,
            context_chunks: DEFAULT_CONTEXT_CHUNKS,
            use_reranker: true,
        }
    }
}

/// One classification turn over explicit handles
pub struct ClassificationPipeline {
    retriever: ContextRetriever,
    reranker: Option<Arc<dyn RelevanceScorer>>,
    chat: Arc<dyn ChatModel>,
    settings: PipelineSettings,
}

impl ClassificationPipeline {
    pub fn new(
        retriever: ContextRetriever,
        reranker: Option<Arc<dyn RelevanceScorer>>,
        chat: Arc<dyn ChatModel>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            retriever,
            reranker,
            chat,
            settings,
        }
    }

    /// Retrieve and trim the context the model will see
    pub async fn assemble_context(&self, query: &str) -> Result<String> {
        let context = self
            .retriever
            .get_relevant_context(query, self.settings.retrieval_top_k)
            .await?;

        let context = match self.active_reranker() {
            Some(scorer) => rerank_context(scorer, query, &context, self.settings.rerank_top_k)?,
            None => take_chunks(&context, self.settings.context_chunks),
        };
        debug!(reranked = self.reranking_enabled(), "assembled context:\n{}", context);

        Ok(context)
    }

    /// Run retrieval then start generation with `model`.
    ///
    /// Retrieval and reranking errors are returned; generation setup errors
    /// arrive as the stream's sentinel fragment.
    pub async fn classify(&self, model: &str, query: &str) -> Result<ResponseStream> {
        let context = self.assemble_context(query).await?;
        Ok(build_rag_pipeline(self.chat.as_ref(), model, &context, query).await)
    }

    /// True when a scorer is present and switched on
    pub fn reranking_enabled(&self) -> bool {
        self.active_reranker().is_some()
    }

    pub fn has_reranker(&self) -> bool {
        self.reranker.is_some()
    }

    pub fn set_reranker(&mut self, reranker: Option<Arc<dyn RelevanceScorer>>) {
        self.reranker = reranker;
    }

    pub fn set_use_reranker(&mut self, enabled: bool) {
        self.settings.use_reranker = enabled;
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn active_reranker(&self) -> Option<&dyn RelevanceScorer> {
        if !self.settings.use_reranker {
            return None;
        }
        self.reranker.as_deref()
    }
}
