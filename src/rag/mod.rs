// RAG (Retrieval-Augmented Generation) pipeline for complaint classification
//
// Components:
// - Retrieval: nearest historical complaints with their label triples
// - Context: block formatting and chunk splitting
// - Re-ranking: optional cross-encoder reordering of context chunks
// - Prompt / Generator: template fill and streamed model response
// - Thinking: separation of <think> reasoning from the visible answer
// - Pipeline: one classification turn end to end

pub mod retrieval;
pub mod reranking;
pub mod context;
pub mod prompt;
pub mod generator;
pub mod thinking;
pub mod pipeline;

// Re-export key types
pub use context::{split_chunks, take_chunks, RetrievedContext, CHUNK_SEPARATOR};
pub use generator::{build_rag_pipeline, ResponseStream};
pub use pipeline::{ClassificationPipeline, PipelineSettings};
pub use prompt::{render_prompt, PROMPT_TEMPLATE};
pub use reranking::{rerank, rerank_context, CrossEncoder, RelevanceScorer};
pub use retrieval::ContextRetriever;
pub use thinking::process_message;
