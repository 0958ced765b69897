// Retrieved context formatting and chunking
use serde::{Deserialize, Serialize};

use crate::types::ScoredComplaint;

/// Separator between hit blocks in a context string
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Hits of one similarity query, most similar first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    hits: Vec<ScoredComplaint>,
}

impl RetrievedContext {
    pub fn new(hits: Vec<ScoredComplaint>) -> Self {
        Self { hits }
    }

    pub fn hits(&self) -> &[ScoredComplaint] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Each hit as its document followed by `L1:`/`L2:`/`L3:` lines,
    /// blocks separated by a blank line, in store order
    pub fn to_text(&self) -> String {
        self.hits
            .iter()
            .map(ScoredComplaint::to_block)
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR)
    }
}

/// Split a context string back into chunks.
///
/// Documents that themselves contain a blank line split into several chunks.
pub fn split_chunks(context: &str) -> Vec<&str> {
    if context.is_empty() {
        return Vec::new();
    }
    context.split(CHUNK_SEPARATOR).collect()
}

/// First `n` chunks of a context string, re-joined
pub fn take_chunks(context: &str, n: usize) -> String {
    split_chunks(context)
        .into_iter()
        .take(n)
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}
