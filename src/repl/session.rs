//! Chat session state for the REPL
//!
//! Holds the transcript in receipt order and the model currently selected.
//! Nothing here is persisted; the transcript lives for one process.

use crate::types::{ChatTurn, Role};

/// Transcript and selection state of one interactive session
pub struct ChatSession {
    /// Every user and assistant turn, oldest first
    history: Vec<ChatTurn>,

    /// Chat model used for the next turn
    model: String,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        ChatSession {
            history: Vec::new(),
            model: model.into(),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatTurn::user(content));
    }

    /// Append an assistant reply; aborted replies are recorded too
    pub fn push_assistant(&mut self, turn: ChatTurn) {
        debug_assert_eq!(turn.role, Role::Assistant);
        self.history.push(turn);
    }

    /// Full transcript, oldest first
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// The last `limit` turns, oldest first
    pub fn recent(&self, limit: usize) -> &[ChatTurn] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    /// Drop the transcript; the selected model is kept
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
