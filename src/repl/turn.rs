//! Per-turn streaming state machine
//!
//! A classification turn moves through a small deterministic automaton:
//!
//! ```text
//! Idle --Start--> Streaming --Fragment--> Streaming
//!                 Streaming --Finish----> Complete
//!                 Streaming --Fail------> Aborted
//! Idle --Fail--> Aborted            (retrieval failed before generation)
//! ```
//!
//! `Complete` and `Aborted` are terminal; any further event is rejected.

use serde::{Deserialize, Serialize};

use crate::errors::{ClassifierError, Result};
use crate::rag::process_message;
use crate::types::ChatTurn;

/// Turn lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnState {
    /// Query accepted, generation not started
    Idle,
    /// Fragments arriving
    Streaming,
    /// Stream ended normally (terminal)
    Complete,
    /// Stream or retrieval failed (terminal)
    Aborted,
}

/// Events that drive a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    Start,
    Fragment,
    Finish,
    Fail,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Complete | TurnState::Aborted)
    }

    /// Next state for `event`, or `InvalidTransition`
    pub fn transition(&self, event: TurnEvent) -> Result<TurnState> {
        use TurnEvent::*;
        use TurnState::*;

        let next = match (self, event) {
            (Idle, Start) => Streaming,
            (Idle, Fail) => Aborted,
            (Streaming, Fragment) => Streaming,
            (Streaming, Finish) => Complete,
            (Streaming, Fail) => Aborted,
            (from, event) => {
                let reason = if from.is_terminal() {
                    "turn already finished".to_string()
                } else {
                    format!("{:?} is not accepted while {:?}", event, from)
                };
                return Err(ClassifierError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                    reason,
                });
            }
        };

        Ok(next)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TurnState::Idle => "Waiting",
            TurnState::Streaming => "Generating",
            TurnState::Complete => "Done",
            TurnState::Aborted => "Aborted",
        }
    }
}

/// Accumulates the fragments of one assistant reply.
///
/// After every append the whole accumulated text is re-split into visible
/// text and thinking fragments, so a `<think>` span that arrives over many
/// fragments is hidden as soon as its closing tag lands.
#[derive(Debug, Clone)]
pub struct StreamingTurn {
    state: TurnState,
    content: String,
    visible: String,
    thinking: Vec<String>,
    error: Option<String>,
}

impl StreamingTurn {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            content: String::new(),
            visible: String::new(),
            thinking: Vec::new(),
            error: None,
        }
    }

    pub fn start(&mut self) -> Result<()> {
        self.state = self.state.transition(TurnEvent::Start)?;
        Ok(())
    }

    pub fn push(&mut self, fragment: &str) -> Result<()> {
        self.state = self.state.transition(TurnEvent::Fragment)?;
        self.content.push_str(fragment);
        let (visible, thinking) = process_message(&self.content);
        self.visible = visible;
        self.thinking = thinking;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.state = self.state.transition(TurnEvent::Finish)?;
        Ok(())
    }

    /// Abort, keeping whatever content already arrived
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.state = self.state.transition(TurnEvent::Fail)?;
        self.error = Some(message.into());
        Ok(())
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Raw accumulated text, thinking tags included
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn visible(&self) -> &str {
        &self.visible
    }

    pub fn thinking(&self) -> &[String] {
        &self.thinking
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// History entry for this reply (raw content; re-split on display).
    ///
    /// A turn aborted before any text arrived is recorded as its error.
    pub fn to_chat_turn(&self) -> ChatTurn {
        match (&self.error, self.content.is_empty()) {
            (Some(error), true) => ChatTurn::assistant(format!("Error: {}", error)),
            _ => ChatTurn::assistant(self.content.clone()),
        }
    }
}

impl Default for StreamingTurn {
    fn default() -> Self {
        Self::new()
    }
}
