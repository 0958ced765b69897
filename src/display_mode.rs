//! Output modes for a streamed answer
//!
//! The same turn loop renders to an interactive terminal (live in-place
//! redraw) or to a pipe (final answer only, written once).

use colored::*;
use std::io::{self, IsTerminal, Stdout, Write};

use crate::errors::Result;
use crate::execution::TurnObserver;
use crate::repl::display::LiveRenderer;
use crate::repl::turn::{StreamingTurn, TurnState};

/// How answer text reaches stdout
pub enum DisplayMode {
    /// Progressive redraw on a terminal
    Live(LiveRenderer<Stdout>),

    /// Visible text printed once the turn ends
    Batch,
}

impl DisplayMode {
    /// Live on a terminal, batch otherwise
    pub fn for_stdout() -> Self {
        if io::stdout().is_terminal() {
            Self::live()
        } else {
            Self::Batch
        }
    }

    pub fn live() -> Self {
        Self::Live(LiveRenderer::new(io::stdout()))
    }

    /// Anchor the live renderer; no-op in batch mode
    pub fn begin(&mut self) -> Result<()> {
        if let Self::Live(renderer) = self {
            renderer.begin()?;
        }
        Ok(())
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

impl TurnObserver for DisplayMode {
    fn on_start(&mut self) -> Result<()> {
        self.begin()
    }

    fn on_update(&mut self, turn: &StreamingTurn) -> Result<()> {
        if let Self::Live(renderer) = self {
            renderer.render(turn.visible())?;
        }
        Ok(())
    }

    fn on_end(&mut self, turn: &StreamingTurn) -> Result<()> {
        match self {
            Self::Live(renderer) => {
                renderer.end(turn.visible())?;
            }
            Self::Batch => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", turn.visible())?;
                out.flush()?;
            }
        }

        if turn.state() == TurnState::Aborted {
            let reason = turn.error().unwrap_or("stream interrupted");
            eprintln!("{} {}", "Response interrupted:".red().bold(), reason.red());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_mode_is_not_live() {
        let mode = DisplayMode::Batch;
        assert!(!mode.is_live());
    }

    #[test]
    fn test_batch_end_prints_visible() {
        let mut mode = DisplayMode::Batch;
        let mut turn = StreamingTurn::new();
        turn.start().unwrap();
        turn.push("<think>x</think>- L1: A").unwrap();
        turn.finish().unwrap();

        mode.begin().unwrap();
        mode.on_update(&turn).unwrap();
        mode.on_end(&turn).unwrap();
    }
}
