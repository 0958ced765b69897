//! Input handler for REPL using rustyline
//!
//! Line editing with persistent history. Ctrl-C abandons the current line,
//! Ctrl-D ends the session.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// Default prompt shown before each complaint
pub const DEFAULT_PROMPT: &str = "complaint> ";

/// Input handler managing readline interface and command history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: DEFAULT_PROMPT.to_string(),
        })
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input, empty after Ctrl-C
    /// - Ok(None) for EOF (Ctrl-D)
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return Ok(Some(String::new()));
                }

                let _ = self.editor.add_history_entry(trimmed);
                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_input_handler_creation() {
        let handler = InputHandler::new().unwrap();
        assert_eq!(handler.prompt, DEFAULT_PROMPT);
        assert!(handler.history_path.is_none());
    }

    #[test]
    fn test_history_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let history_path = temp_dir.path().join("nested").join("history");

        {
            let mut handler = InputHandler::with_history(history_path.clone()).unwrap();
            let _ = handler.editor.add_history_entry("fan noise");
            let _ = handler.editor.add_history_entry("/models");
            handler.save_history().unwrap();
        }

        assert!(history_path.exists());

        let handler = InputHandler::with_history(history_path).unwrap();
        assert_eq!(handler.editor.history().len(), 2);
    }
}
