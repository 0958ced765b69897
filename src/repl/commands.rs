//! Command handler for REPL built-in commands
//!
//! Commands that only touch the transcript run here. Commands that need
//! the pipeline, Ollama or the vector store are handed back to the REPL.

use colored::*;

use crate::rag::process_message;
use crate::repl::session::ChatSession;
use crate::types::Role;

/// Turns shown by `/history` without an argument
const DEFAULT_HISTORY_LIMIT: usize = 10;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Show (`None`) or switch the chat model
    Model { name: Option<String> },
    Models,
    /// Set reranking on/off; `None` toggles
    Rerank { enable: Option<bool> },
    Populate,
    Clear,
    History { limit: Option<usize> },
    Exit,
    Unknown { input: String },
}

/// What the REPL should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
    /// Needs the runtime handles; the REPL executes it
    Runtime(Command),
}

/// Parses commands and runs the transcript-only ones
pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        CommandHandler
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Unknown { input: input.to_string() };
        };

        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.is_empty() {
            return Command::Unknown { input: input.to_string() };
        }

        match parts[0].to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "model" => Command::Model {
                name: parts.get(1).map(|s| s.to_string()),
            },
            "models" => Command::Models,
            "rerank" => match parts.get(1).map(|s| s.to_lowercase()) {
                None => Command::Rerank { enable: None },
                Some(arg) => match arg.as_str() {
                    "on" | "1" | "true" => Command::Rerank { enable: Some(true) },
                    "off" | "0" | "false" => Command::Rerank { enable: Some(false) },
                    _ => Command::Unknown { input: input.to_string() },
                },
            },
            "populate" => Command::Populate,
            "clear" | "cls" => Command::Clear,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command against the transcript
    pub fn execute(&self, command: Command, session: &mut ChatSession) -> Flow {
        match command {
            Command::Help => {
                self.show_help();
                Flow::Continue
            }
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                Flow::Exit
            }
            Command::Clear => {
                session.clear();
                println!("{}", "Chat cleared.".yellow());
                Flow::Continue
            }
            Command::History { limit } => {
                self.show_history(session, limit.unwrap_or(DEFAULT_HISTORY_LIMIT));
                Flow::Continue
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
                Flow::Continue
            }
            runtime @ (Command::Model { .. }
            | Command::Models
            | Command::Rerank { .. }
            | Command::Populate) => Flow::Runtime(runtime),
        }
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = [
            ("/help, /h", "Show this help message"),
            ("/model [name]", "Show or switch the chat model"),
            ("/models", "List installed chat models"),
            ("/rerank [on|off]", "Toggle cross-encoder reranking"),
            ("/populate", "Load the complaint dataset if the index is empty"),
            ("/history [n]", "Show last n chat turns (default: 10)"),
            ("/clear, /cls", "Clear the chat"),
            ("/exit, /quit, /q", "Exit"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type a complaint description directly (no / prefix) to classify it");
        println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    /// Display the transcript tail
    fn show_history(&self, session: &ChatSession, limit: usize) {
        let turns = session.recent(limit);

        if turns.is_empty() {
            println!("{}", "No messages yet.".yellow());
            return;
        }

        println!("\n{}", format!("Chat History (last {}):", turns.len()).bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        for turn in turns {
            let stamp = turn.timestamp.format("%H:%M:%S").to_string().dimmed();
            match turn.role {
                Role::User => println!("{} {} {}", stamp, "you:".green().bold(), turn.content),
                Role::Assistant => {
                    let (visible, thinking) = process_message(&turn.content);
                    println!("{} {}", stamp, "assistant:".cyan().bold());
                    for line in visible.lines() {
                        println!("    {}", line);
                    }
                    if !thinking.is_empty() {
                        println!("    {}", format!("({} thinking block(s) hidden)", thinking.len()).dimmed());
                    }
                }
            }
        }
        println!();
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}
