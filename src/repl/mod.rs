//! REPL (Read-Eval-Print Loop) for interactive classification
//!
//! Free text is classified; `/`-prefixed input is a command. One turn runs
//! at a time and a streaming answer cannot be interrupted.

pub mod commands;
pub mod display;
pub mod input;
pub mod session;
pub mod turn;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::display_mode::DisplayMode;
use crate::execution::{stream_turn, TurnObserver};
use crate::index::VectorStore;
use crate::ingest::{DataLoader, LoadOutcome};
use crate::models::OllamaModelClient;
use crate::rag::reranking::CrossEncoder;
use crate::rag::{ClassificationPipeline, RelevanceScorer};
use crate::repl::commands::{is_command, Command, CommandHandler, Flow};
pub use crate::repl::display::{DisplayManager, LiveRenderer};
use crate::repl::input::InputHandler;
pub use crate::repl::session::ChatSession;
pub use crate::repl::turn::{StreamingTurn, TurnEvent, TurnState};

/// Handles the REPL drives besides the transcript
pub struct ReplContext {
    pub pipeline: ClassificationPipeline,
    pub models: OllamaModelClient,
    pub loader: DataLoader,
    pub store: Arc<dyn VectorStore>,
    /// Cross-encoder loaded on first `/rerank on` when none was loaded at start
    pub reranker_model: String,
}

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    session: ChatSession,
    display: DisplayManager,
    context: ReplContext,
}

impl ReplSession {
    /// Create a session; history is persisted when `history_path` is set
    pub fn new(context: ReplContext, model: String, history_path: Option<PathBuf>) -> Result<Self> {
        let input_handler = match history_path {
            Some(path) => InputHandler::with_history(path)?,
            None => InputHandler::new()?,
        };

        Ok(ReplSession {
            input_handler,
            command_handler: CommandHandler::new(),
            session: ChatSession::new(model),
            display: DisplayManager::new(),
            context,
        })
    }

    /// Show welcome banner with the index size when the store answers
    pub async fn show_welcome(&self, version: &str) {
        let documents = match self.context.store.count().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!(error = %e, "could not count indexed complaints");
                None
            }
        };

        self.display.show_banner(
            version,
            self.session.model(),
            self.context.pipeline.reranking_enabled(),
            documents,
        );
        if documents == Some(0) {
            self.display
                .show_warning("The index is empty. Run /populate to load the complaint dataset.");
        }
    }

    /// Read-eval loop until `/exit` or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let Some(input) = self.input_handler.read_line()? else {
                break;
            };
            if input.is_empty() {
                continue;
            }

            match self.handle_input(&input).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => self.display.finish_with_error(&format!("Error: {:#}", e)),
            }
        }

        self.save()
    }

    /// Handle one input line; false means exit
    pub async fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        if !is_command(input) {
            self.classify(input.trim()).await?;
            return Ok(true);
        }

        let command = self.command_handler.parse(input);
        match self.command_handler.execute(command, &mut self.session) {
            Flow::Continue => Ok(true),
            Flow::Exit => Ok(false),
            Flow::Runtime(command) => {
                self.run_command(command).await?;
                Ok(true)
            }
        }
    }

    /// Classify one complaint: retrieve, stream the answer live, record the turn
    pub async fn classify(&mut self, query: &str) -> Result<()> {
        let mut mode = DisplayMode::live();
        self.classify_with(query, &mut mode).await
    }

    /// [`classify`](Self::classify) with the answer rendered by `observer`.
    ///
    /// Every user turn is followed by an assistant turn, even when rendering
    /// fails part way.
    pub async fn classify_with(
        &mut self,
        query: &str,
        observer: &mut dyn TurnObserver,
    ) -> Result<()> {
        self.session.push_user(query);

        let start = Instant::now();
        self.display.start_spinner("Retrieving similar complaints...");
        let stream = self.context.pipeline.classify(self.session.model(), query).await;
        self.display.finish_current();

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                self.record_failure(&e.to_string());
                self.display.show_error(&e.to_string());
                return Ok(());
            }
        };

        self.display.show_answer_header();
        let turn = match stream_turn(stream, observer).await {
            Ok(turn) => turn,
            Err(e) => {
                self.record_failure(&e.to_string());
                return Err(e.into());
            }
        };

        self.display.show_thinking(turn.thinking());
        info!(
            model = self.session.model(),
            state = turn.state().display_name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "turn finished"
        );
        self.session.push_assistant(turn.to_chat_turn());
        println!();

        Ok(())
    }

    /// Close the pending user turn with an `Error: ...` reply
    fn record_failure(&mut self, message: &str) {
        let mut turn = StreamingTurn::new();
        if turn.fail(message).is_ok() {
            self.session.push_assistant(turn.to_chat_turn());
        }
    }

    async fn run_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Model { name: None } => {
                self.display
                    .show_info(&format!("Current model: {}", self.session.model().green()));
            }
            Command::Model { name: Some(name) } => self.switch_model(name).await,
            Command::Models => match self.context.models.list_chat_models().await {
                Ok(models) => self.display.show_models(&models, self.session.model()),
                Err(e) => self.display.show_error(&e.to_string()),
            },
            Command::Rerank { enable } => {
                let enable = enable.unwrap_or(!self.context.pipeline.reranking_enabled());
                self.set_reranking(enable).await?;
            }
            Command::Populate => self.populate().await,
            other => {
                // Transcript-only commands never reach the runtime
                warn!(command = ?other, "unexpected runtime command");
            }
        }
        Ok(())
    }

    async fn switch_model(&mut self, name: String) {
        match self.context.models.available_chat_models().await {
            Ok(available) if !available.contains(&name) => {
                self.display.show_error(&format!(
                    "Model '{}' is not installed. Try one of: {}",
                    name,
                    available.join(", ")
                ));
                return;
            }
            Ok(_) => {}
            Err(e) => {
                self.display
                    .show_warning(&format!("Could not verify model ({}); switching anyway", e));
            }
        }

        self.session.set_model(name);
        self.display
            .show_info(&format!("Model set to {}", self.session.model().green()));
    }

    async fn set_reranking(&mut self, enable: bool) -> Result<()> {
        if enable && !self.context.pipeline.has_reranker() {
            let model_id = self.context.reranker_model.clone();
            self.display.start_spinner(&format!("Loading reranker {}...", model_id));
            let loaded = tokio::task::spawn_blocking(move || CrossEncoder::with_model(&model_id)).await?;
            self.display.finish_current();

            match loaded {
                Ok(encoder) => {
                    let scorer: Arc<dyn RelevanceScorer> = Arc::new(encoder);
                    self.context.pipeline.set_reranker(Some(scorer));
                }
                Err(e) => {
                    self.display.show_error(&format!("Could not load reranker: {}", e));
                    return Ok(());
                }
            }
        }

        self.context.pipeline.set_use_reranker(enable);
        let status = if enable { "enabled" } else { "disabled" };
        self.display.show_info(&format!("Reranking {}", status));
        Ok(())
    }

    async fn populate(&mut self) {
        let start = Instant::now();
        match self.context.loader.load_data().await {
            Ok(LoadOutcome::AlreadyLoaded { count }) => {
                self.display
                    .show_info(&format!("Data already loaded ({} complaints)", count));
            }
            Ok(LoadOutcome::Loaded { ingested, count }) => {
                self.display.finish_with_success(
                    &format!("Loaded {} complaints ({} in collection)", ingested, count),
                    start.elapsed().as_millis() as u64,
                );
            }
            Err(e) => self.display.finish_with_error(&format!("Loading failed: {}", e)),
        }
    }

    /// Save input history
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn pipeline(&self) -> &ClassificationPipeline {
        &self.context.pipeline
    }
}
