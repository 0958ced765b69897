//! Display manager for REPL terminal UI
//!
//! Spinners while retrieving, live in-place rendering of the streamed
//! answer, and dimmed panels for the model's thinking.

use colored::*;
use crossterm::{
    cursor, queue,
    terminal::{self, Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::models::ModelInfo;
use crate::rag::thinking::THINK_OPEN;

/// Display manager for REPL UI
pub struct DisplayManager {
    current_bar: Option<ProgressBar>,
    update_interval: Duration,
}

impl DisplayManager {
    /// Spinner refresh at 10 FPS
    pub fn new() -> Self {
        DisplayManager {
            current_bar: None,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str, rerank: bool, documents: Option<u64>) {
        let width = 64;
        let rule = "=".repeat(width).cyan().to_string();
        let title = format!("  Complaint Classifier {} - L1/L2/L3 problem codes", version);
        let index = match documents {
            Some(n) => format!("{} complaints indexed", n),
            None => "index unavailable".to_string(),
        };
        let info = format!(
            "  Model: {} | Rerank: {} | {}",
            model,
            if rerank { "on" } else { "off" },
            index
        );

        println!("\n{}", rule);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", rule);
        println!(
            "Describe a complaint to classify it (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Spinner shown while a slow step runs
    pub fn start_spinner(&mut self, message: &str) -> ProgressBar {
        self.finish_current();

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(self.update_interval);

        self.current_bar = Some(pb.clone());
        pb
    }

    /// Finish current spinner
    pub fn finish_current(&mut self) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Finish spinner with success message
    pub fn finish_with_success(&mut self, message: &str, duration_ms: u64) {
        self.finish_current();
        println!("{} {} {}", "✓".green(), message, format!("({}ms)", duration_ms).dimmed());
    }

    /// Finish spinner with error message
    pub fn finish_with_error(&mut self, message: &str) {
        self.finish_current();
        println!("{} {}", "✗".red(), message.red());
    }

    /// Collapsed-style panels holding each thinking fragment
    pub fn show_thinking(&self, thinking: &[String]) {
        for (i, text) in thinking.iter().enumerate() {
            println!("{}", format!("▸ Show model thinking {}", i + 1).dimmed());
            for line in text.trim().lines() {
                println!("  {} {}", "│".dimmed(), line.dimmed());
            }
        }
    }

    /// Display installed chat models, marking the active one
    pub fn show_models(&self, models: &[ModelInfo], current: &str) {
        if models.is_empty() {
            println!("{}", "No chat models installed.".yellow());
            return;
        }

        self.show_section(&format!("Chat Models ({}):", models.len()));
        for model in models {
            let marker = if model.name == current { "*".green().bold() } else { " ".normal() };
            println!("  {} {:<32} {}", marker, model.name, model.description().dimmed());
        }
        println!();
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Label printed before each answer
    pub fn show_answer_header(&self) {
        println!("{}", "assistant:".cyan().bold());
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Redraws a growing answer in place.
///
/// While the new visible text extends what is already on screen only the
/// suffix is written. When it does not (a `<think>` span just closed and
/// vanished from the visible text) the cursor moves back up over the rows
/// the old text occupies, everything below is cleared and the full text is
/// written again. Rows are counted against the terminal width, so the
/// redraw stays correct after the terminal has scrolled.
pub struct LiveRenderer<W: Write> {
    out: W,
    shown: String,
    width: usize,
}

impl<W: Write> LiveRenderer<W> {
    /// Renderer sized to the current terminal (80 columns if unknown)
    pub fn new(out: W) -> Self {
        let width = terminal::size().map(|(cols, _)| cols).unwrap_or(80);
        Self::with_width(out, width)
    }

    pub fn with_width(out: W, width: u16) -> Self {
        LiveRenderer {
            out,
            shown: String::new(),
            width: usize::from(width.max(1)),
        }
    }

    /// Start a fresh answer at the beginning of the current line
    pub fn begin(&mut self) -> io::Result<()> {
        self.shown.clear();
        queue!(self.out, cursor::MoveToColumn(0))?;
        self.out.flush()
    }

    /// Show `visible`, hiding anything from a still-open `<think>` onward
    pub fn render(&mut self, visible: &str) -> io::Result<()> {
        self.draw(settled_text(visible))
    }

    /// Show `visible` as is, then terminate the answer line
    pub fn end(&mut self, visible: &str) -> io::Result<()> {
        self.draw(visible)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn draw(&mut self, visible: &str) -> io::Result<()> {
        if visible == self.shown {
            return Ok(());
        }

        match visible.strip_prefix(self.shown.as_str()) {
            Some(suffix) => write!(self.out, "{}", suffix)?,
            None => {
                let up = rows_used(&self.shown, self.width) - 1;
                queue!(self.out, cursor::MoveToColumn(0))?;
                if up > 0 {
                    queue!(self.out, cursor::MoveToPreviousLine(up))?;
                }
                queue!(self.out, Clear(ClearType::FromCursorDown))?;
                write!(self.out, "{}", visible)?;
            }
        }

        self.shown = visible.to_string();
        self.out.flush()
    }

    /// Text currently on screen
    pub fn shown(&self) -> &str {
        &self.shown
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Text before the first unclosed `<think>` tag.
///
/// Closed spans are already gone from the visible text, so any opening tag
/// left in it has not been closed yet.
fn settled_text(visible: &str) -> &str {
    match visible.find(THINK_OPEN) {
        Some(pos) => &visible[..pos],
        None => visible,
    }
}

/// Terminal rows `text` covers when written from column 0
fn rows_used(text: &str, width: usize) -> u16 {
    let rows: usize = text
        .split('\n')
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}
