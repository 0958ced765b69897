//! Command-line argument parsing
//!
//! Provides clap-based CLI with subcommands and verbosity control. Flags
//! given here override the configuration file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::config::Config;

/// Complaint classifier - retrieval-augmented L1/L2/L3 problem coding
#[derive(Parser, Debug)]
#[command(name = "complaint-classifier")]
#[command(version)]
#[command(about = "Classify complaint descriptions into L1/L2/L3 problem codes", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ollama chat model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama host
    #[arg(long)]
    pub host: Option<String>,

    /// Ollama port
    #[arg(long)]
    pub port: Option<u16>,

    /// Skip cross-encoder reranking
    #[arg(long)]
    pub no_rerank: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand (interactive chat when omitted)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive chat
    Chat,

    /// Classify one complaint and exit
    Classify {
        /// Complaint description
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Load the complaint dataset into the vector store
    Ingest {
        /// Spreadsheet to load (overrides ingest.dataset_path)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Drop the collection before loading
        #[arg(long)]
        reset: bool,
    },

    /// List installed Ollama chat models
    Models,

    /// Display the effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run, defaulting to the chat
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }

    /// Fold command-line overrides into `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref host) = self.host {
            config.ollama.host = host.clone();
        }
        if let Some(port) = self.port {
            config.ollama.port = port;
        }
        if let Some(ref model) = self.model {
            config.ollama.default_model = model.clone();
        }
        if self.no_rerank {
            config.retrieval.use_reranker = false;
        }
        if let Some(Commands::Ingest { dataset: Some(ref path), .. }) = self.command {
            config.ingest.dataset_path = path.clone();
        }
    }
}

impl Verbosity {
    /// Default `tracing` filter directive when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn,complaint_classifier=info",
            Verbosity::Verbose => "info,complaint_classifier=debug",
            Verbosity::VeryVerbose => "debug,complaint_classifier=trace",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if model thinking should be printed by one-shot commands
    pub fn show_thinking(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_command_is_chat() {
        let args = parse(&["complaint-classifier"]);
        assert_eq!(args.command(), Commands::Chat);
        assert_eq!(args.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["cc", "-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["cc", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["cc", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_classify_query() {
        let args = parse(&["cc", "classify", "screen flickers"]);
        assert_eq!(
            args.command(),
            Commands::Classify {
                query: "screen flickers".to_string()
            }
        );
    }

    #[test]
    fn test_overrides_applied() {
        let args = parse(&[
            "cc", "--host", "gpu-box", "--port", "8080", "-m", "llama3.1:8b", "--no-rerank",
            "ingest", "--dataset", "other.xlsx", "--reset",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.ollama_url(), "http://gpu-box:8080");
        assert_eq!(config.ollama.default_model, "llama3.1:8b");
        assert!(!config.retrieval.use_reranker);
        assert_eq!(config.ingest.dataset_path, PathBuf::from("other.xlsx"));
        assert!(matches!(args.command(), Commands::Ingest { reset: true, .. }));
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let args = parse(&["cc"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
        assert!(!Verbosity::Normal.show_thinking());
        assert!(Verbosity::Verbose.show_thinking());
        assert_eq!(Verbosity::Quiet.log_filter(), "error");
    }
}
