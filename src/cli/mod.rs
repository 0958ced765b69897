//! CLI module
//!
//! Handles command-line argument parsing and configuration loading.

pub mod args;
pub mod config;

pub use args::{Args, Commands, Verbosity};
pub use config::Config;
