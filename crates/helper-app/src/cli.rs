//! CLI argument definitions for the helper binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Policy & Product Helper: ask cited questions and manage the document index.
#[derive(Parser, Debug)]
#[command(name = "helper", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the RAG backend.
    #[arg(short = 'u', long = "api-url")]
    pub api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive console with chat and admin tabs (default).
    Chat,
    /// Ask a single question and print the cited answer.
    Ask {
        /// The question; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Ingest the sample documents, then print refreshed metrics.
    Ingest,
    /// Print index and latency metrics.
    Metrics,
    /// Check that the backend is reachable.
    Health,
}

impl CliArgs {
    /// The command to run, `chat` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > HELPER_CONFIG env var > ~/.helper/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        pick(
            self.config.clone(),
            std::env::var("HELPER_CONFIG").ok().map(PathBuf::from),
            default_config_path,
        )
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --api-url flag > HELPER_API_URL env var > config file value.
    pub fn resolve_api_url(&self, config_url: &str) -> String {
        pick(
            self.api_url.clone(),
            std::env::var("HELPER_API_URL").ok(),
            || config_url.to_string(),
        )
    }

    /// The log level forced on the command line, if any.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// First of flag, non-empty env value, fallback.
fn pick<T, F>(flag: Option<T>, env: Option<T>, fallback: F) -> T
where
    T: AsRef<std::ffi::OsStr>,
    F: FnOnce() -> T,
{
    flag.or_else(|| env.filter(|v| !v.as_ref().is_empty()))
        .unwrap_or_else(fallback)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".helper").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".helper").join("config.toml");
    }
    PathBuf::from("config.toml")
}
