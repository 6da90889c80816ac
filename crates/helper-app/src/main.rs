//! Helper application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing (stderr, so console output stays clean)
//! 3. Build the shared HTTP API client
//! 4. Wire the conversation and admin controllers to it
//! 5. Run the requested command or the interactive console

mod cli;
mod console;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use helper_admin::{AdminOperations, IngestRun};
use helper_chat::{ConversationSession, SubmitOutcome};
use helper_client::{AssistantApi, HttpApiClient};
use helper_core::config::HelperConfig;
use helper_core::error::{HelperError, Result};

use crate::cli::{CliArgs, Command};
use crate::console::Console;
use crate::render::{render_metrics, render_turn};

/// Build the log filter. Priority: --log-level > RUST_LOG > config file.
fn log_filter(cli_level: Option<String>, config_level: &str) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
}

/// Load the config file; a missing file means defaults, a broken one is reported.
fn load_config(path: &std::path::Path) -> (HelperConfig, Option<HelperError>) {
    if !path.exists() {
        return (HelperConfig::default(), None);
    }
    match HelperConfig::load(path) {
        Ok(config) => (config, None),
        Err(e) => (HelperConfig::default(), Some(e)),
    }
}

async fn run(command: Command, api: Arc<dyn AssistantApi>, config: HelperConfig) -> Result<()> {
    match command {
        Command::Chat => {
            let session = ConversationSession::new(Arc::clone(&api), config.chat.clone());
            let admin = AdminOperations::new(api);
            let mut console = Console::new(session, admin, std::io::stdout());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let result = console.run(stdin).await;
            tracing::debug!(
                turns = console.session().turn_count(),
                busy = console.admin().is_busy(),
                tab = ?console.tab(),
                "Console closed"
            );
            result?;
        }
        Command::Ask { question } => {
            let session = ConversationSession::new(api, config.chat.clone());
            let outcome = session.submit(&question.join(" ")).await;
            if let Some(turn) = session.last_turn() {
                println!("{}", render_turn(&turn));
            }
            match outcome {
                SubmitOutcome::Answered => {}
                SubmitOutcome::Failed(e) => return Err(e.into()),
                SubmitOutcome::Rejected(reason) => {
                    return Err(HelperError::Api(format!("question not sent: {:?}", reason)));
                }
            }
        }
        Command::Ingest => {
            let admin = AdminOperations::new(api);
            let result = admin.run_ingest().await;
            println!("{}", render_metrics(&admin.view()));
            if let IngestRun::Completed(report) = result? {
                println!(
                    "Indexed {} documents ({} chunks).",
                    report.indexed_docs, report.indexed_chunks
                );
            }
        }
        Command::Metrics => {
            let admin = AdminOperations::new(api);
            let result = admin.activate().await;
            println!("{}", render_metrics(&admin.view()));
            if let Some(result) = result {
                result?;
            }
        }
        Command::Health => {
            let status = api.health().await?;
            println!("backend status: {}", status.status);
            if !status.is_ok() {
                return Err(HelperError::Api(format!(
                    "backend reported status {}",
                    status.status
                )));
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let (mut config, config_error) = load_config(&config_file);
    config.api.base_url = args.resolve_api_url(&config.api.base_url);
    config.validate();

    // Tracing.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(
            args.resolve_log_level(),
            &config.general.log_level,
        ))
        .init();

    tracing::debug!("Starting helper v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!(path = %config_file.display(), error = %e, "Failed to load config, using defaults");
    }
    tracing::debug!(path = %config_file.display(), base_url = %config.api.base_url, "Configuration resolved");

    // API client (single shared instance).
    let api: Arc<dyn AssistantApi> = match HttpApiClient::from_config(&config.api) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create API client");
            return ExitCode::FAILURE;
        }
    };

    match run(args.command(), api, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}
