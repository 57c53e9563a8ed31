//! Telegramable - command-line companion
//!
//! Loads the notifier configuration exactly as a host application would and
//! either prints it or pushes a test alert through the full pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use telegramable::{
    cli::{Cli, Command},
    ErrorEvent, Frame, NotifierConfig, NotifyError, Outcome, TelegramNotifier,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Layer sources: defaults, file, environment, then command-line overrides.
    let config = NotifierConfig::load_with(cli.config.as_deref(), cli.clone())
        .context("Failed to load configuration")?;

    match &cli.command {
        Command::Check => check(&config),
        Command::Test { message } => send_test(config, message),
    }
}

fn check(config: &NotifierConfig) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        error!("{} is not set. Check your environment or config file.", missing.join(", "));
        return Ok(ExitCode::FAILURE);
    }
    if !config.enabled {
        warn!("Notifications are disabled.");
    }

    Ok(ExitCode::SUCCESS)
}

fn send_test(config: NotifierConfig, message: &str) -> Result<ExitCode> {
    let event = ErrorEvent::new("TestAlert", message, file!(), line!()).with_trace(vec![
        Frame::new()
            .with("function", "telegramable::send_test")
            .with("file", file!())
            .with("line", line!()),
    ]);

    let notifier = TelegramNotifier::new(config);
    match notifier.notify(&event) {
        Ok(Outcome::Sent) => {
            info!("Test alert delivered.");
            Ok(ExitCode::SUCCESS)
        }
        Ok(outcome) => {
            warn!(?outcome, "Test alert was not sent.");
            Ok(ExitCode::SUCCESS)
        }
        Err(NotifyError::Delivery(e)) => {
            error!(status = ?e.status(), body = e.body().unwrap_or_default(), "{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
