//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the `telegramable`
//! tool using the `clap` crate. The overrides are merged on top of the
//! configuration from `telegramable.toml` and environment variables.

use clap::{Parser, Subcommand};
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send application errors to a Telegram chat.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Telegram bot token.
    #[arg(long, value_name = "TOKEN", global = true)]
    pub bot_token: Option<String>,

    /// Chat that receives the alerts.
    #[arg(long, value_name = "ID", global = true, allow_hyphen_values = true)]
    pub chat_id: Option<String>,

    /// Application name shown in the alert header.
    #[arg(long, value_name = "NAME", global = true)]
    pub app_name: Option<String>,

    /// Number of stack frames to include.
    #[arg(long, value_name = "N", global = true)]
    pub trace_depth: Option<usize>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the effective configuration with the token redacted.
    Check,
    /// Send a test alert through the full pipeline.
    Test {
        /// Error message of the test alert.
        #[arg(short, long, default_value = "Telegramable test alert")]
        message: String,
    },
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(token) = &self.bot_token {
            dict.insert("bot_token".into(), Value::from(token.clone()));
        }

        if let Some(chat_id) = &self.chat_id {
            dict.insert("user_id".into(), Value::from(chat_id.clone()));
        }

        if let Some(name) = &self.app_name {
            dict.insert("app_name".into(), Value::from(name.clone()));
        }

        if let Some(depth) = self.trace_depth {
            dict.insert("trace_depth".into(), Value::from(depth as u64));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
