//! Configuration management for Telegramable
//!
//! This module defines [`NotifierConfig`], which holds every tunable of the
//! notifier. It uses the `figment` crate to layer built-in defaults, a
//! `telegramable.toml` file, the conventional Telegram environment variables
//! and `TELEGRAMABLE_`-prefixed overrides.

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment, Provider,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "telegramable.toml";

/// Environment variable holding the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the chat (user) id.
pub const CHAT_ID_ENV: &str = "TELEGRAM_USER_ID";
/// Environment variable holding the application name.
pub const APP_NAME_ENV: &str = "APP_NAME";

/// All notifier settings. Loaded once and read-only afterwards.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NotifierConfig {
    /// Master switch. When false every event is a no-op.
    pub enabled: bool,
    /// If non-empty, only these error classes are reported.
    pub exceptions_only: Vec<String>,
    /// These error classes are never reported. Checked before `exceptions_only`.
    pub exceptions_except: Vec<String>,
    /// Append the call stack to the message.
    #[serde(rename = "trace")]
    pub include_trace: bool,
    /// Number of frames to include, starting from the innermost.
    pub trace_depth: usize,
    /// Bot token from @BotFather.
    #[serde(deserialize_with = "string_or_number")]
    pub bot_token: String,
    /// Chat that receives the alerts.
    #[serde(rename = "user_id", deserialize_with = "string_or_number")]
    pub chat_id: String,
    /// Shown in the message header so alerts can be told apart.
    pub app_name: String,
    /// Upper bound for the HTTP round trip.
    pub timeout_seconds: u64,
    /// Base URL of the Bot API.
    pub api_base_url: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exceptions_only: vec![],
            exceptions_except: vec![],
            include_trace: true,
            trace_depth: 3,
            bot_token: String::new(),
            chat_id: String::new(),
            app_name: "Telegramable".to_string(),
            timeout_seconds: 5,
            api_base_url: "https://api.telegram.org".to_string(),
        }
    }
}

impl NotifierConfig {
    /// Builds the layered figment: defaults, TOML file, then environment.
    ///
    /// A missing default file is ignored, but an explicitly named file must exist.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment> {
        let file = match config_path {
            Some(path) if !path.exists() => {
                bail!(
                    "Config file not found at specified path: {}",
                    path.display()
                );
            }
            Some(path) => Toml::file(path),
            None => Toml::file(DEFAULT_CONFIG_FILE),
        };

        Ok(Figment::new()
            .merge(Serialized::defaults(NotifierConfig::default()))
            .merge(file)
            .merge(telegram_env())
            // Any key can be overridden, e.g. TELEGRAMABLE_TRACE_DEPTH=5
            .merge(Env::prefixed("TELEGRAMABLE_")))
    }

    /// Loads the configuration from the given file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Ok(Self::figment(config_path)?.extract()?)
    }

    /// Loads the configuration with a final layer of overrides on top.
    pub fn load_with<P: Provider>(config_path: Option<&Path>, overrides: P) -> Result<Self> {
        Ok(Self::figment(config_path)?.merge(overrides).extract()?)
    }

    /// Decides whether an error of `class_name` passes the only/except filters.
    ///
    /// The except list wins over the only list. Both are exact string
    /// matches with no notion of class hierarchy.
    pub fn should_send(&self, class_name: &str) -> bool {
        if self.exceptions_except.iter().any(|c| c == class_name) {
            return false;
        }

        if !self.exceptions_only.is_empty() && !self.exceptions_only.iter().any(|c| c == class_name)
        {
            return false;
        }

        true
    }

    /// Names of the required credentials that are not set.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bot_token.trim().is_empty() {
            missing.push(BOT_TOKEN_ENV);
        }
        if self.chat_id.trim().is_empty() {
            missing.push(CHAT_ID_ENV);
        }
        missing
    }

    /// The `sendMessage` endpoint for the configured bot.
    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// A copy that is safe to print: the bot token is masked.
    pub fn redacted(&self) -> Self {
        let bot_token = if self.bot_token.is_empty() {
            String::new()
        } else {
            "********".to_string()
        };
        Self {
            bot_token,
            ..self.clone()
        }
    }
}

/// Maps the conventional Telegram variables onto config keys.
fn telegram_env() -> Env {
    Env::raw()
        .only(&[BOT_TOKEN_ENV, CHAT_ID_ENV, APP_NAME_ENV])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case(BOT_TOKEN_ENV) {
                "bot_token".into()
            } else if key.as_str().eq_ignore_ascii_case(CHAT_ID_ENV) {
                "user_id".into()
            } else {
                "app_name".into()
            }
        })
}

/// Chat ids are often written as bare (possibly negative) numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
    })
}
