//! Telegramable - error alerts for Telegram
//!
//! This library turns a captured application error into a short HTML
//! message and posts it to a Telegram chat through the Bot API, honouring
//! the enabled switch, the only/except class filters and the trace settings.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod formatting;
pub mod hook;
pub mod notifier;

// Re-export core types for convenience
pub use crate::config::NotifierConfig;
pub use crate::core::{ErrorEvent, Frame};
pub use crate::error::{DeliveryError, NotifyError, NotifyResult};
pub use crate::hook::install_panic_hook;
pub use crate::notifier::{notify, ErrorReporter, Outcome, TelegramNotifier};
