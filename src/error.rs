//! Error types reported by the notification pipeline.
//!
//! None of these are fatal to the host application: they describe why a
//! notification was not delivered so that the caller can log it.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Required credentials are missing; nothing was sent.
    #[error("missing required settings: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The blocking send could not be joined from the async reporter.
    #[error("notification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The single HTTP attempt to the Telegram API did not succeed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Telegram API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request to Telegram API failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl DeliveryError {
    /// Returns the HTTP status, if the request got as far as a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DeliveryError::Status { status, .. } => Some(*status),
            DeliveryError::Transport(e) => e.status(),
        }
    }

    /// Returns the response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            DeliveryError::Status { body, .. } => Some(body),
            DeliveryError::Transport(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Transport(e) if e.is_timeout())
    }
}

pub type NotifyResult<T> = Result<T, NotifyError>;
