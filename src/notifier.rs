//! A client for sending error notifications to Telegram.

use crate::config::NotifierConfig;
use crate::core::ErrorEvent;
use crate::error::{DeliveryError, NotifyError, NotifyResult};
use crate::formatting::{HtmlFormatter, MessageFormatter};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error, info, instrument};

/// What happened to an event that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The notifier is disabled or the event was not a usable error.
    Disabled,
    /// The event's class was excluded by the only/except filters.
    Filtered,
    /// The message was accepted by the Telegram API.
    Sent,
}

/// A trait for reporters that can be awaited from async code.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Runs the full decide, format and send pipeline for one event.
    async fn send(&self, event: ErrorEvent) -> NotifyResult<Outcome>;
}

/// The envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
}

/// Sends one Telegram message per reported error.
#[derive(Clone)]
pub struct TelegramNotifier {
    config: Arc<NotifierConfig>,
    formatter: Arc<dyn MessageFormatter>,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier` rendering messages as HTML.
    pub fn new(config: NotifierConfig) -> Self {
        Self::with_formatter(config, Arc::new(HtmlFormatter))
    }

    pub fn with_formatter(config: NotifierConfig, formatter: Arc<dyn MessageFormatter>) -> Self {
        Self {
            config: Arc::new(config),
            formatter,
        }
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Decides whether `event` should be reported and, if so, sends it.
    ///
    /// This performs a blocking HTTP request. From async code use
    /// [`ErrorReporter::send`], which moves the work to the blocking pool.
    #[instrument(skip(self, event), fields(class = %event.class_name))]
    pub fn notify(&self, event: &ErrorEvent) -> NotifyResult<Outcome> {
        let config = self.config.as_ref();

        if !config.enabled || !event.is_valid() {
            debug!(enabled = config.enabled, "Notifier gated, skipping event.");
            return Ok(Outcome::Disabled);
        }

        let missing = config.missing_credentials();
        if !missing.is_empty() {
            return Err(NotifyError::Configuration { missing });
        }

        if !config.should_send(&event.class_name) {
            debug!("Error class filtered out, skipping event.");
            return Ok(Outcome::Filtered);
        }

        let text = self.formatter.format(event, config);
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(DeliveryError::from)?;

        Self::send_request(&client, config, &text)?;
        info!("Successfully sent error notification to Telegram.");
        Ok(Outcome::Sent)
    }

    /// Like [`notify`](Self::notify), but logs failures instead of returning them.
    ///
    /// Meant for error hooks: a failed notification must never disturb the
    /// handling of the error being reported.
    pub fn report(&self, event: &ErrorEvent) -> Option<Outcome> {
        match self.notify(event) {
            Ok(outcome) => Some(outcome),
            Err(NotifyError::Delivery(e)) => {
                error!(
                    status = ?e.status(),
                    body = e.body().unwrap_or_default(),
                    timeout = e.is_timeout(),
                    "Telegram client returned fail status: {}",
                    e
                );
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to send Telegram notification");
                None
            }
        }
    }

    /// Issues the single `sendMessage` request.
    fn send_request(
        client: &reqwest::blocking::Client,
        config: &NotifierConfig,
        text: &str,
    ) -> Result<(), DeliveryError> {
        let response = client
            .get(config.send_message_url())
            .query(&[
                ("chat_id", config.chat_id.as_str()),
                ("text", text),
                ("parse_mode", "HTML"),
            ])
            .send()?;

        let status = response.status();
        let body = Self::read_body(response);

        if !status.is_success() {
            return Err(DeliveryError::Status { status, body });
        }

        // The API can report failure in the body alongside a 2xx status.
        if let Ok(envelope) = serde_json::from_str::<ApiResponse>(&body) {
            if !envelope.ok {
                return Err(DeliveryError::Status { status, body });
            }
        }

        Ok(())
    }

    /// Reads the response body, replacing it with a marker if the read fails.
    fn read_body(response: reqwest::blocking::Response) -> String {
        match response.text() {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Failed to read Telegram response body");
                format!("<failed to read response body: {}>", e)
            }
        }
    }
}

#[async_trait]
impl ErrorReporter for TelegramNotifier {
    async fn send(&self, event: ErrorEvent) -> NotifyResult<Outcome> {
        let notifier = self.clone();
        task::spawn_blocking(move || notifier.notify(&event)).await?
    }
}

/// Reports `event` with a one-off notifier built from `config`.
pub fn notify(event: &ErrorEvent, config: &NotifierConfig) -> NotifyResult<Outcome> {
    TelegramNotifier::new(config.clone()).notify(event)
}
