//! Notifier trait definition and shared error types.

use crate::message::SlackMessage;

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("could not send notification, service returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message through this channel.
    async fn send(&self, message: &SlackMessage) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "slack", "stdout").
    fn channel_name(&self) -> &str;
}
