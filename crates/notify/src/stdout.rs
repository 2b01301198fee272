//! Dry-run notifier that prints the payload instead of sending it.

use crate::message::SlackMessage;
use crate::traits::{Notifier, NotifyError};

#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl StdoutNotifier {
    pub fn new() -> Self {
        Self
    }

    fn render(message: &SlackMessage) -> Result<String, NotifyError> {
        serde_json::to_string_pretty(message)
            .map_err(|e| NotifyError::Config(format!("failed to serialize message: {e}")))
    }
}

#[async_trait::async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, message: &SlackMessage) -> Result<(), NotifyError> {
        println!("{}", Self::render(message)?);
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "stdout"
    }
}
