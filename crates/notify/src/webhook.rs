//! Slack incoming-webhook notifier.
//!
//! Delivers the digest as a JSON payload to a configured webhook URL.

use crate::message::SlackMessage;
use crate::traits::{Notifier, NotifyError};

/// Posts messages to a Slack incoming webhook.
///
/// Environment variable references (`${VAR_NAME}`) in the URL are
/// resolved at construction time.
#[derive(Debug)]
pub struct SlackWebhookNotifier {
    /// Target URL (env vars already resolved).
    url: String,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl SlackWebhookNotifier {
    /// Create a new webhook notifier.
    ///
    /// An empty URL or a reference to a missing env var produces a
    /// [`NotifyError::Config`] error.
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        if url.trim().is_empty() {
            return Err(NotifyError::Config(
                "no webhook url was provided".to_string(),
            ));
        }
        let resolved_url = resolve_env_vars(url)?;

        Ok(Self {
            url: resolved_url,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl Notifier for SlackWebhookNotifier {
    /// Deliver a message as a JSON payload to the configured webhook URL.
    async fn send(&self, message: &SlackMessage) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(message).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, body = %body_text, "webhook returned non-2xx status");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body_text,
            });
        }

        tracing::debug!(
            status = %status,
            attachments = message.attachments.len(),
            "slack notification delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "slack"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(format!(
                    "unclosed env var reference in: {input}"
                )));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;
    use crate::message::Attachment;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn sample_message() -> SlackMessage {
        SlackMessage {
            username: "📞 Wachtdienst Ops".into(),
            channel: Some("#oncall".into()),
            text: "overzicht".into(),
            attachments: vec![Attachment {
                title: "Vandaag".into(),
                text: "Anna tot 01-06-2021 09:00".into(),
                ..Attachment::default()
            }],
        }
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("SLACK_HOOK_TEST_HOST", "hooks.example.com");
        let result = resolve_env_vars("https://${SLACK_HOOK_TEST_HOST}/services/x").unwrap();
        assert_eq!(result, "https://hooks.example.com/services/x");
        std::env::remove_var("SLACK_HOOK_TEST_HOST");
    }

    #[test]
    fn resolve_env_vars_missing() {
        let result = resolve_env_vars("https://${ABSOLUTELY_NOT_SET_12345}/hook");
        match result.unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("ABSOLUTELY_NOT_SET_12345")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_env_vars_unclosed() {
        match resolve_env_vars("https://${UNCLOSED/hook").unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("unclosed")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_env_vars_no_vars() {
        let result = resolve_env_vars("https://plain.example.com/hook").unwrap();
        assert_eq!(result, "https://plain.example.com/hook");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(matches!(
            SlackWebhookNotifier::new("  "),
            Err(NotifyError::Config(_))
        ));
    }

    #[test]
    fn channel_name_is_slack() {
        let notifier = SlackWebhookNotifier::new("https://example.com").unwrap();
        assert_eq!(notifier.channel_name(), "slack");
    }

    #[tokio::test]
    async fn posts_json_payload() {
        let received: Arc<Mutex<Option<serde_json::Value>>> = Arc::default();
        let handler = {
            let received = received.clone();
            move |Json(body): Json<serde_json::Value>| async move {
                *received.lock().unwrap() = Some(body);
                "ok"
            }
        };
        let base = serve(Router::new().route("/hook", post(handler))).await;

        let notifier = SlackWebhookNotifier::new(&format!("{base}/hook")).unwrap();
        notifier.send(&sample_message()).await.unwrap();

        let body = received.lock().unwrap().take().unwrap();
        assert_eq!(body["channel"], "#oncall");
        assert_eq!(body["attachments"][0]["title"], "Vandaag");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let app = Router::new().route(
            "/hook",
            post(|| async { (StatusCode::NOT_FOUND, "no_service") }),
        );
        let base = serve(app).await;

        let notifier = SlackWebhookNotifier::new(&format!("{base}/hook")).unwrap();
        match notifier.send(&sample_message()).await.unwrap_err() {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no_service");
            }
            other => panic!("expected Rejected error, got: {other:?}"),
        }
    }
}
