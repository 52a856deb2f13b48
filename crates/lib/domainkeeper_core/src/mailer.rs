//! Outbound mail collaborator.
//!
//! Transport internals stay behind the `Mailer` trait; the rest of the
//! system only relies on `send(to, subject, body)` returning a message id
//! or a failure.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

/// Mail delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(String),

    #[error("mail relay rejected the message: {0}")]
    Rejected(String),
}

/// Sends a message, returning the transport's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, MailError>;
}

/// Mailer that POSTs the envelope as JSON to an HTTP mail relay.
pub struct HttpRelayMailer {
    client: reqwest::Client,
    relay_url: String,
    from: String,
}

impl HttpRelayMailer {
    pub fn new(relay_url: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, MailError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "body": body,
        });
        let resp = self
            .client
            .post(&self.relay_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MailError::Rejected(format!("status {}", resp.status())));
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(value
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

/// Development mailer: logs the envelope instead of sending anything.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<String, MailError> {
        let id = crate::uuid::uuidv7().to_string();
        info!(%to, subject, message_id = %id, "mail send (log only)");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_returns_a_message_id() {
        let id = LogMailer.send("a@b.test", "subject", "body").await.unwrap();
        assert!(!id.is_empty());
    }
}
