//! Outbound answers to the workflow webhook

use super::types::WebhookPayload;
use super::RemoteError;
use crate::message::SessionId;
use crate::runtime::WebhookClient;
use async_trait::async_trait;
use reqwest::Client;

/// Posts `{chatId, answer}` to a fixed webhook URL
///
/// The workflow replies out of band (through the messages backend), so the
/// response body is never read. Only a failure to get any response counts
/// as a failed send.
pub struct WebhookSender {
    client: Client,
    url: String,
}

impl WebhookSender {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl WebhookClient for WebhookSender {
    async fn post_answer(&self, session_id: &SessionId, text: &str) -> Result<(), RemoteError> {
        let payload = WebhookPayload {
            chat_id: session_id.as_str(),
            answer: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RemoteError::from_reqwest(&e))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(session_id = %session_id, "Answer delivered to webhook");
        } else {
            tracing::warn!(
                session_id = %session_id,
                status = status.as_u16(),
                "Webhook answered with non-success status"
            );
        }
        Ok(())
    }
}
