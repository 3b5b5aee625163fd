//! Inbound messages from the chat backend

use super::types::MessagesResponse;
use super::RemoteError;
use crate::message::{Message, SessionId};
use crate::runtime::MessageSource;
use async_trait::async_trait;
use reqwest::Client;

/// Reads the authoritative transcript for a session
pub struct ChatApi {
    client: Client,
    base_url: String,
}

impl ChatApi {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self, session_id: &SessionId) -> String {
        format!("{}/api/chat/{session_id}/messages", self.base_url)
    }
}

#[async_trait]
impl MessageSource for ChatApi {
    async fn fetch_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, RemoteError> {
        let response = self
            .client
            .get(self.messages_url(session_id))
            .send()
            .await
            .map_err(|e| RemoteError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::status(
                status.as_u16(),
                format!("Messages request failed with {status}: {body}"),
            ));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::decode(format!("Invalid messages response: {e}")))?;

        Ok(body
            .messages
            .into_iter()
            .map(|m| m.into_message(session_id))
            .collect())
    }
}
