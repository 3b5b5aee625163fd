//! Wire types shared with the workflow webhook and the messages backend

use crate::message::{Message, Sender, SessionId};
use serde::{Deserialize, Serialize};

/// Body posted to the workflow webhook
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload<'a> {
    #[serde(rename = "chatId")]
    pub chat_id: &'a str,
    pub answer: &'a str,
}

/// Body of `GET /api/chat/{id}/messages`
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<RemoteMessage>,
}

/// One stored message as the backend returns it
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteMessage {
    pub message: String,
    pub sender: String,
    pub created_at: String,
    #[allow(dead_code)] // Ignored: results are already scoped to the session
    #[serde(default)]
    pub chat_id: Option<String>,
}

impl RemoteMessage {
    pub fn into_message(self, session_id: &SessionId) -> Message {
        Message::new(
            session_id.clone(),
            self.message,
            Sender::from_wire(&self.sender),
            self.created_at,
        )
    }
}
