//! Chat state types

use crate::message::SessionId;
use serde::{Deserialize, Serialize};

/// Where the conversation stands from the user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for the next answer
    #[default]
    Idle,

    /// Answer dispatched to the webhook, call not yet resolved
    Sending {
        /// A poll already grew the transcript while the call was in flight
        reply_seen: bool,
    },

    /// Webhook accepted the answer, no reply polled yet
    ///
    /// Nothing times this out: if the workflow never answers the
    /// conversation stays here.
    AwaitingReply,
}

impl ChatState {
    /// The "waiting for response" flag
    pub fn is_waiting(self) -> bool {
        matches!(
            self,
            ChatState::Sending { reply_seen: false } | ChatState::AwaitingReply
        )
    }

    /// Input is accepted only when nothing is outstanding
    pub fn input_enabled(self) -> bool {
        matches!(self, ChatState::Idle)
    }

    /// Label for the typing indicator, if one should be shown
    pub fn indicator(self) -> Option<&'static str> {
        match self {
            ChatState::Idle => None,
            ChatState::Sending { .. } => Some("Sending..."),
            ChatState::AwaitingReply => Some("Waiting for response..."),
        }
    }
}

/// Immutable context for a conversation view
#[derive(Debug, Clone)]
pub struct ChatContext {
    pub session_id: SessionId,
}

impl ChatContext {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}
