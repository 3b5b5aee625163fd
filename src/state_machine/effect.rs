//! Effects produced by state transitions

use crate::message::Message;

/// Non-blocking, user-visible notice (a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn send_failed() -> Self {
        Self {
            title: "Error".to_string(),
            description: "Failed to send message. Please try again.".to_string(),
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the local transcript
    AppendMessage { message: Message },

    /// Post the answer to the workflow webhook (spawns as background task)
    DispatchAnswer { text: String },

    /// Clear the input box
    ResetInput,

    /// Show a notification to the user
    NotifyUser { notification: Notification },

    /// Publish the new state to the view
    NotifyStateChange,
}
