//! Events that can occur in a conversation

use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit {
        text: String,
        /// Creation time stamped on the optimistic local message
        at: DateTime<Utc>,
    },

    // Webhook events
    SendComplete,
    SendFailed {
        message: String,
    },

    // Poll events
    PollMerged {
        /// The merge made the transcript longer
        grew: bool,
    },
}
