//! Merging the local transcript with polled server state
//!
//! The server's list and the local buffer describe the same conversation,
//! so the merge is a conflict-free union keyed on `(text, timestamp)`.


use crate::message::Message;
use std::collections::HashSet;

/// Result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub messages: Vec<Message>,
    /// The merged transcript is longer than the local one was.
    ///
    /// This is the only signal that a reply has arrived.
    pub grew: bool,
}

/// Merge `remote` into `local`.
///
/// Keeps the first message seen for each `(text, timestamp)` key, local
/// entries first, then sorts by creation time. The sort is stable and
/// timestamps that fail to parse order before all others.
///
/// An empty `remote` returns `local` untouched, including its order.
pub fn merge(local: &[Message], remote: &[Message]) -> Merged {
    if remote.is_empty() {
        return Merged {
            messages: local.to_vec(),
            grew: false,
        };
    }

    let mut seen = HashSet::with_capacity(local.len() + remote.len());
    let mut messages = Vec::with_capacity(local.len() + remote.len());
    for message in local.iter().chain(remote) {
        if seen.insert(message.dedup_key()) {
            messages.push(message.clone());
        }
    }

    messages.sort_by_cached_key(Message::sent_at);

    let grew = messages.len() > local.len();
    Merged { messages, grew }
}
