//! Plain-text rendering of the conversation

use crate::message::{Message, Sender};
use crate::runtime::ChatView;
use crate::state_machine::ChatState;
use chrono::Local;
use std::collections::HashSet;

/// Prints each message once, in transcript order, as snapshots arrive
#[derive(Default)]
pub struct TranscriptPrinter {
    printed: HashSet<(String, String)>,
    last_state: ChatState,
}

impl TranscriptPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines to print for a new snapshot
    pub fn render(&mut self, view: &ChatView) -> Vec<String> {
        let mut lines = Vec::new();

        for message in &view.messages {
            let (text, timestamp) = message.dedup_key();
            if self.printed.insert((text.to_string(), timestamp.to_string())) {
                lines.push(format_message(message));
            }
        }

        if view.state != self.last_state {
            if let Some(indicator) = view.state.indicator() {
                lines.push(format!("  ... {indicator}"));
            }
            self.last_state = view.state;
        }

        lines
    }
}

/// Decode one raw input line, dropping the line terminator.
///
/// Returns `None` for bytes that are not UTF-8 so the caller can skip the
/// line and keep reading.
pub fn decode_line(mut raw: Vec<u8>) -> Option<String> {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping input line that is not UTF-8");
            None
        }
    }
}

fn format_message(message: &Message) -> String {
    let time = message.sent_at().map_or_else(
        || message.timestamp.clone(),
        |at| at.with_timezone(&Local).format("%H:%M:%S").to_string(),
    );
    let prefix = match message.sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    format!("[{time}] {prefix}> {}", message.text)
}
