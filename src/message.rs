//! Conversation message types
//!
//! A conversation is an ordered list of [`Message`]s tagged with the
//! [`SessionId`] of the view that created it.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;

/// Text of the synthetic greeting every conversation starts with
pub const WELCOME_TEXT: &str = "Hi! What's your name?";

/// Random identifier for one conversation view
///
/// Generated once when the view starts and never persisted; a new view
/// starts a new session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Map the backend's free-form sender string.
    ///
    /// Only `"user"` is recognised; everything else was written by the
    /// workflow and renders as the bot.
    pub fn from_wire(value: &str) -> Self {
        if value == "user" {
            Sender::User
        } else {
            Sender::Bot
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub session_id: SessionId,
    pub text: String,
    pub sender: Sender,
    /// ISO-8601 creation time, kept verbatim as received
    pub timestamp: String,
}

impl Message {
    pub fn new(
        session_id: SessionId,
        text: impl Into<String>,
        sender: Sender,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            text: text.into(),
            sender,
            timestamp: timestamp.into(),
        }
    }

    pub fn user(session_id: SessionId, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(session_id, text, Sender::User, iso_timestamp(at))
    }

    pub fn welcome(session_id: SessionId, at: DateTime<Utc>) -> Self {
        Self::new(session_id, WELCOME_TEXT, Sender::Bot, iso_timestamp(at))
    }

    /// Deduplication key: two messages with the same text and timestamp
    /// are the same message.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.text, &self.timestamp)
    }

    /// Parsed creation time, `None` if the timestamp is not valid ISO-8601.
    ///
    /// Timestamps without an offset are read as UTC.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Format a time the way browsers' `toISOString` does
/// (`2024-05-01T09:30:00.000Z`), so locally created timestamps compare
/// equal to the ones the backend echoes back.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
