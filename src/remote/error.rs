//! Remote call error types

use thiserror::Error;

/// Error from the webhook or the messages backend, with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
    /// HTTP status, when the server answered
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Timeout, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(RemoteErrorKind::Status, message)
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::Decode, message)
    }

    /// Classify a reqwest failure
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let error = if err.is_timeout() {
            Self::timeout(format!("Request timed out: {err}"))
        } else if err.is_decode() {
            Self::decode(format!("Invalid response body: {err}"))
        } else {
            Self::network(format!("Request failed: {err}"))
        };
        match err.status() {
            Some(status) => Self {
                status: Some(status.as_u16()),
                ..error
            },
            None => error,
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Connection refused, DNS, TLS, reset
    Network,
    /// No answer within the request timeout
    Timeout,
    /// Server answered with a non-success status
    Status,
    /// Server answered with a body we could not read
    Decode,
}

impl RemoteErrorKind {
    /// The request never got an answer from the server
    pub fn is_transport(self) -> bool {
        matches!(self, Self::Network | Self::Timeout)
    }
}
