//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::message::{Message, SessionId};
use crate::remote::RemoteError;
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound channel to the automation workflow
#[async_trait]
pub trait WebhookClient: Send + Sync {
    /// Deliver a user answer. Fire-and-forget: the reply arrives via polling.
    async fn post_answer(&self, session_id: &SessionId, text: &str) -> Result<(), RemoteError>;
}

/// Authoritative transcript for a session
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Get all stored messages for the session
    async fn fetch_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, RemoteError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: WebhookClient + ?Sized> WebhookClient for Arc<T> {
    async fn post_answer(&self, session_id: &SessionId, text: &str) -> Result<(), RemoteError> {
        (**self).post_answer(session_id, text).await
    }
}

#[async_trait]
impl<T: MessageSource + ?Sized> MessageSource for Arc<T> {
    async fn fetch_messages(&self, session_id: &SessionId) -> Result<Vec<Message>, RemoteError> {
        (**self).fetch_messages(session_id).await
    }
}
