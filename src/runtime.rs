//! Runtime for a conversation view
//!
//! One task owns the transcript and the chat state. It executes the
//! effects of the state machine, schedules polls, and publishes snapshots
//! for the view. The [`ChatHandle`] is the only way in and tears the task
//! down when shut down or dropped.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
pub use traits::*;

use crate::message::{Message, SessionId};
use crate::state_machine::{ChatContext, ChatState, Notification, TransitionError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Everything the view renders, replaced wholesale on every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub state: ChatState,
}

/// One-off events for the view
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Notification(Notification),
    /// The pending answer resolved; clear the input box
    InputReset,
}

/// Requests from the view to the runtime
#[derive(Debug)]
pub enum Command {
    Submit {
        text: String,
        reply: oneshot::Sender<Result<(), TransitionError>>,
    },
}

/// Why an answer was not accepted
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Conversation has been closed")]
    Closed,
}

/// Handle to a running conversation
pub struct ChatHandle {
    session_id: SessionId,
    command_tx: mpsc::Sender<Command>,
    view_rx: watch::Receiver<ChatView>,
    event_tx: broadcast::Sender<ViewEvent>,
    /// Cancels the runtime's token when dropped, which happens exactly once
    teardown: DropGuard,
    task: JoinHandle<()>,
}

impl ChatHandle {
    /// Start a conversation for `session_id` in the background
    ///
    /// Intervals shorter than one millisecond, including zero, are raised
    /// to one millisecond.
    pub fn start<W, S>(session_id: SessionId, poll_interval: Duration, webhook: W, source: S) -> Self
    where
        W: WebhookClient + 'static,
        S: MessageSource + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (event_tx, _) = broadcast::channel(64);
        let token = CancellationToken::new();

        let runtime = ChatRuntime::new(
            ChatContext::new(session_id.clone()),
            poll_interval,
            webhook,
            source,
            command_rx,
            event_tx.clone(),
            token.clone(),
        );
        let view_rx = runtime.subscribe_view();

        let task = tokio::spawn(runtime.run());

        Self {
            session_id,
            command_tx,
            view_rx,
            event_tx,
            teardown: token.drop_guard(),
            task,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Submit a user answer.
    ///
    /// Returns once the runtime accepted or rejected it; delivery to the
    /// webhook happens in the background.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SubmitError> {
        let (reply, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Submit {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| SubmitError::Closed)?;

        reply_rx.await.map_err(|_| SubmitError::Closed)??;
        Ok(())
    }

    /// Current snapshot
    #[allow(dead_code)] // API completeness
    pub fn view(&self) -> ChatView {
        self.view_rx.borrow().clone()
    }

    /// Receiver that is notified on every snapshot change
    pub fn watch(&self) -> watch::Receiver<ChatView> {
        self.view_rx.clone()
    }

    /// Subscribe to notifications and input resets
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.event_tx.subscribe()
    }

    /// Tear the conversation down and wait for the runtime to stop.
    ///
    /// No poll starts and no result is applied after this returns.
    pub async fn shutdown(self) {
        let Self { teardown, task, .. } = self;
        drop(teardown);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Chat runtime task failed");
        }
    }
}
