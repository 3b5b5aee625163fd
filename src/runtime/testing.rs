//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use super::{ChatHandle, ChatView};
use crate::message::{Message, SessionId};
use crate::remote::RemoteError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock Webhook
// ============================================================================

/// Mock webhook that returns queued results, succeeding once the queue is empty
#[derive(Default)]
pub struct MockWebhook {
    results: Mutex<VecDeque<Result<(), RemoteError>>>,
    delay: Option<Duration>,
    /// Record of all `(session_id, answer)` pairs posted
    pub posts: Mutex<Vec<(String, String)>>,
}

impl MockWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn queue_error(&self, error: RemoteError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_posts(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookClient for MockWebhook {
    async fn post_answer(&self, session_id: &SessionId, text: &str) -> Result<(), RemoteError> {
        self.posts
            .lock()
            .unwrap()
            .push((session_id.to_string(), text.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

// ============================================================================
// Mock Message Source
// ============================================================================

/// Mock backend holding a transcript that every poll returns
///
/// Queued errors are returned first, one per poll.
#[derive(Default)]
pub struct MockMessageSource {
    transcript: Mutex<Vec<Message>>,
    errors: Mutex<VecDeque<RemoteError>>,
    polls: AtomicUsize,
}

impl MockMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_transcript(&self, messages: Vec<Message>) {
        *self.transcript.lock().unwrap() = messages;
    }

    pub fn queue_error(&self, error: RemoteError) {
        self.errors.lock().unwrap().push_back(error);
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for MockMessageSource {
    async fn fetch_messages(&self, _session_id: &SessionId) -> Result<Vec<Message>, RemoteError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.transcript.lock().unwrap().clone())
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Poll fast so tests finish quickly
pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A running conversation wired to mocks
pub struct TestRuntime {
    pub handle: ChatHandle,
    pub webhook: Arc<MockWebhook>,
    pub source: Arc<MockMessageSource>,
}

impl TestRuntime {
    pub fn start() -> Self {
        Self::with_webhook(MockWebhook::new())
    }

    pub fn with_webhook(webhook: MockWebhook) -> Self {
        let webhook = Arc::new(webhook);
        let source = Arc::new(MockMessageSource::new());
        let handle = ChatHandle::start(
            SessionId::from("test-session"),
            TEST_POLL_INTERVAL,
            Arc::clone(&webhook),
            Arc::clone(&source),
        );
        Self {
            handle,
            webhook,
            source,
        }
    }

    /// Wait until the view satisfies `predicate`, giving up after `timeout`
    pub async fn wait_for(
        &self,
        timeout: Duration,
        mut predicate: impl FnMut(&ChatView) -> bool,
    ) -> bool {
        let mut rx = self.handle.watch();
        let reached = tokio::time::timeout(timeout, rx.wait_for(|view| predicate(view)))
            .await
            .is_ok_and(|r| r.is_ok());
        reached
    }

    /// Wait until at least `count` polls have been issued
    pub async fn wait_for_polls(&self, count: usize, timeout: Duration) -> bool {
        let source = Arc::clone(&self.source);
        tokio::time::timeout(timeout, async move {
            while source.poll_count() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{iso_timestamp, Sender, WELCOME_TEXT};
    use crate::runtime::{SubmitError, ViewEvent};
    use crate::state_machine::{ChatState, Notification, TransitionError};
    use chrono::Utc;

    const WAIT: Duration = Duration::from_secs(2);

    fn bot_reply(text: &str) -> Message {
        // Later than anything created locally during the test
        let at = Utc::now() + chrono::Duration::seconds(60);
        Message::new(SessionId::from("test-session"), text, Sender::Bot, iso_timestamp(at))
    }

    fn count_text(view: &ChatView, text: &str) -> usize {
        view.messages.iter().filter(|m| m.text == text).count()
    }

    #[tokio::test]
    async fn test_mock_source_returns_errors_first() {
        let source = MockMessageSource::new();
        source.set_transcript(vec![bot_reply("hello")]);
        source.queue_error(RemoteError::status(502, "bad gateway"));

        let session = SessionId::from("s");
        assert!(source.fetch_messages(&session).await.is_err());
        assert_eq!(source.fetch_messages(&session).await.unwrap().len(), 1);
        assert_eq!(source.poll_count(), 2);
    }

    #[tokio::test]
    async fn test_starts_with_welcome() {
        let rt = TestRuntime::start();

        let view = rt.handle.view();
        assert_eq!(view.state, ChatState::Idle);
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].text, WELCOME_TEXT);
        assert_eq!(view.messages[0].sender, Sender::Bot);
        assert_eq!(view.messages[0].session_id, *rt.handle.session_id());

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_answer_then_reply_returns_to_idle() {
        let rt = TestRuntime::start();

        rt.handle.submit("Amira").await.unwrap();

        // Optimistic append happens before the webhook answers
        let view = rt.handle.view();
        assert_eq!(count_text(&view, "Amira"), 1);
        assert!(view.state.is_waiting());

        assert!(rt.wait_for(WAIT, |v| v.state == ChatState::AwaitingReply).await);
        assert_eq!(
            rt.webhook.recorded_posts(),
            vec![("test-session".to_string(), "Amira".to_string())]
        );

        rt.source.set_transcript(vec![bot_reply("Nice to meet you, Amira!")]);
        assert!(rt.wait_for(WAIT, |v| v.state == ChatState::Idle).await);

        let view = rt.handle.view();
        let texts: Vec<_> = view.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![WELCOME_TEXT, "Amira", "Nice to meet you, Amira!"]);

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_send_failure_keeps_message_and_notifies() {
        let webhook = MockWebhook::new();
        webhook.queue_error(RemoteError::network("connection refused"));
        let rt = TestRuntime::with_webhook(webhook);
        let mut events = rt.handle.subscribe();

        rt.handle.submit("Tunis").await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            ViewEvent::Notification(Notification::send_failed())
        );
        assert_eq!(events.recv().await.unwrap(), ViewEvent::InputReset);

        assert!(rt.wait_for(WAIT, |v| v.state == ChatState::Idle).await);
        let view = rt.handle.view();
        assert!(view.state.input_enabled());
        assert!(!view.state.is_waiting());
        assert_eq!(count_text(&view, "Tunis"), 1);

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_blank_answer_rejected() {
        let rt = TestRuntime::start();

        let err = rt.handle.submit("   ").await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Rejected(TransitionError::EmptyMessage)
        ));
        assert_eq!(rt.handle.view().messages.len(), 1);
        assert!(rt.webhook.recorded_posts().is_empty());

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_second_answer_rejected_while_sending() {
        let rt = TestRuntime::with_webhook(MockWebhook::with_delay(Duration::from_millis(300)));

        rt.handle.submit("Hammamet").await.unwrap();
        let err = rt.handle.submit("Sfax").await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Rejected(TransitionError::InputDisabled)
        ));
        assert_eq!(count_text(&rt.handle.view(), "Sfax"), 0);

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_repeated_polls_add_reply_once() {
        let rt = TestRuntime::start();
        rt.source.set_transcript(vec![bot_reply("Where would you like to go?")]);

        assert!(rt.wait_for_polls(4, WAIT).await);
        // Let the last poll's result land
        tokio::time::sleep(TEST_POLL_INTERVAL).await;

        let view = rt.handle.view();
        assert_eq!(count_text(&view, "Where would you like to go?"), 1);
        assert_eq!(view.messages.len(), 2);

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_poll_failure_is_skipped() {
        let rt = TestRuntime::start();
        rt.source.queue_error(RemoteError::status(500, "boom"));
        rt.source.queue_error(RemoteError::network("reset"));
        rt.source.set_transcript(vec![bot_reply("Back online")]);

        assert!(rt.wait_for(WAIT, |v| count_text(v, "Back online") == 1).await);
        assert!(rt.source.poll_count() >= 3);
        assert_eq!(rt.handle.view().state, ChatState::Idle);

        rt.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_polls_after_shutdown() {
        let rt = TestRuntime::start();
        assert!(rt.wait_for_polls(1, WAIT).await);

        let source = Arc::clone(&rt.source);
        rt.handle.shutdown().await;
        // A poll spawned just before teardown may still start
        tokio::time::sleep(TEST_POLL_INTERVAL).await;
        let polls_at_shutdown = source.poll_count();

        tokio::time::sleep(TEST_POLL_INTERVAL * 5).await;
        assert_eq!(source.poll_count(), polls_at_shutdown);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_polling() {
        let rt = TestRuntime::start();
        assert!(rt.wait_for_polls(1, WAIT).await);

        let TestRuntime { handle, source, .. } = rt;
        drop(handle);
        // Give the runtime a moment to observe the cancellation
        tokio::time::sleep(TEST_POLL_INTERVAL).await;
        let polls_after_drop = source.poll_count();

        tokio::time::sleep(TEST_POLL_INTERVAL * 5).await;
        assert_eq!(source.poll_count(), polls_after_drop);
    }

    #[tokio::test]
    async fn test_zero_poll_interval_is_clamped() {
        let source = Arc::new(MockMessageSource::new());
        source.set_transcript(vec![bot_reply("Still polling")]);
        let handle = ChatHandle::start(
            SessionId::from("test-session"),
            Duration::ZERO,
            MockWebhook::new(),
            Arc::clone(&source),
        );

        let mut rx = handle.watch();
        let reached = tokio::time::timeout(
            WAIT,
            rx.wait_for(|v| count_text(v, "Still polling") == 1),
        )
        .await
        .is_ok_and(|r| r.is_ok());
        assert!(reached);
        assert!(source.poll_count() >= 1);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_closed() {
        let rt = TestRuntime::start();
        let handle = rt.handle;
        let command_tx = handle.command_tx.clone();
        handle.shutdown().await;

        let (reply, _reply_rx) = tokio::sync::oneshot::channel();
        let result = command_tx
            .send(crate::runtime::Command::Submit {
                text: "late".to_string(),
                reply,
            })
            .await;
        assert!(result.is_err());
    }
}
