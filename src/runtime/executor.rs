//! Conversation runtime executor

use super::traits::{MessageSource, WebhookClient};
use super::{ChatView, Command, ViewEvent};
use crate::message::Message;
use crate::reconcile::merge;
use crate::remote::RemoteError;
use crate::state_machine::{transition, ChatContext, ChatState, Effect, Event, TransitionError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Shortest poll period; the ticker cannot run with a zero period
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Results of background network calls, delivered back to the loop
#[derive(Debug)]
enum Outcome {
    Sent(Result<(), RemoteError>),
    Polled(Result<Vec<Message>, RemoteError>),
}

/// Generic conversation runtime that can work with any webhook and message source
pub struct ChatRuntime<W, S>
where
    W: WebhookClient + 'static,
    S: MessageSource + 'static,
{
    context: ChatContext,
    state: ChatState,
    /// Local transcript; only this task mutates it
    messages: Vec<Message>,
    webhook: Arc<W>,
    source: Arc<S>,
    poll_interval: Duration,
    poll_in_flight: bool,
    command_rx: mpsc::Receiver<Command>,
    outcome_tx: mpsc::Sender<Outcome>,
    outcome_rx: mpsc::Receiver<Outcome>,
    view_tx: watch::Sender<ChatView>,
    event_tx: broadcast::Sender<ViewEvent>,
    shutdown: CancellationToken,
}

impl<W, S> ChatRuntime<W, S>
where
    W: WebhookClient + 'static,
    S: MessageSource + 'static,
{
    pub fn new(
        context: ChatContext,
        poll_interval: Duration,
        webhook: W,
        source: S,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<ViewEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        if poll_interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                requested_ms = %poll_interval.as_millis(),
                "Poll interval too short, clamping"
            );
        }
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        let messages = vec![Message::welcome(context.session_id.clone(), Utc::now())];
        let (view_tx, _) = watch::channel(ChatView {
            messages: messages.clone(),
            state: ChatState::Idle,
        });
        let (outcome_tx, outcome_rx) = mpsc::channel(32);

        Self {
            context,
            state: ChatState::Idle,
            messages,
            webhook: Arc::new(webhook),
            source: Arc::new(source),
            poll_interval,
            poll_in_flight: false,
            command_rx,
            outcome_tx,
            outcome_rx,
            view_tx,
            event_tx,
            shutdown,
        }
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ChatView> {
        self.view_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.context.session_id,
            poll_interval_ms = %self.poll_interval.as_millis(),
            "Starting chat runtime"
        );

        let shutdown = self.shutdown.clone();
        // First poll one interval after start, not immediately
        let mut ticker = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                Some(command) = self.command_rx.recv() => self.handle_command(command),
                Some(outcome) = self.outcome_rx.recv() => self.handle_outcome(outcome),
                _ = ticker.tick() => self.start_poll(),
            }
        }

        // Dropping the receivers here discards late network results
        tracing::info!(session_id = %self.context.session_id, "Chat runtime stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { text, reply } => {
                let result = self.apply(Event::UserSubmit {
                    text,
                    at: Utc::now(),
                });
                if let Err(e) = &result {
                    tracing::debug!(error = %e, "Answer rejected");
                }
                let _ = reply.send(result);
            }
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Sent(Ok(())) => self.apply_logged(Event::SendComplete),
            Outcome::Sent(Err(e)) => {
                tracing::error!(
                    session_id = %self.context.session_id,
                    error = %e,
                    "Failed to send answer"
                );
                self.apply_logged(Event::SendFailed { message: e.message });
            }
            Outcome::Polled(result) => {
                self.poll_in_flight = false;
                match result {
                    Ok(remote) if remote.is_empty() => {
                        tracing::trace!("Poll returned no messages");
                    }
                    Ok(remote) => self.reconcile(&remote),
                    Err(e) => {
                        tracing::warn!(
                            session_id = %self.context.session_id,
                            error = %e,
                            status = ?e.status,
                            transport = e.kind.is_transport(),
                            "Poll failed, skipping tick"
                        );
                    }
                }
            }
        }
    }

    /// Merge polled messages into the current transcript
    fn reconcile(&mut self, remote: &[Message]) {
        let merged = merge(&self.messages, remote);
        let grew = merged.grew;

        if merged.messages != self.messages {
            tracing::debug!(
                before = self.messages.len(),
                after = merged.messages.len(),
                "Transcript updated from poll"
            );
            self.messages = merged.messages;
            self.publish_view();
        }

        self.apply_logged(Event::PollMerged { grew });
    }

    fn start_poll(&mut self) {
        if self.poll_in_flight {
            tracing::debug!("Previous poll still running, skipping tick");
            return;
        }
        self.poll_in_flight = true;

        let source = Arc::clone(&self.source);
        let session_id = self.context.session_id.clone();
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_messages(&session_id).await;
            // Fails only after teardown, when the result is no longer wanted
            let _ = outcome_tx.send(Outcome::Polled(result)).await;
        });
    }

    fn apply(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn apply_logged(&mut self, event: Event) {
        if let Err(e) = self.apply(event) {
            tracing::warn!(error = %e, state = ?self.state, "Ignoring event");
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                self.messages.push(message);
                self.publish_view();
            }
            Effect::DispatchAnswer { text } => self.dispatch(text),
            Effect::ResetInput => {
                let _ = self.event_tx.send(ViewEvent::InputReset);
            }
            Effect::NotifyUser { notification } => {
                let _ = self.event_tx.send(ViewEvent::Notification(notification));
            }
            Effect::NotifyStateChange => {
                tracing::debug!(
                    state = ?self.state,
                    waiting = self.state.is_waiting(),
                    input_enabled = self.state.input_enabled(),
                    "State changed"
                );
                self.publish_view();
            }
        }
    }

    /// Fire-and-forget delivery of an answer
    fn dispatch(&self, text: String) {
        let webhook = Arc::clone(&self.webhook);
        let session_id = self.context.session_id.clone();
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = webhook.post_answer(&session_id, &text).await;
            let _ = outcome_tx.send(Outcome::Sent(result)).await;
        });
    }

    fn publish_view(&self) {
        self.view_tx.send_replace(ChatView {
            messages: self.messages.clone(),
            state: self.state,
        });
    }
}
