//! Pure state transition function

use super::{ChatContext, ChatState, Effect, Event, Notification};
use crate::message::Message;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Input is disabled while a message is outstanding")]
    InputDisabled,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // ============================================================
        // User input
        // ============================================================
        (ChatState::Idle, Event::UserSubmit { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + UserSubmit -> Sending (optimistic append, then dispatch)
        (ChatState::Idle, Event::UserSubmit { text, at }) => {
            let message = Message::user(context.session_id.clone(), text.clone(), at);
            Ok(TransitionResult::new(ChatState::Sending { reply_seen: false })
                .with_effect(Effect::AppendMessage { message })
                .with_effect(Effect::NotifyStateChange)
                .with_effect(Effect::DispatchAnswer { text }))
        }

        (ChatState::Sending { .. } | ChatState::AwaitingReply, Event::UserSubmit { .. }) => {
            Err(TransitionError::InputDisabled)
        }

        // ============================================================
        // Webhook outcome
        // ============================================================

        // A reply already showed up while sending: nothing left to wait for
        (ChatState::Sending { reply_seen: true }, Event::SendComplete) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::ResetInput)
                .with_effect(Effect::NotifyStateChange))
        }

        (ChatState::Sending { reply_seen: false }, Event::SendComplete) => {
            Ok(TransitionResult::new(ChatState::AwaitingReply)
                .with_effect(Effect::ResetInput)
                .with_effect(Effect::NotifyStateChange))
        }

        // The optimistic message stays; only the waiting flag is cleared
        (ChatState::Sending { .. }, Event::SendFailed { .. }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::NotifyUser {
                    notification: Notification::send_failed(),
                })
                .with_effect(Effect::ResetInput)
                .with_effect(Effect::NotifyStateChange))
        }

        (state @ (ChatState::Idle | ChatState::AwaitingReply), Event::SendComplete) => {
            Err(TransitionError::InvalidTransition(format!(
                "send completed in {state:?}"
            )))
        }

        (state @ (ChatState::Idle | ChatState::AwaitingReply), Event::SendFailed { message }) => {
            Err(TransitionError::InvalidTransition(format!(
                "send failed in {state:?}: {message}"
            )))
        }

        // ============================================================
        // Poll results
        // ============================================================
        (ChatState::Sending { reply_seen: false }, Event::PollMerged { grew: true }) => {
            Ok(TransitionResult::new(ChatState::Sending { reply_seen: true })
                .with_effect(Effect::NotifyStateChange))
        }

        (ChatState::AwaitingReply, Event::PollMerged { grew: true }) => {
            Ok(TransitionResult::new(ChatState::Idle).with_effect(Effect::NotifyStateChange))
        }

        // Nothing new, or nobody waiting
        (state, Event::PollMerged { .. }) => Ok(TransitionResult::new(state)),
    }
}
