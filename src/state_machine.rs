//! Waiting-indicator state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in and executes the effects that come out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, Notification};
pub use event::Event;
pub use state::{ChatContext, ChatState};
pub use transition::{transition, TransitionError};
