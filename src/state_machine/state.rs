//! Session controller state types

use crate::session::SessionId;

/// Controller states for the conversation session state machine.
///
/// The store's UI flags are kept in sync by effects: `pending_reply` mirrors
/// `AwaitingReply`, `form_submitting` mirrors `AwaitingFormSubmit`, and
/// `form_visible` mirrors `FormPrompted` or `AwaitingFormSubmit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Ready for user input, nothing in flight
    #[default]
    Idle,

    /// Chat request in flight, typing indicator shown
    AwaitingReply,

    /// Contact form shown, waiting for the user to fill it in or dismiss it
    FormPrompted,

    /// Customer record submission in flight, form still shown
    AwaitingFormSubmit,
}

impl ControllerState {
    /// Whether a chat request is outstanding
    pub fn pending_reply(&self) -> bool {
        matches!(self, ControllerState::AwaitingReply)
    }

    /// Whether the contact form should be on screen
    pub fn form_visible(&self) -> bool {
        matches!(
            self,
            ControllerState::FormPrompted | ControllerState::AwaitingFormSubmit
        )
    }

    /// Whether a customer record submission is outstanding
    pub fn form_submitting(&self) -> bool {
        matches!(self, ControllerState::AwaitingFormSubmit)
    }
}

/// Context for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Generated once at controller startup, threaded through every
    /// transport effect
    pub session_id: SessionId,
}

impl SessionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}
