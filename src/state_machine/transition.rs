//! Pure state transition function

use super::replies;
use super::{ControllerState, Effect, Event, SessionContext};
use crate::transport::{ChatResponse, ValidationError};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ControllerState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ControllerState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition. All are benign refusals: the
/// runtime logs them and leaves the session unchanged; nothing user-visible
/// happens.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Message is blank")]
    BlankMessage,
    #[error("A reply is already pending")]
    ReplyInFlight,
    #[error("A record submission is already pending")]
    SubmissionInFlight,
    #[error("The contact form is open")]
    FormOpen,
    #[error("Invalid customer record: {0}")]
    InvalidRecord(#[from] ValidationError),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function: same inputs, same outputs, no I/O. The runtime
/// owns every side effect.
pub fn transition(
    state: &ControllerState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Outbound chat messages
        // ============================================================

        // Idle + MessageSubmitted -> AwaitingReply
        (ControllerState::Idle, Event::MessageSubmitted { text }) => {
            // Blank check trims; the appended and sent text stays as typed
            if text.trim().is_empty() {
                return Err(TransitionError::BlankMessage);
            }
            Ok(TransitionResult::new(ControllerState::AwaitingReply)
                .with_effect(Effect::append_user(text.clone()))
                .with_effect(Effect::SetPendingReply(true))
                .with_effect(Effect::send_chat(text, context.session_id.clone())))
        }

        // Single-flight guard: one chat request at a time
        (ControllerState::AwaitingReply, Event::MessageSubmitted { .. }) => {
            Err(TransitionError::ReplyInFlight)
        }

        // Chat and form interaction are serialized while the form is up
        (
            ControllerState::FormPrompted | ControllerState::AwaitingFormSubmit,
            Event::MessageSubmitted { .. },
        ) => Err(TransitionError::FormOpen),

        // ============================================================
        // Reply processing
        // ============================================================

        (ControllerState::AwaitingReply, Event::ReplyReceived { response }) => {
            Ok(apply_reply(response))
        }

        // Failures recover locally: canned line, indicator off, back to Idle
        (ControllerState::AwaitingReply, Event::ReplyFailed { .. }) => {
            Ok(TransitionResult::new(ControllerState::Idle)
                .with_effect(Effect::append_assistant(replies::CHAT_FAILURE))
                .with_effect(Effect::SetPendingReply(false)))
        }

        // ============================================================
        // Contact form
        // ============================================================

        // FormPrompted + FormSubmitted -> AwaitingFormSubmit (valid records only)
        (ControllerState::FormPrompted, Event::FormSubmitted { record }) => {
            record.validate()?;
            Ok(TransitionResult::new(ControllerState::AwaitingFormSubmit)
                .with_effect(Effect::SetFormSubmitting(true))
                .with_effect(Effect::submit_record(record, context.session_id.clone())))
        }

        (ControllerState::FormPrompted, Event::FormCancelled) => {
            Ok(TransitionResult::new(ControllerState::Idle)
                .with_effect(Effect::SetFormVisible(false)))
        }

        // No duplicate submissions, no cancelling an issued request
        (
            ControllerState::AwaitingFormSubmit,
            Event::FormSubmitted { .. } | Event::FormCancelled,
        ) => Err(TransitionError::SubmissionInFlight),

        (ControllerState::AwaitingFormSubmit, Event::RecordAccepted) => {
            Ok(TransitionResult::new(ControllerState::Idle)
                .with_effect(Effect::SetFormVisible(false))
                .with_effect(Effect::SetFormSubmitting(false))
                .with_effect(Effect::append_assistant(replies::FORM_THANKS)))
        }

        // Submission failure keeps the form up for another attempt
        (ControllerState::AwaitingFormSubmit, Event::RecordRejected { .. }) => {
            Ok(TransitionResult::new(ControllerState::FormPrompted)
                .with_effect(Effect::SetFormSubmitting(false))
                .with_effect(Effect::append_assistant(replies::FORM_FAILURE)))
        }

        // ============================================================
        // Everything else is a protocol violation
        // ============================================================

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {:?} with event {:?}",
            state, event
        ))),
    }
}

/// Interpret a resolved chat reply: pick the display text the way the
/// original client does, attach products, and honor the form trigger.
fn apply_reply(response: ChatResponse) -> TransitionResult {
    let text = response
        .reply_text()
        .unwrap_or(replies::FALLBACK)
        .to_string();
    let wants_form = response.wants_customer_info();

    TransitionResult::new(if wants_form {
        ControllerState::FormPrompted
    } else {
        ControllerState::Idle
    })
    .with_effect(Effect::append_assistant_with_products(text, response.products))
    .with_effect(Effect::SetPendingReply(false))
    .with_effects(wants_form.then(|| Effect::SetFormVisible(true)))
}
