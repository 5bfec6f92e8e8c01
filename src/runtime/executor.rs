//! Session runtime executor

use crate::conversation::{ConversationSnapshot, ConversationState, MessageDraft};
use crate::session::SessionId;
use crate::state_machine::replies;
use crate::state_machine::{
    transition, ControllerState, Effect, Event, SessionContext, TransitionError,
};
use crate::transport::{ChatTransport, CustomerRecord};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Event loop that owns the conversation and drives transport requests.
///
/// The runtime is the only writer of conversation state. User commands and
/// transport completions arrive on the same event channel, so every change
/// goes through [`transition`] one event at a time and no lock is needed.
pub struct SessionRuntime<T>
where
    T: ChatTransport + 'static,
{
    context: SessionContext,
    state: ControllerState,
    conversation: ConversationState,
    transport: Arc<T>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    snapshot_tx: watch::Sender<ConversationSnapshot>,
}

impl<T> SessionRuntime<T>
where
    T: ChatTransport + 'static,
{
    pub fn new(
        context: SessionContext,
        transport: T,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        snapshot_tx: watch::Sender<ConversationSnapshot>,
    ) -> Self {
        let mut conversation = ConversationState::new();
        conversation.append(MessageDraft::assistant(replies::GREETING));

        let runtime = Self {
            context,
            state: ControllerState::Idle,
            conversation,
            transport: Arc::new(transport),
            event_rx,
            event_tx,
            snapshot_tx,
        };
        // Publish before run() so the first snapshot a caller reads already
        // contains the greeting.
        runtime.publish_snapshot();
        runtime
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");

        loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    self.process_event(event);
                }
                () = self.snapshot_tx.closed() => {
                    // Every handle and watcher is gone; nobody can observe
                    // this session anymore.
                    break;
                }
                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.context, event) {
            Ok(result) => result,
            Err(error @ TransitionError::InvalidTransition(_)) => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    state = ?self.state,
                    error = %error,
                    "Dropping unexpected event"
                );
                return;
            }
            Err(refusal) => {
                // Blank input, duplicate sends, typing while the form is up.
                // The conversation is left untouched.
                tracing::debug!(
                    session_id = %self.context.session_id,
                    state = ?self.state,
                    reason = %refusal,
                    "Event refused"
                );
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.apply_effect(effect);
        }
        self.publish_snapshot();
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Append { draft } => {
                self.conversation.append(draft);
            }
            Effect::SetPendingReply(pending) => self.conversation.set_pending_reply(pending),
            Effect::SetFormVisible(visible) => self.conversation.set_form_visible(visible),
            Effect::SetFormSubmitting(submitting) => {
                self.conversation.set_form_submitting(submitting);
            }
            Effect::SendChat { text, session_id } => self.spawn_chat_request(text, session_id),
            Effect::SubmitRecord { record, session_id } => {
                self.spawn_submission(record, session_id);
            }
        }
    }

    /// Run the chat request as a background task. Completion comes back
    /// through the event channel like any other input, so a slow backend
    /// never blocks the loop.
    fn spawn_chat_request(&self, text: String, session_id: SessionId) {
        let transport = Arc::clone(&self.transport);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tracing::info!(session_id = %session_id, "Sending chat message (background)");
            let start = std::time::Instant::now();

            let result = transport.send_message(&text, &session_id).await;
            let duration = start.elapsed();

            let event = match result {
                Ok(response) => {
                    tracing::info!(
                        session_id = %session_id,
                        duration_ms = %duration.as_millis(),
                        products = response.products.len(),
                        wants_form = response.wants_customer_info(),
                        "Chat reply received"
                    );
                    Event::ReplyReceived { response }
                }
                Err(error) => {
                    tracing::error!(
                        session_id = %session_id,
                        duration_ms = %duration.as_millis(),
                        kind = ?error.kind,
                        error = %error,
                        "Chat request failed"
                    );
                    Event::ReplyFailed { error }
                }
            };

            // The runtime may have stopped while the request was in flight
            let _ = event_tx.send(event).await;
        });
    }

    fn spawn_submission(&self, record: CustomerRecord, session_id: SessionId) {
        let transport = Arc::clone(&self.transport);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tracing::info!(session_id = %session_id, "Submitting customer record (background)");
            let start = std::time::Instant::now();

            let result = transport.submit_customer_info(&record, &session_id).await;
            let duration = start.elapsed();

            let event = match result {
                Ok(()) => {
                    tracing::info!(
                        session_id = %session_id,
                        duration_ms = %duration.as_millis(),
                        "Customer record accepted"
                    );
                    Event::RecordAccepted
                }
                Err(error) => {
                    tracing::error!(
                        session_id = %session_id,
                        duration_ms = %duration.as_millis(),
                        kind = ?error.kind,
                        error = %error,
                        "Customer record submission failed"
                    );
                    Event::RecordRejected { error }
                }
            };

            let _ = event_tx.send(event).await;
        });
    }

    fn publish_snapshot(&self) {
        let _ = self.snapshot_tx.send(self.conversation.snapshot());
    }
}
