//! Session runtime: channel wiring and the caller-facing handle
//!
//! [`spawn_session`] starts one [`SessionRuntime`] task per conversation and
//! hands back a cloneable [`SessionHandle`]. Commands flow in over an mpsc
//! channel; the conversation flows out as [`ConversationSnapshot`] values on
//! a watch channel, so observers always see the latest state without
//! queueing.

mod executor;


pub use executor::SessionRuntime;

use crate::conversation::ConversationSnapshot;
use crate::session::SessionId;
use crate::state_machine::{Event, SessionContext};
use crate::transport::{ChatTransport, CustomerRecord};
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// The session's event loop has shut down and no longer accepts commands.
#[derive(Debug, Error)]
#[error("session closed")]
pub struct SessionClosed;

/// Cloneable handle for driving a running session.
///
/// Dropping every handle (and every receiver obtained from [`watch`])
/// stops the runtime task.
///
/// [`watch`]: SessionHandle::watch
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    event_tx: mpsc::Sender<Event>,
    snapshot_rx: watch::Receiver<ConversationSnapshot>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Submit a user message. Blank text and messages sent while a reply is
    /// pending are refused inside the runtime without an error here.
    pub async fn submit_message(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Event::MessageSubmitted { text: text.into() }).await
    }

    /// Submit the contact form. Validation happens inside the runtime; an
    /// incomplete record never reaches the backend.
    pub async fn submit_customer_info(&self, record: CustomerRecord) -> Result<(), SessionClosed> {
        self.send(Event::FormSubmitted { record }).await
    }

    /// Dismiss the contact form without submitting it.
    pub async fn cancel_form(&self) -> Result<(), SessionClosed> {
        self.send(Event::FormCancelled).await
    }

    /// Current conversation snapshot.
    pub fn snapshot(&self) -> ConversationSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to conversation updates. The receiver yields the latest
    /// snapshot after every applied event.
    pub fn watch(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, event: Event) -> Result<(), SessionClosed> {
        self.event_tx.send(event).await.map_err(|_| SessionClosed)
    }
}

/// Spawn a session runtime with a freshly generated session id.
pub fn spawn_session<T>(transport: T) -> SessionHandle
where
    T: ChatTransport + 'static,
{
    spawn_session_with_id(transport, SessionId::generate())
}

/// Spawn a session runtime under a caller-provided session id, for embedders
/// that thread their own identifiers.
pub fn spawn_session_with_id<T>(transport: T, session_id: SessionId) -> SessionHandle
where
    T: ChatTransport + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(ConversationSnapshot::default());

    let context = SessionContext::new(session_id.clone());
    let runtime = SessionRuntime::new(context, transport, event_rx, event_tx.clone(), snapshot_tx);

    let task_id = session_id.clone();
    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(session_id = %task_id, "Session runtime finished");
    });

    SessionHandle {
        session_id,
        event_tx,
        snapshot_rx,
    }
}
