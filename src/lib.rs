//! Shopchat - session controller for a shopping-assistant chat
//!
//! The conversation lives behind a state machine with pure transitions;
//! backend requests run as background tasks and report back through the
//! same event channel as user input. Transport failures never escape: each
//! one resolves to an in-conversation message and the session keeps
//! accepting input.
//!
//! Typical embedding:
//!
//! ```no_run
//! use shopchat::transport::HttpTransport;
//!
//! # async fn demo() -> Result<(), shopchat::transport::TransportError> {
//! let transport = HttpTransport::from_env()?;
//! let session = shopchat::runtime::spawn_session(transport);
//!
//! session.submit_message("show me running shoes").await.ok();
//!
//! let mut updates = session.watch();
//! while updates.changed().await.is_ok() {
//!     let snapshot = updates.borrow().clone();
//!     if !snapshot.pending_reply {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod conversation;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod telemetry;
pub mod transport;

pub use conversation::{ConversationSnapshot, Message, MessageOrigin};
pub use runtime::{spawn_session, spawn_session_with_id, SessionClosed, SessionHandle};
pub use session::SessionId;
pub use transport::{
    ChatResponse, ChatTransport, CustomerRecord, HttpTransport, Product, TransportConfig,
    TransportError, TransportErrorKind,
};
