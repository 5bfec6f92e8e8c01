//! Effects produced by state transitions

use crate::conversation::MessageDraft;
use crate::session::SessionId;
use crate::transport::{CustomerRecord, Product};

/// Effects to be executed after a state transition. Store mutations are
/// applied inline by the runtime; transport effects spawn background tasks
/// whose completions come back as new events.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append a message to the conversation log
    Append { draft: MessageDraft },

    /// Toggle the typing indicator flag
    SetPendingReply(bool),

    /// Show or hide the contact form
    SetFormVisible(bool),

    /// Toggle the form's submitting flag
    SetFormSubmitting(bool),

    /// Issue a chat request (spawns as background task)
    SendChat { text: String, session_id: SessionId },

    /// Submit a customer record (spawns as background task)
    SubmitRecord {
        record: CustomerRecord,
        session_id: SessionId,
    },
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::Append {
            draft: MessageDraft::user(text),
        }
    }

    pub fn append_assistant(text: impl Into<String>) -> Self {
        Effect::Append {
            draft: MessageDraft::assistant(text),
        }
    }

    pub fn append_assistant_with_products(text: impl Into<String>, products: Vec<Product>) -> Self {
        Effect::Append {
            draft: MessageDraft::assistant_with_products(text, products),
        }
    }

    pub fn send_chat(text: impl Into<String>, session_id: SessionId) -> Self {
        Effect::SendChat {
            text: text.into(),
            session_id,
        }
    }

    pub fn submit_record(record: CustomerRecord, session_id: SessionId) -> Self {
        Effect::SubmitRecord { record, session_id }
    }
}
