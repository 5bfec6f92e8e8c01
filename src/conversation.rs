//! Conversation state store: append-only message log plus UI flags

use crate::transport::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    User,
    Assistant,
}

/// One turn in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within the session, strictly increasing
    pub id: u64,
    pub origin: MessageOrigin,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Product cards attached to assistant replies
    #[serde(default)]
    pub products: Vec<Product>,
}

/// A message before the store assigns its id and timestamp. Transitions
/// produce drafts so they stay free of clocks and counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub origin: MessageOrigin,
    pub text: String,
    pub products: Vec<Product>,
}

impl MessageDraft {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: MessageOrigin::User,
            text: text.into(),
            products: Vec::new(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            origin: MessageOrigin::Assistant,
            text: text.into(),
            products: Vec::new(),
        }
    }

    pub fn assistant_with_products(text: impl Into<String>, products: Vec<Product>) -> Self {
        Self {
            origin: MessageOrigin::Assistant,
            text: text.into(),
            products,
        }
    }
}

/// Conversation state owned exclusively by the session runtime. Mutations
/// are total: appends cannot fail and flags are plain setters.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    pending_reply: bool,
    form_visible: bool,
    form_submitting: bool,
    next_id: u64,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, assigning the next id and the current time.
    /// Returns the assigned id. Messages are never removed or reordered.
    pub fn append(&mut self, draft: MessageDraft) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(Message {
            id,
            origin: draft.origin,
            text: draft.text,
            timestamp: Utc::now(),
            products: draft.products,
        });
        id
    }

    pub fn set_pending_reply(&mut self, pending: bool) {
        self.pending_reply = pending;
    }

    pub fn set_form_visible(&mut self, visible: bool) {
        self.form_visible = visible;
    }

    pub fn set_form_submitting(&mut self, submitting: bool) {
        self.form_submitting = submitting;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_reply(&self) -> bool {
        self.pending_reply
    }

    pub fn form_visible(&self) -> bool {
        self.form_visible
    }

    pub fn form_submitting(&self) -> bool {
        self.form_submitting
    }

    /// Cloned read model for the presentation layer
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            pending_reply: self.pending_reply,
            form_visible: self.form_visible,
            form_submitting: self.form_submitting,
        }
    }
}

/// Read-only view published to observers after every processed event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub pending_reply: bool,
    pub form_visible: bool,
    pub form_submitting: bool,
}

impl ConversationSnapshot {
    /// Most recent message, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
