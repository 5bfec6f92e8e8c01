//! Backend transport: the typed contract against the shopping-assistant API
//!
//! The session controller only ever sees the [`ChatTransport`] trait; the
//! `reqwest` implementation lives in the `http` submodule.

pub mod error;
mod http;
pub mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::{HttpTransport, TransportConfig};
pub use types::{ChatResponse, CustomerRecord, Product, ValidationError};

use crate::session::SessionId;
use async_trait::async_trait;
use std::sync::Arc;

/// Stateless request/response surface of the shopping-assistant backend.
///
/// `send_message` and `submit_customer_info` drive the conversation. The
/// read operations exist for embedding applications (history restore,
/// catalog browsing); the session controller never calls them.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// `POST /api/chat` with the message text and session id
    async fn send_message(
        &self,
        text: &str,
        session: &SessionId,
    ) -> Result<ChatResponse, TransportError>;

    /// `POST /api/customers` with the record fields flattened next to the
    /// session id
    async fn submit_customer_info(
        &self,
        record: &CustomerRecord,
        session: &SessionId,
    ) -> Result<(), TransportError>;

    /// `GET /api/chat/history/{session_id}`
    async fn chat_history(&self, session: &SessionId) -> Result<serde_json::Value, TransportError>;

    /// `GET /api/products/search?q={query}`
    async fn search_products(&self, query: &str) -> Result<serde_json::Value, TransportError>;

    /// `GET /api/products/{id}`
    async fn product_detail(&self, product_id: i64) -> Result<serde_json::Value, TransportError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send_message(
        &self,
        text: &str,
        session: &SessionId,
    ) -> Result<ChatResponse, TransportError> {
        (**self).send_message(text, session).await
    }

    async fn submit_customer_info(
        &self,
        record: &CustomerRecord,
        session: &SessionId,
    ) -> Result<(), TransportError> {
        (**self).submit_customer_info(record, session).await
    }

    async fn chat_history(&self, session: &SessionId) -> Result<serde_json::Value, TransportError> {
        (**self).chat_history(session).await
    }

    async fn search_products(&self, query: &str) -> Result<serde_json::Value, TransportError> {
        (**self).search_products(query).await
    }

    async fn product_detail(&self, product_id: i64) -> Result<serde_json::Value, TransportError> {
        (**self).product_detail(product_id).await
    }
}
