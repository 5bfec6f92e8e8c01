//! HTTP implementation of the chat transport

use super::types::{ChatResponse, CustomerRecord};
use super::{ChatTransport, TransportError};
use crate::session::SessionId;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Uniform deadline for every request, matching the original client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Read the base URL from `SHOPCHAT_API_URL`, falling back to the
    /// local development default.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SHOPCHAT_API_URL")
                .ok()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// `reqwest`-backed transport against the shopping-assistant backend
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(TransportConfig::from_env())
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(
        &self,
        text: &str,
        session: &SessionId,
    ) -> Result<ChatResponse, TransportError> {
        let request = ChatRequest {
            message: text,
            session_id: session.as_str(),
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            TransportError::invalid_response(format!(
                "Failed to parse chat response: {} - body: {}",
                e, body
            ))
        })
    }

    async fn submit_customer_info(
        &self,
        record: &CustomerRecord,
        session: &SessionId,
    ) -> Result<(), TransportError> {
        let payload = CustomerPayload {
            record,
            session_id: session.as_str(),
        };

        let response = self
            .client
            .post(format!("{}/api/customers", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(map_send_error)?;

        // Success body is informational only
        read_success_body(response).await?;
        Ok(())
    }

    async fn chat_history(&self, session: &SessionId) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/chat/history/{}", self.base_url, session))
            .send()
            .await
            .map_err(map_send_error)?;

        let body = read_success_body(response).await?;
        parse_json(&body, "history")
    }

    async fn search_products(&self, query: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/products/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(map_send_error)?;

        let body = read_success_body(response).await?;
        parse_json(&body, "search")
    }

    async fn product_detail(&self, product_id: i64) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/products/{}", self.base_url, product_id))
            .send()
            .await
            .map_err(map_send_error)?;

        let body = read_success_body(response).await?;
        parse_json(&body, "product detail")
    }
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("Request timeout: {}", e))
    } else if e.is_connect() {
        TransportError::network(format!("Connection failed: {}", e))
    } else {
        TransportError::unknown(format!("Request failed: {}", e))
    }
}

/// Read the body, classifying non-2xx statuses into transport errors
async fn read_success_body(response: reqwest::Response) -> Result<String, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::network(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(classify_status(status, &body));
    }
    Ok(body)
}

fn classify_status(status: reqwest::StatusCode, body: &str) -> TransportError {
    let message = backend_error_message(body).unwrap_or_else(|| body.to_string());
    match status.as_u16() {
        400..=499 => TransportError::invalid_request(format!("Backend rejected request: {}", message)),
        500..=599 => TransportError::server_error(format!("Server error: {}", message)),
        _ => TransportError::unknown(format!("HTTP {}: {}", status, message)),
    }
}

/// Backend error payloads carry a human-readable string under `error` or
/// `message`; fall back to the raw body when neither is present.
fn backend_error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| parsed.get(key).and_then(serde_json::Value::as_str))
        .map(str::to_string)
}

fn parse_json(body: &str, what: &str) -> Result<serde_json::Value, TransportError> {
    serde_json::from_str(body)
        .map_err(|e| TransportError::invalid_response(format!("Failed to parse {} response: {}", what, e)))
}

// Backend request types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct CustomerPayload<'a> {
    #[serde(flatten)]
    record: &'a CustomerRecord,
    session_id: &'a str,
}
