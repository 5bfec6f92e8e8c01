//! Wire types for the shopping-assistant backend

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Products
// ============================================================================

/// A product recommendation attached to an assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend catalog id, when provided (addresses the product-detail endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    /// The backend emits `image_url`; the original web client read `image`,
    /// so both spellings are accepted
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// ============================================================================
// Chat response
// ============================================================================

/// Everything a chat reply may carry. Every field is optional on the wire;
/// absent fields fall back to defaults rather than failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub collect_info: bool,
    #[serde(default)]
    pub show_form: bool,
}

impl ChatResponse {
    /// Reply text resolved the way the original web client resolves it:
    /// `response` falling back to `message`, with empty strings treated as
    /// absent. `None` means the canned fallback line applies.
    pub fn reply_text(&self) -> Option<&str> {
        non_empty(self.response.as_deref()).or_else(|| non_empty(self.message.as_deref()))
    }

    /// Whether the backend asked the client to prompt for contact info.
    /// `collect_info` and `show_form` are interchangeable trigger spellings.
    pub fn wants_customer_info(&self) -> bool {
        self.collect_info || self.show_form
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

// ============================================================================
// Customer record
// ============================================================================

/// Contact details collected by the customer-info form. Submitted once and
/// discarded; never retained in conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CustomerRecord {
    /// Presence checks matching the original form: first name, last name,
    /// age and phone are required; email is optional. Runs before any
    /// request is issued.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("first name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("last name"));
        }
        if self.age == 0 {
            return Err(ValidationError::InvalidAge);
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingField("phone"));
        }
        Ok(())
    }
}

/// Why a [`CustomerRecord`] was refused client-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("age must be greater than zero")]
    InvalidAge,
}
