//! Canned assistant lines, verbatim from the product copy

/// Seeded as the first message of every conversation
pub const GREETING: &str =
    "Hi! I'm your AI shopping assistant. How can I help you find the perfect product today?";

/// Substituted when a reply carries no usable text
pub const FALLBACK: &str = "I'm sorry, I didn't understand that. Could you please rephrase?";

/// Appended when a chat request fails for any reason
pub const CHAT_FAILURE: &str =
    "I'm experiencing some technical difficulties. Please try again in a moment.";

/// Appended when a customer record submission succeeds
pub const FORM_THANKS: &str = "Thank you for sharing your information! Our sales team will contact you soon with personalized recommendations.";

/// Appended when a customer record submission fails; the form stays open
pub const FORM_FAILURE: &str =
    "Sorry, there was an issue saving your information. Please try again.";
