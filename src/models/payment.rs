//! Payment webhook payload

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    pub customer_email: String,
}

impl PaymentNotice {
    /// Returns `None` when `customer_email` is absent, not a string, or blank.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let email = payload.get("customer_email")?.as_str()?.trim();
        if email.is_empty() {
            return None;
        }
        Some(Self {
            customer_email: email.to_string(),
        })
    }
}
