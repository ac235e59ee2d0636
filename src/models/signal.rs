//! Trade signal carried by a charting-platform alert

use serde::Serialize;
use serde_json::{Map, Value};

/// Placeholder for any field the alert omitted.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeSignal {
    pub strategy: String,
    pub ticker: String,
    /// Alerts send the price either as a string or as a JSON number; both are kept as text.
    pub price: String,
    pub timeframe: String,
}

impl TradeSignal {
    /// Extract the signal fields from an alert body, substituting [`NOT_AVAILABLE`] for
    /// missing or null fields.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            strategy: field(payload, "strategy"),
            ticker: field(payload, "ticker"),
            price: field(payload, "price"),
            timeframe: field(payload, "timeframe"),
        }
    }
}

fn field(payload: &Map<String, Value>, key: &str) -> String {
    match payload.get(key) {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
