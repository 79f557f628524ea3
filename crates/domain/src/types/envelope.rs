//! Uniform response envelope shapes.
//!
//! Success: `{ data, success, message?, timestamp }`.
//! Failure: `{ success: false, error: { code, message, details?, field? }, timestamp }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success envelope around a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ApiEnvelope<Value> {
    /// Whether a raw body looks like an envelope (carries a boolean `success`).
    #[must_use]
    pub fn is_envelope(body: &Value) -> bool {
        body.get("success").is_some_and(Value::is_boolean)
    }
}
