//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Main error type for FinanceFlow
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FinanceFlowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for FinanceFlow operations
pub type Result<T> = std::result::Result<T, FinanceFlowError>;

/// Fieldless classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    Server,
    Client,
    Auth,
    Validation,
    Socket,
    Decode,
}

crate::impl_wire_string_conversions!(ErrorKind {
    Network => "network",
    Timeout => "timeout",
    Server => "server",
    Client => "client",
    Auth => "auth",
    Validation => "validation",
    Socket => "socket",
    Decode => "decode",
});

/// Server-provided error information.
///
/// Populated from the error envelope
/// (`{ success: false, error: { code, message, details?, field? } }`), from a
/// FastAPI style `{ detail: ... }` body, or from the raw body when neither
/// shape matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<Value>,
    pub field: Option<String>,
    /// Raw response body as received.
    #[serde(skip)]
    pub body: String,
}

impl ErrorDetail {
    /// Detail that only carries a message (no response body involved).
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Self::default() }
    }

    /// Same as [`ErrorDetail::from_message`] with a machine-readable code.
    #[must_use]
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: Some(code.into()), message: message.into(), ..Self::default() }
    }

    /// Extract error information from a response body.
    ///
    /// `fallback` is used as the message when the body carries none.
    #[must_use]
    pub fn parse(body: &str, fallback: &str) -> Self {
        let mut detail = Self { message: fallback.to_string(), body: body.to_string(), ..Self::default() };

        let Ok(json) = serde_json::from_str::<Value>(body) else {
            let trimmed = body.trim();
            if !trimmed.is_empty() {
                detail.message = trimmed.chars().take(200).collect();
            }
            return detail;
        };

        if let Some(error) = json.get("error").and_then(Value::as_object) {
            detail.code = error.get("code").and_then(value_to_string);
            if let Some(message) = error.get("message").and_then(Value::as_str) {
                detail.message = message.to_string();
            }
            detail.details = error.get("details").cloned().filter(|v| !v.is_null());
            detail.field = error.get("field").and_then(Value::as_str).map(String::from);
            return detail;
        }

        match json.get("detail") {
            Some(Value::String(message)) => detail.message = message.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> =
                    items.iter().filter_map(|item| item.get("msg").and_then(Value::as_str)).collect();
                if !messages.is_empty() {
                    detail.message = messages.join("; ");
                }
                detail.details = Some(Value::Array(items.clone()));
            }
            _ => {
                if let Some(message) = json.get("message").and_then(Value::as_str) {
                    detail.message = message.to_string();
                }
            }
        }

        detail
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }

    /// Collect field errors from an error detail.
    ///
    /// Understands `error.field` + `error.message`, `error.details` given as
    /// a list of `{field, message}` or as a `{field: message}` map, and the
    /// FastAPI `detail: [{loc: [..., field], msg}]` list.
    #[must_use]
    pub fn collect(detail: &ErrorDetail) -> Vec<Self> {
        let mut fields = Vec::new();

        match &detail.details {
            Some(Value::Array(items)) => {
                for item in items {
                    let field = item
                        .get("field")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .or_else(|| {
                            item.get("loc")
                                .and_then(Value::as_array)
                                .and_then(|loc| loc.last())
                                .and_then(value_to_string)
                        });
                    let message = item
                        .get("message")
                        .or_else(|| item.get("msg"))
                        .and_then(Value::as_str);
                    if let (Some(field), Some(message)) = (field, message) {
                        fields.push(Self::new(field, message));
                    }
                }
            }
            Some(Value::Object(map)) => {
                for (field, message) in map {
                    if let Some(message) = message.as_str() {
                        fields.push(Self::new(field.clone(), message));
                    }
                }
            }
            _ => {}
        }

        if fields.is_empty() {
            if let Some(field) = &detail.field {
                fields.push(Self::new(field.clone(), detail.message.clone()));
            }
        }

        fields
    }
}

fn summarize_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return "request rejected".to_string();
    }
    fields.iter().map(|f| format!("{}: {}", f.field, f.message)).collect::<Vec<_>>().join(", ")
}

/// Request-level error taxonomy for the API client.
///
/// Values are cheap to clone so that a single outcome (for example a failed
/// token refresh) can be handed to every request waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// No response reached the caller (connectivity).
    #[error("Network error: {message}")]
    Network { message: String },

    /// The request exceeded its deadline.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// 5xx response.
    #[error("Server error ({status}): {}", .detail.message)]
    Server { status: u16, detail: ErrorDetail },

    /// 4xx response other than 401 and 422.
    #[error("Client error ({status}): {}", .detail.message)]
    Client { status: u16, detail: ErrorDetail },

    /// 401 response, or a failed token refresh.
    #[error("Authentication error: {}", .detail.message)]
    Auth { detail: ErrorDetail },

    /// 422 response with per-field failures.
    #[error("Validation failed: {}", summarize_fields(.fields))]
    Validation { status: u16, fields: Vec<FieldError>, detail: ErrorDetail },

    /// WebSocket transport failure.
    #[error("Socket error: {message}")]
    Socket { message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },
}

impl ApiError {
    /// Classify an HTTP error response.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = ErrorDetail::parse(body, &default_message(status));
        match status {
            401 => Self::Auth { detail },
            422 => {
                let fields = FieldError::collect(&detail);
                Self::Validation { status, fields, detail }
            }
            500..=599 => Self::Server { status, detail },
            _ => Self::Client { status, detail },
        }
    }

    /// Authentication failure that did not come from an HTTP response.
    #[must_use]
    pub fn auth(code: &str, message: impl Into<String>) -> Self {
        Self::Auth { detail: ErrorDetail::with_code(code, message) }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    #[must_use]
    pub fn socket(message: impl Into<String>) -> Self {
        Self::Socket { message: message.into() }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Server { .. } => ErrorKind::Server,
            Self::Client { .. } => ErrorKind::Client,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Socket { .. } => ErrorKind::Socket,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Whether the retry policy may re-issue the request.
    ///
    /// Only connectivity failures and 5xx responses qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// HTTP status carried by the error. Authentication failures always
    /// report 401, including refresh failures that never saw a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. }
            | Self::Client { status, .. }
            | Self::Validation { status, .. } => Some(*status),
            Self::Auth { .. } => Some(401),
            _ => None,
        }
    }

    #[must_use]
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Self::Server { detail, .. }
            | Self::Client { detail, .. }
            | Self::Auth { detail }
            | Self::Validation { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// Best user-facing message for this error.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.detail() {
            Some(detail) if !detail.message.is_empty() => detail.message.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<ApiError> for FinanceFlowError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network { .. } | ApiError::Timeout { .. } | ApiError::Socket { .. } => {
                Self::Network(err.to_string())
            }
            ApiError::Auth { .. } => Self::Auth(err.user_message()),
            ApiError::Validation { .. } => Self::InvalidInput(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

fn default_message(status: u16) -> String {
    match status {
        400 => "Bad request".to_string(),
        401 => "Unauthorized".to_string(),
        403 => "Forbidden".to_string(),
        404 => "Not found".to_string(),
        409 => "Conflict".to_string(),
        422 => "Unprocessable entity".to_string(),
        429 => "Too many requests".to_string(),
        500 => "Internal server error".to_string(),
        502 => "Bad gateway".to_string(),
        503 => "Service unavailable".to_string(),
        504 => "Gateway timeout".to_string(),
        other => format!("HTTP {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert_eq!(ApiError::from_response(401, "").kind(), ErrorKind::Auth);
        assert_eq!(ApiError::from_response(404, "").kind(), ErrorKind::Client);
        assert_eq!(ApiError::from_response(422, "{}").kind(), ErrorKind::Validation);
        assert_eq!(ApiError::from_response(503, "").kind(), ErrorKind::Server);
        assert_eq!(ApiError::from_response(503, "").status(), Some(503));
    }

    #[test]
    fn error_kind_renders_as_wire_string() {
        assert_eq!(ErrorKind::Auth.to_string(), "auth");
        assert_eq!(ApiError::from_response(422, "{}").kind().to_string(), "validation");
        assert_eq!("TIMEOUT".parse::<ErrorKind>(), Ok(ErrorKind::Timeout));
    }

    #[test]
    fn only_network_and_server_errors_are_retryable() {
        assert!(ApiError::network("refused").is_retryable());
        assert!(ApiError::from_response(500, "").is_retryable());
        assert!(!ApiError::from_response(404, "").is_retryable());
        assert!(!ApiError::from_response(401, "").is_retryable());
        assert!(!ApiError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(!ApiError::socket("closed").is_retryable());
    }

    #[test]
    fn parses_error_envelope() {
        let body = r#"{"success":false,"error":{"code":"PORTFOLIO_NOT_FOUND","message":"Portfolio missing","field":"id"},"timestamp":"2024-01-01T00:00:00Z"}"#;
        let err = ApiError::from_response(404, body);
        let detail = err.detail().unwrap();
        assert_eq!(detail.code.as_deref(), Some("PORTFOLIO_NOT_FOUND"));
        assert_eq!(detail.message, "Portfolio missing");
        assert_eq!(detail.field.as_deref(), Some("id"));
        assert_eq!(detail.body, body);
        assert_eq!(err.user_message(), "Portfolio missing");
    }

    #[test]
    fn parses_fastapi_detail_string() {
        let err = ApiError::from_response(400, r#"{"detail":"Email already registered"}"#);
        assert_eq!(err.user_message(), "Email already registered");
    }

    #[test]
    fn parses_fastapi_validation_list() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"},{"loc":["body","password"],"msg":"too short","type":"value_error"}]}"#;
        match ApiError::from_response(422, body) {
            ApiError::Validation { fields, status, .. } => {
                assert_eq!(status, 422);
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0], FieldError::new("email", "value is not a valid email address"));
                assert_eq!(fields[1].field, "password");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validation_falls_back_to_single_field() {
        let body = r#"{"success":false,"error":{"code":"INVALID","message":"must be positive","field":"quantity"}}"#;
        match ApiError::from_response(422, body) {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields, vec![FieldError::new("quantity", "must be positive")]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_becomes_message() {
        let err = ApiError::from_response(502, "upstream unavailable");
        assert_eq!(err.user_message(), "upstream unavailable");

        let empty = ApiError::from_response(503, "");
        assert_eq!(empty.user_message(), "Service unavailable");
    }

    #[test]
    fn converts_into_finance_flow_error() {
        let err: FinanceFlowError = ApiError::auth("refresh_failed", "session expired").into();
        assert_eq!(err, FinanceFlowError::Auth("session expired".to_string()));

        let err: FinanceFlowError = ApiError::network("down").into();
        assert!(matches!(err, FinanceFlowError::Network(_)));
    }
}
