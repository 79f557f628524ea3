//! Request description shared by every pipeline stage.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

/// An HTTP request that has not been sent yet.
///
/// Stages take it by value and return a new one; nothing is mutated behind
/// the caller's back, so a retry re-sends exactly what the first attempt
/// sent.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Zero-based attempt index within the current retry run.
    pub retry_count: u32,
    /// Set once the request has been replayed after a token refresh.
    pub auth_retried: bool,
    /// Whether a 401 may go through the refresh coordinator. Disabled for
    /// credential endpoints (login, register, refresh).
    pub recover_auth: bool,
    /// Access token attached by `attach_auth`, if any.
    pub bearer: Option<String>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            retry_count: 0,
            auth_retried: false,
            recover_auth: true,
            bearer: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header; invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) =
            (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
        {
            self.headers.insert(name, value);
        }
        self
    }

    #[must_use]
    pub fn without_auth_recovery(mut self) -> Self {
        self.recover_auth = false;
        self
    }

    /// Header value as a string, for tests and logging.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
