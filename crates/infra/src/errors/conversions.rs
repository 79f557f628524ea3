//! Conversions from external infrastructure errors into domain errors.

use std::time::Duration;

use financeflow_domain::{ApiError, FinanceFlowError};
use reqwest::Error as HttpError;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

/// Domain error raised from infrastructure code. Conversions from third-party
/// errors land here so the domain crate stays free of them.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub FinanceFlowError);

impl From<InfraError> for FinanceFlowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<FinanceFlowError> for InfraError {
    fn from(value: FinanceFlowError) -> Self {
        InfraError(value)
    }
}

/// Classify a transport failure into the request taxonomy.
pub trait IntoApiError {
    /// `timeout` is the request timeout in effect, reported on
    /// `ApiError::Timeout`.
    fn into_api_error(self, timeout: Duration) -> ApiError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl IntoApiError for HttpError {
    fn into_api_error(self, timeout: Duration) -> ApiError {
        if self.is_timeout() {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            return ApiError::Timeout { timeout_ms };
        }

        if self.is_decode() {
            return ApiError::Decode {
                message: format!("failed to read response body: {self}"),
                body: String::new(),
            };
        }

        if self.is_connect() {
            return ApiError::network(format!("connection failed: {self}"));
        }

        ApiError::network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(FinanceFlowError::Network(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* tungstenite::Error → ApiError */
/* -------------------------------------------------------------------------- */

impl IntoApiError for WsError {
    fn into_api_error(self, _timeout: Duration) -> ApiError {
        match self {
            WsError::Http(response) => {
                ApiError::socket(format!("handshake rejected with status {}", response.status()))
            }
            WsError::Url(err) => ApiError::socket(format!("invalid socket url: {err}")),
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                ApiError::socket("socket closed")
            }
            other => ApiError::socket(other.to_string()),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* config parsing → FinanceFlowError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(FinanceFlowError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(FinanceFlowError::Config(format!("Invalid JSON format: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(FinanceFlowError::Config(format!("Failed to read config file: {value}")))
    }
}
