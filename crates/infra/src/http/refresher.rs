//! HTTP implementation of the token refresh port.

use async_trait::async_trait;
use financeflow_common::{RetryExecutor, TransientApiErrors};
use financeflow_core::TokenRefresher;
use financeflow_domain::constants::REFRESH_PATH;
use financeflow_domain::{ApiError, RefreshTokenRequest};
use reqwest::Method;
use serde_json::Value;

use super::pipeline::{apply_retry, stamp_request};
use super::request::PendingRequest;
use super::transport::Transport;

/// Posts `{refresh_token}` to `/auth/refresh`.
///
/// Sends no `Authorization` header and never enters the refresh coordinator.
/// Transient failures go through the same retry policy as other requests.
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    transport: Transport,
    retry: RetryExecutor<TransientApiErrors>,
}

impl HttpTokenRefresher {
    pub fn new(transport: Transport, retry: RetryExecutor<TransientApiErrors>) -> Self {
        Self { transport, retry }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<Value, ApiError> {
        let body = serde_json::to_value(RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        })
        .map_err(|err| ApiError::Decode { message: err.to_string(), body: String::new() })?;

        let request = stamp_request(
            PendingRequest::new(Method::POST, REFRESH_PATH).with_body(body).without_auth_recovery(),
        );

        apply_retry(&request, &self.retry, |attempt| async move {
            self.transport.send(&attempt).await
        })
        .await
    }
}
