//! Single-attempt request execution over `reqwest`.

use std::time::Duration;

use financeflow_domain::{ApiError, ApiConfig, FinanceFlowError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::envelope::decode_body;
use super::request::PendingRequest;
use crate::errors::{InfraError, IntoApiError};

/// Sends one [`PendingRequest`] and decodes the response. No retry, no
/// auth handling.
#[derive(Debug, Clone)]
pub struct Transport {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl Transport {
    /// # Errors
    /// `FinanceFlowError::Config` for an unparseable base URL, or
    /// `FinanceFlowError::Network` when the TLS backend cannot initialize.
    pub fn new(config: &ApiConfig) -> Result<Self, FinanceFlowError> {
        let base = Url::parse(&config.base_url).map_err(|err| {
            FinanceFlowError::Config(format!("Invalid api.base_url {}: {err}", config.base_url))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .no_proxy()
            .build()
            .map_err(InfraError::from)?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// # Errors
    /// Transport failures as `Network`/`Timeout`, HTTP failures as classified
    /// by the envelope decoder.
    pub async fn send(&self, request: &PendingRequest) -> Result<Value, ApiError> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        let body = response.text().await.map_err(|err| err.into_api_error(self.timeout))?;
        decode_body(status.as_u16(), &body)
    }

    /// Like [`Transport::send`] but returns the raw body of a 2xx response.
    ///
    /// # Errors
    /// Transport failures as `Network`/`Timeout`; a non-2xx status is
    /// classified from its body.
    pub async fn send_bytes(&self, request: &PendingRequest) -> Result<Vec<u8>, ApiError> {
        let response = self.dispatch(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        let bytes = response.bytes().await.map_err(|err| err.into_api_error(self.timeout))?;
        Ok(bytes.to_vec())
    }

    async fn dispatch(&self, request: &PendingRequest) -> Result<reqwest::Response, ApiError> {
        let url = self.url_for(&request.path);
        let method = request.method.clone();

        let mut builder =
            self.client.request(method.clone(), &url).headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(attempt = request.retry_count + 1, %method, %url, "Sending HTTP request");

        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            err.into_api_error(self.timeout)
        })?;

        debug!(%method, %url, status = %response.status(), "Received HTTP response");
        Ok(response)
    }
}
