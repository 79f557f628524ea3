use serde_json::Value;

use crate::http::HttpClient;

/// `GET /health`.
#[derive(Debug, Clone)]
pub struct HealthApi {
    client: HttpClient,
}

impl HealthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Backend liveness payload, passed through undecoded.
    ///
    /// # Errors
    /// Any [`ApiError`](financeflow_domain::ApiError) from the client.
    pub async fn health(&self) -> Result<Value, financeflow_domain::ApiError> {
        self.client.get("/health").await
    }
}
