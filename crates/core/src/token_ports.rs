//! Port for the token refresh transport.

use async_trait::async_trait;
use financeflow_domain::ApiError;
use serde_json::Value;

/// Exchanges a refresh token for a new token payload.
///
/// Implementations return the decoded response body untouched; locating the
/// token fields inside it (flat, `data`-wrapped or `tokens`-wrapped) is the
/// coordinator's job so that a malformed body can be told apart from a
/// rejected refresh. Implementations must not route through the refresh
/// coordinator themselves.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<Value, ApiError>;
}
