//! Named request pipeline stages
//!
//! The client composes these in a fixed order:
//! `stamp_request` -> `attach_auth` -> send under `apply_retry` ->
//! on 401 `handle_auth_error` -> send the replay under `apply_retry`.
//!
//! Each stage takes the request by value and returns a new one.

use std::future::Future;

use chrono::Utc;
use financeflow_common::{RetryExecutor, TransientApiErrors};
use financeflow_core::RefreshCoordinator;
use financeflow_domain::constants::{HEADER_REQUEST_ID, HEADER_REQUEST_TIME};
use financeflow_domain::{ApiError, TokenPair};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};
use uuid::Uuid;

use super::request::PendingRequest;

/// Add `X-Request-Time` (RFC 3339) and `X-Request-ID` tracing headers.
#[must_use]
pub fn stamp_request(request: PendingRequest) -> PendingRequest {
    let now = Utc::now();
    let id = Uuid::new_v4().simple().to_string();
    let request_id = format!("req_{}_{}", now.timestamp_millis(), &id[..9]);

    request
        .with_header(HEADER_REQUEST_TIME, &now.to_rfc3339())
        .with_header(HEADER_REQUEST_ID, &request_id)
}

/// Set `Authorization: Bearer <access>` from `tokens`, or strip it when the
/// pair is empty.
#[must_use]
pub fn attach_auth(mut request: PendingRequest, tokens: &TokenPair) -> PendingRequest {
    request.headers.remove(AUTHORIZATION);
    request.bearer = None;

    let (Some(access), Some(bearer)) = (tokens.access_token(), tokens.bearer()) else {
        return request;
    };

    match HeaderValue::from_str(&bearer) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
            request.bearer = Some(access.to_string());
        }
        Err(_) => warn!("Access token is not a valid header value, sending unauthenticated"),
    }
    request
}

/// Recover from a 401 through the refresh coordinator.
///
/// Returns the request to replay, carrying the refreshed token, the
/// `auth_retried` marker and a reset retry count.
///
/// # Errors
/// `error` itself when the request was already replayed once or opted out of
/// recovery; otherwise the coordinator's refresh failure.
pub async fn handle_auth_error(
    request: PendingRequest,
    error: ApiError,
    coordinator: &RefreshCoordinator,
) -> Result<PendingRequest, ApiError> {
    if !error.is_auth() || request.auth_retried || !request.recover_auth {
        return Err(error);
    }

    debug!(method = %request.method, path = %request.path, "Recovering from 401");
    let tokens = coordinator.recover(request.bearer.as_deref()).await?;

    let mut replay = attach_auth(request, &tokens);
    replay.auth_retried = true;
    replay.retry_count = 0;
    Ok(replay)
}

/// Send `request` under the retry policy.
///
/// `send` performs one attempt; it receives a copy of `request` with
/// `retry_count` set to the zero-based attempt index.
///
/// # Errors
/// The last attempt's error once the policy stops or attempts run out.
pub async fn apply_retry<T, F, Fut>(
    request: &PendingRequest,
    executor: &RetryExecutor<TransientApiErrors>,
    send: F,
) -> Result<T, ApiError>
where
    F: Fn(PendingRequest) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    executor
        .execute(|attempt| {
            let mut attempt_request = request.clone();
            attempt_request.retry_count = attempt - 1;
            send(attempt_request)
        })
        .await
        .map_err(|err| {
            err.into_inner().unwrap_or_else(|| ApiError::network("invalid retry configuration"))
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use financeflow_common::testing::{fixtures, MockKeyValueStore};
    use financeflow_common::{RetryConfig, TokenStore};
    use financeflow_core::testing::{RecordingNavigator, ScriptedRefresher};
    use reqwest::Method;
    use serde_json::{json, Value};

    use super::*;

    fn request() -> PendingRequest {
        PendingRequest::new(Method::GET, "/portfolios")
    }

    #[test]
    fn stamp_adds_tracing_headers() {
        let stamped = stamp_request(request());

        let id = stamped.header(HEADER_REQUEST_ID).unwrap();
        assert!(id.starts_with("req_"));
        assert_eq!(id.rsplit('_').next().unwrap().len(), 9);
        assert!(chrono::DateTime::parse_from_rfc3339(stamped.header(HEADER_REQUEST_TIME).unwrap())
            .is_ok());
    }

    #[test]
    fn attach_auth_sets_and_strips_bearer() {
        let authed = attach_auth(request(), &fixtures::token_pair("A1", "R1"));
        assert_eq!(authed.header("authorization"), Some("Bearer A1"));
        assert_eq!(authed.bearer.as_deref(), Some("A1"));

        let stripped = attach_auth(authed, &TokenPair::empty());
        assert_eq!(stripped.header("authorization"), None);
        assert_eq!(stripped.bearer, None);
    }

    #[tokio::test]
    async fn handle_auth_error_marks_replay() {
        let store = Arc::new(TokenStore::new(Arc::new(MockKeyValueStore::new())));
        store.set(fixtures::token_pair("A1", "R1"));
        let refresher = ScriptedRefresher::new()
            .respond(Ok(json!({ "access_token": "A2", "refresh_token": "R2" })));
        let coordinator = RefreshCoordinator::new(
            store.clone(),
            Arc::new(refresher),
            Arc::new(RecordingNavigator::new()),
        );

        let sent = attach_auth(request(), &store.get());
        let replay =
            handle_auth_error(sent, ApiError::from_response(401, ""), &coordinator).await.unwrap();

        assert!(replay.auth_retried);
        assert_eq!(replay.header("authorization"), Some("Bearer A2"));

        let err = handle_auth_error(replay, ApiError::from_response(401, ""), &coordinator)
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(coordinator.refresh_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_retry_numbers_attempts() {
        let executor = RetryExecutor::new(
            RetryConfig::new().max_attempts(3).build().unwrap(),
            TransientApiErrors,
        );
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let result = apply_retry(&request(), &executor, |req| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().push(req.retry_count);
                Err::<Value, _>(ApiError::from_response(500, ""))
            }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(500));
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }
}
