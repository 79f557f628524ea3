//! Integration tests for the authenticated HTTP client
//!
//! **Coverage:**
//! - Expired token: 401 → single refresh → replay with the rotated token
//! - Refresh rejected: every caller fails with `Auth`, tokens cleared
//! - Concurrent 401s share one refresh round
//! - Transient 5xx retried, 4xx returned immediately
//! - Unreachable backend reported through the notifier
//! - Envelope unwrapping and request stamping
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the FinanceFlow API
//! - Mock key-value storage and recording notifier/navigator

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::time::Duration;

use financeflow_common::testing::token_pair;
use financeflow_core::{RefreshOutcome, RefreshStatus};
use financeflow_domain::ApiError;
use financeflow_infra::http::{NETWORK_ERROR_MESSAGE, NETWORK_ERROR_TITLE};
use financeflow_infra::MarketApi;
use serde_json::{json, Value};
use support::{unreachable_base_url, HttpHarness};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn rotated_tokens(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh, "token_type": "bearer", "expires_in": 1800 })
}

// ============================================================================
// Refresh recovery
// ============================================================================

/// Expired access token is refreshed once and the request replayed.
///
/// # Test Steps
/// 1. Store holds A1/R1; `/portfolios` rejects A1 and accepts A2
/// 2. `/auth/refresh` with R1 issues A2/R2
/// 3. Request succeeds, store holds A2/R2, refresh hit exactly once
#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/portfolios")))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/portfolios")))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(rotated_tokens("A2", "R2")))
        .expect(1)
        .mount(&h.server)
        .await;

    let portfolios: Vec<Value> = h.client.get("/portfolios").await.expect("request should recover");

    assert!(portfolios.is_empty());
    let pair = h.store.get();
    assert_eq!(pair.access_token(), Some("A2"));
    assert_eq!(pair.refresh_token(), Some("R2"));
    assert_eq!(h.client.coordinator().refresh_count(), 1);
    assert_eq!(h.navigator.redirects(), 0);
}

/// Refresh rejection fails every waiting request and ends the session.
///
/// # Test Steps
/// 1. Four concurrent requests all get 401
/// 2. `/auth/refresh` answers 401
/// 3. All four fail with `Auth`, store is empty, one redirect to login
#[tokio::test]
async fn test_rejected_refresh_fails_all_requests_and_clears_tokens() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/watchlist")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Refresh token revoked"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let calls = (0..4).map(|_| {
        let client = h.client.clone();
        async move { client.get::<Value>("/watchlist").await }
    });
    let results = futures::future::join_all(calls).await;

    for result in results {
        assert!(matches!(result, Err(ApiError::Auth { .. })), "got {result:?}");
    }
    assert!(!h.store.has_tokens());
    assert_eq!(h.navigator.redirects(), 1);
    assert_eq!(h.client.coordinator().status(), RefreshStatus::Idle);
    assert_eq!(h.client.coordinator().last_outcome(), Some(RefreshOutcome::Failed));
}

/// Concurrent 401s trigger exactly one refresh and all requests replay.
///
/// # Test Steps
/// 1. Eight requests fire with A1 and all receive 401
/// 2. Refresh responds slowly with A2/R2
/// 3. Every request succeeds with A2; refresh hit once
#[tokio::test]
async fn test_concurrent_unauthorized_requests_share_one_refresh() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/alerts")))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/alerts")))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(8)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": rotated_tokens("A2", "R2")}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let calls = (0..8).map(|_| {
        let client = h.client.clone();
        async move { client.get::<Vec<Value>>("/alerts").await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok), "got {results:?}");
    assert_eq!(h.store.access_token().as_deref(), Some("A2"));
    assert_eq!(h.client.coordinator().refresh_count(), 1);
}

/// A replayed request that fails with 401 again is not refreshed twice.
#[tokio::test]
async fn test_second_unauthorized_after_replay_is_returned() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/auth/profile")))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(200).set_body_json(rotated_tokens("A2", "R2")))
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.client.get::<Value>("/auth/profile").await;

    assert!(matches!(result, Err(ApiError::Auth { .. })));
    assert_eq!(h.store.access_token().as_deref(), Some("A2"));
}

/// Login rejections are credential errors, never refresh triggers.
#[tokio::test]
async fn test_login_unauthorized_does_not_refresh() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/login")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(200).set_body_json(rotated_tokens("A2", "R2")))
        .expect(0)
        .mount(&h.server)
        .await;

    let api = financeflow_infra::AuthApi::new(h.client.clone());
    let err = api
        .login(&financeflow_domain::LoginRequest::new("ada@example.com", "wrong"))
        .await
        .expect_err("login should fail");

    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(h.store.access_token().as_deref(), Some("A1"));
}

// ============================================================================
// Retry policy
// ============================================================================

/// Transient 503s are retried until the server recovers.
#[tokio::test]
async fn test_service_unavailable_is_retried() {
    let h = HttpHarness::start().await;

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/health")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/health")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let health = financeflow_infra::HealthApi::new(h.client.clone())
        .health()
        .await
        .expect("third attempt should succeed");

    assert_eq!(health["status"], "healthy");
}

/// Persistent 5xx exhausts the attempt budget and surfaces `Server`.
#[tokio::test]
async fn test_persistent_server_error_exhausts_attempts() {
    let h = HttpHarness::start().await;

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/portfolios/p1")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .expect(3)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>("/portfolios/p1").await.expect_err("should fail");

    assert!(matches!(err, ApiError::Server { status: 500, .. }), "got {err:?}");
    assert!(h.notifier.errors().is_empty());
}

/// Client errors are returned after a single attempt.
#[tokio::test]
async fn test_not_found_is_not_retried() {
    let h = HttpHarness::start().await;

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/transactions/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>("/transactions/missing").await.expect_err("should fail");

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Not found");
}

/// Validation failures keep their per-field messages.
#[tokio::test]
async fn test_validation_error_carries_fields() {
    let h = HttpHarness::start().await;

    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/portfolios")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "name"], "msg": "field required", "type": "value_error"}]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.post::<Value, _>("/portfolios", &json!({})).await.expect_err("should fail");

    match err {
        ApiError::Validation { fields, .. } => {
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "name");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// An unreachable backend is retried, then reported once to the user.
#[tokio::test]
async fn test_unreachable_backend_notifies_network_error() {
    let h = HttpHarness::against(&unreachable_base_url()).await;

    let err = h.client.get::<Value>("/health").await.expect_err("should fail");

    assert!(matches!(err, ApiError::Network { .. }), "got {err:?}");
    assert_eq!(
        h.notifier.errors(),
        vec![(NETWORK_ERROR_TITLE.to_string(), NETWORK_ERROR_MESSAGE.to_string())]
    );
}

// ============================================================================
// Envelopes and request stamping
// ============================================================================

/// Envelope payloads are unwrapped and decimal strings decoded.
#[tokio::test]
async fn test_envelope_data_is_unwrapped() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/market-data/quotes")))
        .and(body_json(json!({"symbols": ["AAPL"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"symbol": "AAPL", "price": "189.50", "change": "1.25"}],
            "timestamp": "2024-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let quotes = MarketApi::new(h.client.clone())
        .quotes(&["AAPL".to_string()])
        .await
        .expect("quotes should decode");

    assert_eq!(quotes.len(), 1);
    assert!((quotes[0].price - 189.5).abs() < f64::EPSILON);
}

/// A 200 envelope reporting failure is surfaced as a client error.
#[tokio::test]
async fn test_unsuccessful_envelope_is_an_error() {
    let h = HttpHarness::start().await;

    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/watchlist")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": "quota", "message": "Watchlist limit reached"}
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.client.get::<Value>("/watchlist").await.expect_err("should fail");

    assert!(matches!(err, ApiError::Client { status: 200, .. }), "got {err:?}");
    assert_eq!(err.user_message(), "Watchlist limit reached");
}

/// Every request carries a bearer token and the tracing headers.
#[tokio::test]
async fn test_requests_are_stamped() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));

    Mock::given(method("DELETE"))
        .and(path(HttpHarness::path("/alerts/a%201")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    MarketApi::new(h.client.clone()).delete_alert("a 1").await.expect("delete should succeed");

    let requests = h.server.received_requests().await.expect("recording enabled");
    let request = &requests[0];
    let header_value = |name: &str| {
        request.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    };
    assert_eq!(header_value("authorization").as_deref(), Some("Bearer A1"));
    assert!(header_value("x-request-id").is_some_and(|id| id.starts_with("req_")));
    assert!(header_value("x-request-time").is_some());
}
