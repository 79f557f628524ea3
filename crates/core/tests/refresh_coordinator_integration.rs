//! Integration tests for the single-flight refresh coordinator
//!
//! Drives many concurrent recoveries through one coordinator and checks that
//! the refresh transport is hit once and every caller sees the same outcome.

#![cfg(feature = "test-utils")]

use std::sync::Arc;
use std::time::Duration;

use financeflow_common::testing::{fixtures, MockKeyValueStore};
use financeflow_common::TokenStore;
use financeflow_core::testing::{RecordingNavigator, ScriptedRefresher};
use financeflow_core::{RefreshCoordinator, RefreshOutcome, RefreshStatus};
use financeflow_domain::{ApiError, TokenPair};
use futures::future::join_all;
use serde_json::json;

struct Harness {
    coordinator: RefreshCoordinator,
    store: Arc<TokenStore>,
    navigator: RecordingNavigator,
    refresher: ScriptedRefresher,
}

fn harness(refresher: ScriptedRefresher) -> Harness {
    let store = Arc::new(TokenStore::new(Arc::new(MockKeyValueStore::new())));
    store.set(fixtures::token_pair("A1", "R1"));
    let navigator = RecordingNavigator::new();
    let coordinator = RefreshCoordinator::new(
        store.clone(),
        Arc::new(refresher.clone()),
        Arc::new(navigator.clone()),
    );
    Harness { coordinator, store, navigator, refresher }
}

/// Validates that concurrent 401s share one refresh round.
///
/// # Test Steps
/// 1. Store {A1, R1}; refresher answers {A2, R2} after a delay
/// 2. Recover from ten callers that all carried A1
/// 3. Verify one refresher call and every caller received A2
#[tokio::test(start_paused = true)]
async fn test_concurrent_failures_trigger_single_refresh() {
    let h = harness(
        ScriptedRefresher::new()
            .with_delay(Duration::from_millis(200))
            .respond(Ok(json!({ "access_token": "A2", "refresh_token": "R2", "expires_in": 3600 }))),
    );

    let results = join_all((0..10).map(|_| h.coordinator.recover(Some("A1")))).await;

    assert_eq!(h.refresher.calls(), 1);
    assert_eq!(h.coordinator.refresh_count(), 1);
    for result in results {
        assert_eq!(result.unwrap().access_token(), Some("A2"));
    }
    assert_eq!(h.store.get().access_token(), Some("A2"));
    assert_eq!(h.store.get().refresh_token(), Some("R2"));
    assert_eq!(h.coordinator.status(), RefreshStatus::Idle);
}

/// Validates that a rejected refresh rejects every caller.
///
/// # Test Steps
/// 1. Refresher answers 401 after a delay
/// 2. Recover from five concurrent callers
/// 3. Verify all callers got `Auth`, store is `{null, null, null}` and one
///    redirect happened
#[tokio::test(start_paused = true)]
async fn test_refresh_rejection_rejects_all_callers() {
    let h = harness(
        ScriptedRefresher::new()
            .with_delay(Duration::from_millis(200))
            .respond(Err(ApiError::from_response(401, r#"{"detail":"Invalid refresh token"}"#))),
    );

    let results = join_all((0..5).map(|_| h.coordinator.recover(Some("A1")))).await;

    assert_eq!(h.refresher.calls(), 1);
    assert!(results.iter().all(|r| matches!(r, Err(ApiError::Auth { .. }))));
    assert_eq!(h.store.get(), TokenPair::empty());
    assert_eq!(h.navigator.redirects(), 1);
    assert_eq!(h.coordinator.status(), RefreshStatus::Idle);
    assert_eq!(h.coordinator.last_outcome(), Some(RefreshOutcome::Failed));
}

/// Validates that a 401 arriving after a completed round replays with the
/// new token instead of refreshing again.
#[tokio::test]
async fn test_late_failure_uses_refreshed_token() {
    let h = harness(
        ScriptedRefresher::new()
            .respond(Ok(json!({ "access_token": "A2", "refresh_token": "R2" }))),
    );

    let first = h.coordinator.recover(Some("A1")).await.unwrap();
    let late = h.coordinator.recover(Some("A1")).await.unwrap();

    assert_eq!(first, late);
    assert_eq!(h.refresher.calls(), 1);
}

/// Validates that a later round starts again after the token expires a second
/// time.
#[tokio::test]
async fn test_second_expiry_starts_new_round() {
    let h = harness(
        ScriptedRefresher::new()
            .respond(Ok(json!({ "access_token": "A2", "refresh_token": "R2" })))
            .respond(Ok(json!({ "tokens": { "access_token": "A3", "refresh_token": "R3" } }))),
    );

    h.coordinator.recover(Some("A1")).await.unwrap();
    let pair = h.coordinator.recover(Some("A2")).await.unwrap();

    assert_eq!(pair.access_token(), Some("A3"));
    assert_eq!(h.refresher.seen_tokens(), vec!["R1".to_string(), "R2".to_string()]);
}
