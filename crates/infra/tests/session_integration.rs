//! Integration tests for the session lifecycle
//!
//! **Coverage:**
//! - Login and register persist tokens and profile, notify the user
//! - Failed login notifies and leaves the store untouched
//! - Logout clears local state even when the server call fails
//! - Restore from storage with and without a working refresh
//! - Restore shares its refresh round with a concurrent 401
//! - Background refresh runs while signed in and stops on logout
//!
//! **Infrastructure:**
//! - WireMock HTTP server standing in for the FinanceFlow API
//! - Mock key-value storage observed directly

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::time::Duration;

use financeflow_common::testing::{auth_response_json, sample_user, token_pair};
use financeflow_domain::constants::{
    STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_USER,
};
use financeflow_domain::{ApiError, LoginRequest, RegisterRequest};
use financeflow_infra::session::{
    LOGIN_FAILED_TITLE, LOGIN_SUCCESS_TITLE, LOGOUT_TITLE, REGISTER_SUCCESS_TITLE,
};
use financeflow_infra::Session;
use serde_json::{json, Value};
use support::HttpHarness;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn session(h: &HttpHarness) -> Session {
    Session::new(h.client.clone())
}

fn seed_storage(h: &HttpHarness, access: &str, refresh: &str, with_user: bool) {
    h.storage.insert(STORAGE_KEY_ACCESS_TOKEN, access);
    h.storage.insert(STORAGE_KEY_REFRESH_TOKEN, refresh);
    if with_user {
        let user = serde_json::to_string(&sample_user()).expect("user serializes");
        h.storage.insert(STORAGE_KEY_USER, &user);
    }
}

/// Successful login stores the pair and profile.
///
/// # Test Steps
/// 1. `/auth/login` returns an enveloped `{user, tokens}`
/// 2. Session is authenticated with A1/R1 persisted
/// 3. User is greeted through the notifier
#[tokio::test]
async fn test_login_persists_session() {
    let h = HttpHarness::start().await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/login")))
        .and(body_json(json!({
            "email": "ada@example.com", "password": "hunter2", "remember_me": false
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": auth_response_json("A1", "R1")})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let session = session(&h);
    let user = session
        .login(&LoginRequest::new("ada@example.com", "hunter2"))
        .await
        .expect("login should succeed");

    assert_eq!(user.first_name, "Ada");
    assert!(session.is_authenticated());
    assert_eq!(h.storage.value(STORAGE_KEY_ACCESS_TOKEN).as_deref(), Some("A1"));
    assert_eq!(h.storage.value(STORAGE_KEY_REFRESH_TOKEN).as_deref(), Some("R1"));
    assert!(h.storage.value(STORAGE_KEY_USER).is_some());

    let successes = h.notifier.successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].0, LOGIN_SUCCESS_TITLE);
    assert!(successes[0].1.contains("Ada"));
    assert!(session.is_auto_refreshing());
}

#[tokio::test]
async fn test_failed_login_notifies_and_keeps_store_empty() {
    let h = HttpHarness::start().await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/login")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": {"code": "invalid_credentials", "message": "Incorrect email or password"}
        })))
        .mount(&h.server)
        .await;

    let session = session(&h);
    let err = session
        .login(&LoginRequest::new("ada@example.com", "nope"))
        .await
        .expect_err("login should fail");

    assert!(matches!(err, ApiError::Auth { .. }));
    assert!(!session.is_authenticated());
    assert!(h.storage.keys().is_empty());
    assert_eq!(
        h.notifier.errors(),
        vec![(LOGIN_FAILED_TITLE.to_string(), "Incorrect email or password".to_string())]
    );
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_register_signs_in() {
    let h = HttpHarness::start().await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/register")))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_response_json("A1", "R1")))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = session(&h);
    let request = RegisterRequest {
        email: "ada@example.com".into(),
        password: "Analytical1!".into(),
        password_confirm: "Analytical1!".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        accept_terms: true,
    };
    session.register(&request).await.expect("register should succeed");

    assert!(session.is_authenticated());
    assert_eq!(h.notifier.successes()[0].0, REGISTER_SUCCESS_TITLE);
}

/// Logout clears local state even if the server rejects it.
///
/// # Test Steps
/// 1. Store holds A1/R1 and a user
/// 2. `/auth/logout` answers 500 on every attempt
/// 3. Store and storage are empty afterwards
#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let h = HttpHarness::start().await;
    h.store.set(token_pair("A1", "R1"));
    h.store.set_user(sample_user());
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/logout")))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&h.server)
        .await;

    let session = session(&h);
    session.logout(true).await;

    assert!(!session.is_authenticated());
    assert!(!session.is_auto_refreshing());
    assert!(session.user().is_none());
    assert!(h.storage.keys().is_empty());
    assert_eq!(h.notifier.successes()[0].0, LOGOUT_TITLE);
}

#[tokio::test]
async fn test_logout_without_tokens_skips_server_call() {
    let h = HttpHarness::start().await;
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/logout")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    session(&h).logout(false).await;

    assert!(h.notifier.notifications().is_empty());
}

/// Restored sessions rotate their tokens once.
///
/// # Test Steps
/// 1. Storage holds A1/R1 and a user
/// 2. `/auth/refresh` issues A2/R2
/// 3. Session is active with the rotated pair persisted
#[tokio::test]
async fn test_initialize_restores_and_rotates_tokens() {
    let h = HttpHarness::start().await;
    seed_storage(&h, "A1", "R1", true);
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2", "refresh_token": "R2", "token_type": "bearer"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = session(&h);
    assert!(session.initialize().await);

    assert!(session.is_authenticated());
    assert_eq!(h.store.access_token().as_deref(), Some("A2"));
    assert_eq!(h.storage.value(STORAGE_KEY_REFRESH_TOKEN).as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_initialize_keeps_session_when_refresh_fails() {
    let h = HttpHarness::start().await;
    seed_storage(&h, "A1", "R1", true);
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = session(&h);
    assert!(session.initialize().await);

    assert!(session.is_authenticated());
    assert_eq!(h.store.access_token().as_deref(), Some("A1"));
    assert_eq!(h.navigator.redirects(), 0);
}

#[tokio::test]
async fn test_initialize_without_user_stays_signed_out() {
    let h = HttpHarness::start().await;
    seed_storage(&h, "A1", "R1", false);
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let session = session(&h);
    assert!(!session.initialize().await);
    assert!(!session.is_authenticated());
}

/// Startup rotation and a concurrent 401 share one refresh round.
///
/// # Test Steps
/// 1. Storage holds A1/R1 and a user; `/auth/refresh` answers after 300ms
/// 2. `/portfolios` rejects A1 and is issued 50ms into `initialize()`
/// 3. Refresh is hit once, the request is replayed with A2, session active
#[tokio::test]
async fn test_initialize_shares_refresh_with_concurrent_401() {
    let h = HttpHarness::start().await;
    seed_storage(&h, "A1", "R1", true);
    Mock::given(method("POST"))
        .and(path(HttpHarness::path("/auth/refresh")))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "A2", "refresh_token": "R2"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/portfolios")))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path(HttpHarness::path("/portfolios")))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let session = session(&h);
    let client = h.client.clone();
    let concurrent_request = async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.get::<Vec<Value>>("/portfolios").await
    };
    let (restored, portfolios) = tokio::join!(session.initialize(), concurrent_request);

    assert!(restored);
    assert!(portfolios.expect("request should be replayed").is_empty());
    assert_eq!(h.client.coordinator().refresh_count(), 1);
    assert_eq!(h.store.get().refresh_token(), Some("R2"));
    assert_eq!(h.navigator.redirects(), 0);
}
