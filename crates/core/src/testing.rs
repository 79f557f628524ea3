//! Recording collaborators and a scripted refresher for tests.
//!
//! ```
//! use financeflow_core::testing::RecordingNotifier;
//! use financeflow_core::Notifier;
//!
//! let notifier = RecordingNotifier::new();
//! notifier.show_error("Network Error", "offline");
//! assert_eq!(notifier.errors(), vec![("Network Error".to_string(), "offline".to_string())]);
//! ```

#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use financeflow_domain::ApiError;
use parking_lot::Mutex;
use serde_json::Value;

use crate::session_ports::{Navigator, Notifier};
use crate::token_ports::TokenRefresher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// [`Notifier`] that keeps every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    /// `(title, message)` of every error notification.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, String)> {
        self.of_level(NotificationLevel::Error)
    }

    #[must_use]
    pub fn successes(&self) -> Vec<(String, String)> {
        self.of_level(NotificationLevel::Success)
    }

    fn of_level(&self, level: NotificationLevel) -> Vec<(String, String)> {
        self.entries
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| (n.title.clone(), n.message.clone()))
            .collect()
    }

    fn push(&self, level: NotificationLevel, title: &str, message: &str) {
        self.entries.lock().push(Notification {
            level,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn show_error(&self, title: &str, message: &str) {
        self.push(NotificationLevel::Error, title, message);
    }

    fn show_success(&self, title: &str, message: &str) {
        self.push(NotificationLevel::Success, title, message);
    }
}

/// [`Navigator`] that counts login redirects.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    redirects: Arc<AtomicUsize>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// [`TokenRefresher`] that replays queued responses.
///
/// Once the queue is drained every call fails with a 401.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRefresher {
    responses: Arc<Mutex<VecDeque<Result<Value, ApiError>>>>,
    seen: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next call.
    #[must_use]
    pub fn respond(self, response: Result<Value, ApiError>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Sleep before answering, keeping the round in flight.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    /// Refresh tokens received, in call order.
    #[must_use]
    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl TokenRefresher for ScriptedRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<Value, ApiError> {
        self.seen.lock().push(refresh_token.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::from_response(401, "")))
    }
}
