//! Proactive token rotation ahead of expiry.
//!
//! The task sleeps until the stored pair is `threshold` away from expiry,
//! then rotates it through [`RefreshCoordinator::refresh_now`], so it shares
//! the single-flight gate with 401 recovery. A failed rotation keeps the
//! session and is retried after the recheck interval. Pairs without a known
//! expiry and signed-out stores are rechecked at the same interval.

use std::sync::Arc;
use std::time::Duration;

use financeflow_domain::AuthSettings;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::refresh::{OnRefreshFailure, RefreshCoordinator};

/// Timing of the background refresh task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoRefreshConfig {
    /// Rotate this long before the access token expires.
    pub threshold: Duration,
    /// Wake-up interval when nothing is scheduled, and back-off after a
    /// failed rotation.
    pub recheck: Duration,
}

impl From<&AuthSettings> for AutoRefreshConfig {
    fn from(settings: &AuthSettings) -> Self {
        Self { threshold: settings.refresh_threshold(), recheck: settings.recheck_interval() }
    }
}

impl Default for AutoRefreshConfig {
    fn default() -> Self {
        Self::from(&AuthSettings::default())
    }
}

/// Handle to the background refresh task. Dropping it stops the task.
#[derive(Debug)]
pub struct AutoRefresh {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AutoRefresh {
    /// Spawn the task on the current tokio runtime.
    #[must_use]
    pub fn spawn(coordinator: Arc<RefreshCoordinator>, config: AutoRefreshConfig) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(coordinator, config, cancel.clone()));
        Self { cancel, handle }
    }

    /// Stop the task; a rotation in flight is abandoned.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(
    coordinator: Arc<RefreshCoordinator>,
    config: AutoRefreshConfig,
    cancel: CancellationToken,
) {
    info!(threshold_secs = config.threshold.as_secs(), "Starting token auto-refresh task");

    loop {
        let planned = coordinator.token_store().get();
        let wait = match (planned.access_token(), planned.refresh_due_in(config.threshold)) {
            (Some(_), Some(due)) => due,
            _ => config.recheck,
        };

        debug!(wait_secs = wait.as_secs(), "Auto-refresh sleeping until next check");
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(wait) => {}
        }

        // Rotated, signed out or signed in as someone else while asleep.
        let current = coordinator.token_store().get();
        if current.expires_at().is_none() || current.access_token() != planned.access_token() {
            continue;
        }

        info!("Access token expiring soon, refreshing");
        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = coordinator.refresh_now(OnRefreshFailure::KeepSession) => result,
        };

        if let Err(err) = result {
            warn!(error = %err, retry_in_secs = config.recheck.as_secs(), "Proactive refresh failed");
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(config.recheck) => {}
            }
        }
    }

    debug!("Token auto-refresh task stopped");
}

#[cfg(test)]
mod tests {
    use financeflow_common::testing::MockKeyValueStore;
    use financeflow_common::TokenStore;
    use financeflow_domain::TokenPair;
    use serde_json::json;

    use super::*;
    use crate::testing::{RecordingNavigator, ScriptedRefresher};

    const CONFIG: AutoRefreshConfig =
        AutoRefreshConfig { threshold: Duration::from_secs(300), recheck: Duration::from_secs(60) };

    fn setup(
        refresher: ScriptedRefresher,
        expires_in: Option<i64>,
    ) -> (Arc<RefreshCoordinator>, Arc<TokenStore>, RecordingNavigator) {
        let store = Arc::new(TokenStore::new(Arc::new(MockKeyValueStore::new())));
        store.set(TokenPair::from_expires_in("A1", "R1", expires_in));
        let navigator = RecordingNavigator::new();
        let coordinator = Arc::new(RefreshCoordinator::new(
            store.clone(),
            Arc::new(refresher),
            Arc::new(navigator.clone()),
        ));
        (coordinator, store, navigator)
    }

    /// Validates rotation five minutes ahead of expiry.
    ///
    /// Assertions:
    /// - Nothing happens before the threshold is reached.
    /// - One rotation runs once it is, storing the new pair.
    #[tokio::test(start_paused = true)]
    async fn rotates_ahead_of_expiry() {
        let refresher = ScriptedRefresher::new().respond(Ok(json!({
            "access_token": "A2", "refresh_token": "R2", "expires_in": 3600
        })));
        let (coordinator, store, _) = setup(refresher.clone(), Some(400));

        let task = AutoRefresh::spawn(coordinator, CONFIG);

        tokio::time::sleep(Duration::from_secs(99)).await;
        assert_eq!(refresher.calls(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(refresher.seen_tokens(), vec!["R1".to_string()]);
        assert_eq!(store.get().access_token(), Some("A2"));
        assert!(!task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_rotation() {
        let refresher = ScriptedRefresher::new();
        let (coordinator, _, _) = setup(refresher.clone(), Some(400));

        let task = AutoRefresh::spawn(coordinator, CONFIG);
        task.stop();
        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(refresher.calls(), 0);
        assert!(task.is_finished());
    }

    /// Validates that a failed rotation keeps the session.
    ///
    /// Assertions:
    /// - Stored pair is untouched and no redirect is issued.
    /// - The task keeps running and tries again later.
    #[tokio::test(start_paused = true)]
    async fn failed_rotation_keeps_session_and_retries() {
        let refresher = ScriptedRefresher::new();
        let (coordinator, store, navigator) = setup(refresher.clone(), Some(400));

        let task = AutoRefresh::spawn(coordinator, CONFIG);

        tokio::time::sleep(Duration::from_secs(101)).await;
        assert_eq!(refresher.calls(), 1);
        assert_eq!(store.get().access_token(), Some("A1"));
        assert_eq!(navigator.redirects(), 0);

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(refresher.calls() >= 2);
        assert!(!task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn pair_without_expiry_is_left_alone() {
        let refresher = ScriptedRefresher::new();
        let (coordinator, _, _) = setup(refresher.clone(), None);

        let _task = AutoRefresh::spawn(coordinator, CONFIG);
        tokio::time::sleep(Duration::from_secs(3600)).await;

        assert_eq!(refresher.calls(), 0);
    }
}
