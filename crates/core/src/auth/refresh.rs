//! Single-flight token refresh
//!
//! Every request that fails with 401 asks the coordinator for a usable
//! token pair. The first caller starts a refresh round; callers arriving
//! while the round is in flight park on a oneshot channel and receive the
//! same outcome. A caller whose failed token is already stale (the store
//! holds a newer access token) gets the current pair back without a new
//! round.
//!
//! A failed recovery round clears the token store, asks the navigator for a
//! login redirect, and rejects every parked caller with `ApiError::Auth`.
//! Rounds started through [`RefreshCoordinator::refresh_now`] may instead
//! keep the session on failure (startup and proactive refresh).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use financeflow_common::TokenStore;
use financeflow_domain::{ApiError, TokenPair, TokenResponse};
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::session_ports::Navigator;
use crate::token_ports::TokenRefresher;

/// Error code for a refresh response that carried no usable token.
pub const MALFORMED_REFRESH_RESPONSE: &str = "malformed_refresh_response";
/// Error code for a refresh attempted with no refresh token stored.
pub const MISSING_REFRESH_TOKEN: &str = "missing_refresh_token";
/// Error code for a refresh round abandoned before it completed.
pub const REFRESH_INTERRUPTED: &str = "refresh_interrupted";

const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

type RefreshResult = Result<TokenPair, ApiError>;

/// Observable coordinator state.
///
/// `Failed` is only reported between a failed round and the release of its
/// waiters; the coordinator is back to `Idle` once [`RefreshCoordinator::recover`]
/// returns. [`RefreshCoordinator::last_outcome`] keeps the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshStatus {
    /// No round in flight.
    #[default]
    Idle,
    /// A round is talking to the refresh endpoint.
    Refreshing,
    /// The current round failed and its waiters are being released.
    Failed,
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Refreshing => "refreshing",
            Self::Failed => "failed",
        })
    }
}

/// Result of the most recent completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new pair was stored.
    Refreshed,
    /// The endpoint rejected the refresh or returned no usable token.
    Failed,
    /// The leading caller was dropped before the round finished.
    Interrupted,
}

/// What a failed round started by [`RefreshCoordinator::refresh_now`] does
/// to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnRefreshFailure {
    /// Clear the token store and redirect to login.
    EndSession,
    /// Leave the stored pair in place; later 401s decide.
    KeepSession,
}

#[derive(Default)]
struct Flight {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshResult>>,
}

enum Entry {
    Lead,
    Wait(oneshot::Receiver<RefreshResult>),
    Replay(TokenPair),
    /// The session ended while the failed request was in transit.
    Ended,
}

/// Coordinates token refresh across concurrent requests.
pub struct RefreshCoordinator {
    store: Arc<TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    navigator: Arc<dyn Navigator>,
    flight: Mutex<Flight>,
    status: RwLock<RefreshStatus>,
    last_outcome: RwLock<Option<RefreshOutcome>>,
    rounds: AtomicU64,
}

impl RefreshCoordinator {
    /// Coordinator over `store`, refreshing through `refresher` and sending
    /// failed sessions to `navigator`.
    pub fn new(
        store: Arc<TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            refresher,
            navigator,
            flight: Mutex::new(Flight::default()),
            status: RwLock::new(RefreshStatus::Idle),
            last_outcome: RwLock::new(None),
            rounds: AtomicU64::new(0),
        }
    }

    /// Current state of the single-flight gate.
    #[must_use]
    pub fn status(&self) -> RefreshStatus {
        *self.status.read()
    }

    /// Outcome of the last completed round, `None` before the first one.
    #[must_use]
    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        *self.last_outcome.read()
    }

    /// Number of refresh rounds that reached the refresh transport or failed
    /// for lack of a refresh token.
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.rounds.load(Ordering::SeqCst)
    }

    /// Store the coordinator reads and rotates.
    #[must_use]
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Obtain a token pair to replay a request that failed with 401.
    ///
    /// `failed_access_token` is the bearer the failed request carried, if
    /// any.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` when the refresh round fails; every caller
    /// parked on the same round receives the same error.
    pub async fn recover(&self, failed_access_token: Option<&str>) -> RefreshResult {
        let entry = {
            let mut flight = self.flight.lock();
            if flight.in_flight {
                Self::park(&mut flight)
            } else {
                let current = self.store.get();
                match current.access_token() {
                    Some(token) if Some(token) != failed_access_token => Entry::Replay(current),
                    None if failed_access_token.is_some() => Entry::Ended,
                    _ => {
                        flight.in_flight = true;
                        Entry::Lead
                    }
                }
            }
        };

        self.run(entry, OnRefreshFailure::EndSession).await
    }

    /// Rotate the stored pair now, joining a round already in flight.
    ///
    /// Used at startup and ahead of expiry. A round led here applies
    /// `on_failure`; a joined round keeps the policy of whoever leads it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` when the round fails.
    pub async fn refresh_now(&self, on_failure: OnRefreshFailure) -> RefreshResult {
        let entry = {
            let mut flight = self.flight.lock();
            if flight.in_flight {
                Self::park(&mut flight)
            } else {
                flight.in_flight = true;
                Entry::Lead
            }
        };

        self.run(entry, on_failure).await
    }

    fn park(flight: &mut Flight) -> Entry {
        let (tx, rx) = oneshot::channel();
        flight.waiters.push(tx);
        Entry::Wait(rx)
    }

    async fn run(&self, entry: Entry, on_failure: OnRefreshFailure) -> RefreshResult {
        match entry {
            Entry::Replay(pair) => {
                debug!("Failed request carried a stale token, replaying with current token");
                Ok(pair)
            }
            Entry::Ended => {
                debug!("Session already ended, not starting a refresh round");
                Err(ApiError::auth(MISSING_REFRESH_TOKEN, SESSION_EXPIRED))
            }
            Entry::Wait(rx) => {
                debug!("Refresh already in flight, waiting for its outcome");
                rx.await.unwrap_or_else(|_| {
                    Err(ApiError::auth(REFRESH_INTERRUPTED, "Token refresh was interrupted"))
                })
            }
            Entry::Lead => {
                let mut guard = FlightGuard { coordinator: self, finished: false };
                *self.status.write() = RefreshStatus::Refreshing;
                let result = self.run_round(on_failure).await;
                guard.finish(result.clone());
                result
            }
        }
    }

    async fn run_round(&self, on_failure: OnRefreshFailure) -> RefreshResult {
        let current = self.store.get();
        let Some(refresh_token) = current.refresh_token().map(String::from) else {
            self.rounds.fetch_add(1, Ordering::SeqCst);
            return Err(self.fail(ApiError::auth(MISSING_REFRESH_TOKEN, SESSION_EXPIRED), on_failure));
        };

        info!("Refreshing access token");
        let outcome = self.refresher.refresh(&refresh_token).await;
        self.rounds.fetch_add(1, Ordering::SeqCst);

        let payload = match outcome {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, kind = %err.kind(), "Token refresh rejected");
                let code = err.detail().and_then(|d| d.code.as_deref()).unwrap_or("refresh_failed");
                return Err(self.fail(ApiError::auth(code, SESSION_EXPIRED), on_failure));
            }
        };

        let Some(pair) = TokenResponse::from_payload(&payload)
            .and_then(|response| response.into_pair(Some(&refresh_token)))
        else {
            warn!(code = MALFORMED_REFRESH_RESPONSE, "Refresh response carried no access token");
            return Err(self.fail(
                ApiError::auth(MALFORMED_REFRESH_RESPONSE, SESSION_EXPIRED),
                on_failure,
            ));
        };

        self.store.set(pair.clone());
        info!(expires_at = ?pair.expires_at(), "Access token refreshed");
        Ok(pair)
    }

    fn fail(&self, error: ApiError, on_failure: OnRefreshFailure) -> ApiError {
        *self.status.write() = RefreshStatus::Failed;
        match on_failure {
            OnRefreshFailure::EndSession => {
                self.store.clear();
                self.navigator.redirect_to_login();
            }
            OnRefreshFailure::KeepSession => {
                debug!("Keeping the stored session after a failed refresh");
            }
        }
        error
    }

    fn complete(&self, result: &RefreshResult, outcome: RefreshOutcome) {
        let waiters = {
            let mut flight = self.flight.lock();
            flight.in_flight = false;
            std::mem::take(&mut flight.waiters)
        };

        debug!(waiters = waiters.len(), ?outcome, "Refresh round complete");
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }

        *self.last_outcome.write() = Some(outcome);
        *self.status.write() = RefreshStatus::Idle;
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("status", &self.status())
            .field("last_outcome", &self.last_outcome())
            .field("rounds", &self.refresh_count())
            .finish_non_exhaustive()
    }
}

/// Releases parked callers if the leading future is dropped mid-round.
struct FlightGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl FlightGuard<'_> {
    fn finish(&mut self, result: RefreshResult) {
        self.finished = true;
        let outcome =
            if result.is_ok() { RefreshOutcome::Refreshed } else { RefreshOutcome::Failed };
        self.coordinator.complete(&result, outcome);
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Refresh round dropped before completion");
            self.coordinator.complete(
                &Err(ApiError::auth(REFRESH_INTERRUPTED, "Token refresh was interrupted")),
                RefreshOutcome::Interrupted,
            );
        }
    }
}
