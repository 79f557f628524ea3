//! # FinanceFlow Core
//!
//! Coordination logic of the API client with no transport dependencies.
//!
//! This crate contains:
//! - Collaborator ports for the UI layer (notifications, navigation)
//! - The token refresh port implemented by the HTTP layer
//! - The single-flight refresh coordinator
//! - Proactive refresh ahead of token expiry
//!
//! ## Architecture Principles
//! - Only depends on `financeflow-common` and `financeflow-domain`
//! - No HTTP, socket or platform code
//! - All external effects via traits

pub mod auth;

// Collaborator ports
pub mod session_ports;
pub mod token_ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{
    AutoRefresh, AutoRefreshConfig, OnRefreshFailure, RefreshCoordinator, RefreshOutcome,
    RefreshStatus,
};
pub use session_ports::{Navigator, NoopNavigator, Notifier, TracingNotifier};
pub use token_ports::TokenRefresher;
