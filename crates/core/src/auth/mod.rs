//! Session recovery after authentication failures.

pub mod auto_refresh;
pub mod refresh;

pub use auto_refresh::{AutoRefresh, AutoRefreshConfig};
pub use refresh::{OnRefreshFailure, RefreshCoordinator, RefreshOutcome, RefreshStatus};
