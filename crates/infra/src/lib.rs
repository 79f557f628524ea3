//! # FinanceFlow Infrastructure
//!
//! I/O implementations behind the FinanceFlow client.
//!
//! This crate contains:
//! - The authenticated HTTP client (`reqwest`) with refresh recovery and retry
//! - Typed REST endpoint groups
//! - The WebSocket subscription channel (`tokio-tungstenite`)
//! - Session lifecycle over the token store
//! - Configuration loading and logging bootstrap
//!
//! ## Architecture
//! - Implements the ports defined in `financeflow-core`
//! - Depends on `financeflow-common`, `financeflow-domain` and
//!   `financeflow-core`
//! - Contains all network and filesystem code

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod realtime;
pub mod session;

// Re-export commonly used items
pub use api::{AuthApi, HealthApi, MarketApi, PortfolioApi, ReportApi, TransactionApi};
pub use config::load as load_config;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, PendingRequest};
pub use observability::init_logging;
pub use realtime::{Listener, SubscriptionChannel};
pub use session::Session;
