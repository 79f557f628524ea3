//! Typed REST endpoint groups
//!
//! Thin wrappers over [`HttpClient`](crate::http::HttpClient). Every call
//! shares the client's auth header, refresh recovery and retry policy.
//!
//! - [`AuthApi`]: credentials, profile and password management
//! - [`PortfolioApi`]: portfolios, their assets, analytics and rebalancing
//! - [`TransactionApi`]: transaction history
//! - [`MarketApi`]: quotes, movers, news, watchlist and alerts
//! - [`ReportApi`]: report generation and download
//! - [`HealthApi`]: liveness check

pub mod auth;
pub mod health;
pub mod market;
pub mod portfolios;
pub mod reports;
pub mod transactions;

use std::borrow::Cow;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use market::{MarketApi, SymbolSearch};
pub use portfolios::{PortfolioApi, PortfolioInclude};
pub use reports::ReportApi;
pub use transactions::{SummaryQuery, TransactionApi};

/// Percent-encode one path segment.
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
