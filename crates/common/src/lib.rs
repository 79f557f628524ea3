//! Reusable runtime building blocks shared across FinanceFlow crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: token store, key-value storage abstraction, persisted UI
//!   preferences, retry executor
//! - `platform`: OS keychain backed storage
//! - `test-utils`: in-memory mocks and fixtures for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod auth;
#[cfg(feature = "runtime")]
pub mod resilience;
#[cfg(feature = "runtime")]
pub mod storage;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "runtime", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use auth::TokenStore;
#[cfg(feature = "runtime")]
pub use resilience::{
    BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError, RetryExecutor,
    RetryOutcome, RetryPolicy, RetryResult, TransientApiErrors,
};
#[cfg(feature = "platform")]
pub use storage::KeychainStore;
#[cfg(feature = "runtime")]
pub use storage::{KeyValueStore, MemoryStore, Preferences, StorageError, StorageResult};
