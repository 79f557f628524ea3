//! # FinanceFlow Domain
//!
//! Business domain types and models for the FinanceFlow client.
//!
//! This crate contains:
//! - Credential types (`TokenPair`) and authentication payloads
//! - The request error taxonomy (`ApiError`) and the crate-wide
//!   `FinanceFlowError`
//! - Response envelopes and realtime wire frames
//! - Portfolio, asset, transaction and market data models
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other FinanceFlow crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
