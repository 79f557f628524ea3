//! Testing utilities and helpers
//!
//! - **[`fixtures`]**: token pairs, users and response bodies
//! - **[`mocks`]**: [`MockKeyValueStore`] with call recording and failure
//!   injection
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use financeflow_common::testing::{fixtures, MockKeyValueStore};
//! use financeflow_common::TokenStore;
//!
//! let storage = MockKeyValueStore::new();
//! let store = TokenStore::new(Arc::new(storage.clone()));
//! store.set(fixtures::token_pair("A1", "R1"));
//! assert_eq!(storage.value("accessToken").as_deref(), Some("A1"));
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{auth_response_json, sample_user, token_pair};
pub use mocks::{MockKeyValueStore, StorageOp};
