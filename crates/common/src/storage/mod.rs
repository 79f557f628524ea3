//! Key-value persistence for credentials and UI preferences
//!
//! Everything is stored as plain strings under flat keys (`accessToken`,
//! `refreshToken`, `user`, `theme`, `sidebarCollapsed`). Backends implement
//! [`KeyValueStore`]; the platform keychain is the production medium and
//! [`MemoryStore`] covers headless runs and tests.

pub mod error;
#[cfg(feature = "platform")]
pub mod keychain;
pub mod memory;
pub mod preferences;

pub use error::{StorageError, StorageResult};
#[cfg(feature = "platform")]
pub use keychain::KeychainStore;
pub use memory::MemoryStore;
pub use preferences::Preferences;

/// String key-value medium.
///
/// Implementations must be cheap to call from async code; the keychain
/// backend performs short blocking OS calls, which is acceptable for the
/// handful of keys involved.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
