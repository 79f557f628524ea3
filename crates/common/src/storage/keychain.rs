//! Platform keychain storage backend
//!
//! Stores each key as its own credential entry under a single service name
//! (macOS Keychain, Windows Credential Manager, Linux Secret Service).
//!
//! ## Usage
//!
//! ```no_run
//! use financeflow_common::storage::{KeyValueStore, KeychainStore};
//!
//! let store = KeychainStore::new("FinanceFlow");
//! store.set("accessToken", "A1")?;
//! assert_eq!(store.get("accessToken")?.as_deref(), Some("A1"));
//! # Ok::<(), financeflow_common::storage::StorageError>(())
//! ```

use keyring::Entry;
use tracing::debug;

use super::{KeyValueStore, StorageError, StorageResult};

/// Keychain-backed [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct KeychainStore {
    service_name: String,
}

impl KeychainStore {
    /// Create a store for a specific keychain service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "FinanceFlow")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> StorageResult<Entry> {
        Entry::new(&self.service_name, key).map_err(|e| {
            StorageError::Keychain(format!("Failed to open keychain entry {key}: {e}"))
        })
    }
}

impl KeyValueStore for KeychainStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Reading keychain entry");

        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e @ (keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_))) => {
                Err(StorageError::Unavailable(format!("Failed to read {key}: {e}")))
            }
            Err(e) => Err(StorageError::Keychain(format!("Failed to read {key}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Writing keychain entry");

        self.entry(key)?.set_password(value).map_err(|e| match e {
            keyring::Error::NoStorageAccess(_) | keyring::Error::PlatformFailure(_) => {
                StorageError::Unavailable(format!("Failed to store {key}: {e}"))
            }
            other => StorageError::Keychain(format!("Failed to store {key}: {other}")),
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Deleting keychain entry");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Keychain(format!("Failed to delete {key}: {e}"))),
        }
    }
}

#[cfg(all(test, feature = "platform"))]
mod tests {
    use super::*;

    /// Validates `KeychainStore::new` keeps the configured service name.
    ///
    /// Touching the real keychain is avoided here; round-trips are covered
    /// through `MemoryStore` and the mock store.
    #[test]
    fn keeps_service_name() {
        let store = KeychainStore::new("FinanceFlowTest");
        assert_eq!(store.service_name(), "FinanceFlowTest");
    }
}
