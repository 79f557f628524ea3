//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::storage::{KeyValueStore, StorageError, StorageResult};

/// One recorded storage call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Get(String),
    Set(String, String),
    Remove(String),
}

/// In-memory [`KeyValueStore`] with call recording and failure injection.
///
/// # Examples
///
/// ```
/// use financeflow_common::storage::KeyValueStore;
/// use financeflow_common::testing::MockKeyValueStore;
///
/// let store = MockKeyValueStore::new();
/// store.set("theme", "dark").unwrap();
/// assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
///
/// store.fail_writes(true);
/// assert!(store.set("theme", "light").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockKeyValueStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    ops: Arc<Mutex<Vec<StorageOp>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MockKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail with `StorageError::Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set`/`remove` fail with
    /// `StorageError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed a value without recording an operation.
    pub fn insert(&self, key: &str, value: &str) {
        self.data.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    /// Raw stored value, bypassing failure injection.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn ops(&self) -> Vec<StorageOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }
}

impl KeyValueStore for MockKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.ops.lock().unwrap().push(StorageOp::Get(key.to_string()));
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected read failure".to_string()));
        }
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ops.lock().unwrap().push(StorageOp::Set(key.to_string(), value.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.ops.lock().unwrap().push(StorageOp::Remove(key.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        self.data.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_store_records_operations() {
        let store = MockKeyValueStore::new();
        store.set("a", "1").unwrap();
        let _ = store.get("a").unwrap();
        store.remove("a").unwrap();

        assert_eq!(
            store.ops(),
            vec![
                StorageOp::Set("a".into(), "1".into()),
                StorageOp::Get("a".into()),
                StorageOp::Remove("a".into()),
            ]
        );
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_mock_store_failure_injection() {
        let store = MockKeyValueStore::new();
        store.insert("a", "1");

        store.fail_reads(true);
        assert!(matches!(store.get("a"), Err(StorageError::Unavailable(_))));

        store.fail_writes(true);
        assert!(store.set("b", "2").is_err());
        assert!(store.remove("a").is_err());
        assert_eq!(store.value("a").as_deref(), Some("1"));
        assert_eq!(store.value("b"), None);
    }
}
