//! Storage error types

use financeflow_domain::FinanceFlowError;
use thiserror::Error;

/// Storage error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing medium could not be reached (locked keychain, no secret
    /// service, injected failure in tests).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),

    #[error("Keychain error: {0}")]
    Keychain(String),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<StorageError> for FinanceFlowError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
