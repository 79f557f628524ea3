//! Token store
//!
//! Holds the current access/refresh pair and the signed-in user profile:
//! - In-memory snapshot readable without touching storage
//! - Write-through persistence to a [`KeyValueStore`] as plain strings
//! - Restore at startup, discarding half-written pairs
//!
//! Persistence failures never fail the caller: the in-memory snapshot is
//! authoritative and the store degrades to memory-only operation.

use std::sync::Arc;

use financeflow_domain::constants::{
    STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_USER,
};
use financeflow_domain::{TokenPair, User};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

/// Process-wide credential holder.
///
/// Construct once per session and share behind an `Arc`.
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    tokens: RwLock<TokenPair>,
    user: RwLock<Option<User>>,
}

impl TokenStore {
    /// Create an empty store over `storage`. Call [`TokenStore::load`] to
    /// restore a previous session.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage, tokens: RwLock::new(TokenPair::empty()), user: RwLock::new(None) }
    }

    /// Restore tokens and user from storage.
    ///
    /// A pair with only one of the two tokens present is treated as corrupt:
    /// it is wiped from storage and the store stays empty. Restored pairs
    /// carry no expiry.
    pub fn load(&self) -> TokenPair {
        let access = self.read_key(STORAGE_KEY_ACCESS_TOKEN);
        let refresh = self.read_key(STORAGE_KEY_REFRESH_TOKEN);

        let pair = match (access, refresh) {
            (Some(access), Some(refresh)) => TokenPair::new(access, refresh, None),
            (None, None) => TokenPair::empty(),
            _ => {
                warn!("Discarding partial token pair found in storage");
                self.remove_keys(&[STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN]);
                TokenPair::empty()
            }
        };

        let user = self.read_key(STORAGE_KEY_USER).and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .map_err(|err| warn!(error = %err, "Ignoring unreadable stored user"))
                .ok()
        });

        info!(has_tokens = !pair.is_empty(), has_user = user.is_some(), "Token store loaded");

        *self.tokens.write() = pair.clone();
        *self.user.write() = user;
        pair
    }

    /// Current in-memory snapshot.
    #[must_use]
    pub fn get(&self) -> TokenPair {
        self.tokens.read().clone()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().access_token().map(String::from)
    }

    #[must_use]
    pub fn has_tokens(&self) -> bool {
        !self.tokens.read().is_empty()
    }

    /// Replace the stored pair.
    ///
    /// Setting an empty pair is equivalent to [`TokenStore::clear`] for the
    /// token keys. The snapshot is swapped under the write lock, so readers
    /// observe either the old or the new pair, never a mix.
    pub fn set(&self, pair: TokenPair) {
        let mut guard = self.tokens.write();

        match (pair.access_token(), pair.refresh_token()) {
            (Some(access), Some(refresh)) => {
                self.write_key(STORAGE_KEY_ACCESS_TOKEN, access);
                self.write_key(STORAGE_KEY_REFRESH_TOKEN, refresh);
            }
            _ => self.remove_keys(&[STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN]),
        }

        debug!(has_tokens = !pair.is_empty(), expires_at = ?pair.expires_at(), "Token pair replaced");
        *guard = pair;
    }

    /// Wipe tokens and user, in memory and in storage.
    pub fn clear(&self) {
        let mut tokens = self.tokens.write();
        let mut user = self.user.write();
        self.remove_keys(&[STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_USER]);
        *tokens = TokenPair::empty();
        *user = None;
        info!("Token store cleared");
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Replace the signed-in user; persisted as JSON under `user`.
    pub fn set_user(&self, user: User) {
        let mut guard = self.user.write();
        match serde_json::to_string(&user) {
            Ok(json) => self.write_key(STORAGE_KEY_USER, &json),
            Err(err) => warn!(error = %err, "Failed to serialize user for storage"),
        }
        *guard = Some(user);
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(err) => {
                warn!(key, error = %err, "Storage read failed, continuing without value");
                None
            }
        }
    }

    fn write_key(&self, key: &str, value: &str) {
        if let Err(err) = self.storage.set(key, value) {
            warn!(key, error = %err, "Storage write failed, keeping value in memory only");
        }
    }

    fn remove_keys(&self, keys: &[&str]) {
        for key in keys {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "Storage delete failed");
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("tokens", &*self.tokens.read())
            .field("has_user", &self.user.read().is_some())
            .finish_non_exhaustive()
    }
}
