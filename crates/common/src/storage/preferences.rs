//! Persisted UI preferences (`theme`, `sidebarCollapsed`).

use std::str::FromStr;
use std::sync::Arc;

use financeflow_domain::constants::{STORAGE_KEY_SIDEBAR_COLLAPSED, STORAGE_KEY_THEME};
use financeflow_domain::Theme;
use tracing::warn;

use super::{KeyValueStore, StorageResult};

/// Typed accessors over the preference keys.
///
/// Reads never fail: missing, unreadable or unrecognised values fall back to
/// the defaults (`system` theme, expanded sidebar).
#[derive(Clone)]
pub struct Preferences {
    storage: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        match self.storage.get(STORAGE_KEY_THEME) {
            Ok(Some(raw)) => Theme::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "Ignoring stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!(error = %err, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    /// # Errors
    /// Returns the storage error when the value cannot be written.
    pub fn set_theme(&self, theme: Theme) -> StorageResult<()> {
        self.storage.set(STORAGE_KEY_THEME, &theme.to_string())
    }

    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        match self.storage.get(STORAGE_KEY_SIDEBAR_COLLAPSED) {
            Ok(Some(raw)) => raw.trim() == "true",
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "Failed to read sidebar preference");
                false
            }
        }
    }

    /// # Errors
    /// Returns the storage error when the value cannot be written.
    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> StorageResult<()> {
        self.storage.set(STORAGE_KEY_SIDEBAR_COLLAPSED, if collapsed { "true" } else { "false" })
    }
}
