//! Client configuration structures.
//!
//! Every section is fully defaulted so an empty file (or no file at all)
//! yields a working local-development configuration. Loading and environment
//! overrides live in `financeflow-infra::config`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_BASE_DELAY_MS, DEFAULT_REFRESH_RECHECK_SECS, DEFAULT_REFRESH_THRESHOLD_SECS,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_RETRY_MAX_ATTEMPTS,
    DEFAULT_WS_CONNECT_TIMEOUT_MS, DEFAULT_WS_URL,
};
use crate::errors::{FinanceFlowError, Result};

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub retry: RetrySettings,
    pub auth: AuthSettings,
    pub realtime: RealtimeConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Reject configurations the client cannot run with.
    ///
    /// # Errors
    /// Returns `FinanceFlowError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(FinanceFlowError::Config("api.base_url must not be empty".into()));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(FinanceFlowError::Config(format!(
                "api.base_url must be an http(s) URL: {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_ms == 0 {
            return Err(FinanceFlowError::Config("api.timeout_ms must be greater than 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(FinanceFlowError::Config(
                "retry.max_attempts must be greater than 0".into(),
            ));
        }
        if self.auth.recheck_secs == 0 {
            return Err(FinanceFlowError::Config("auth.recheck_secs must be greater than 0".into()));
        }
        if !(self.realtime.url.starts_with("ws://") || self.realtime.url.starts_with("wss://")) {
            return Err(FinanceFlowError::Config(format!(
                "realtime.url must be a ws(s) URL: {}",
                self.realtime.url
            )));
        }
        if self.storage.service_name.trim().is_empty() {
            return Err(FinanceFlowError::Config("storage.service_name must not be empty".into()));
        }
        Ok(())
    }
}

/// REST API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE_URL.to_string(), timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retry policy settings for REST requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the initial one.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS, base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS }
    }
}

impl RetrySettings {
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// Proactive token refresh settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Run the background refresh task while signed in.
    pub auto_refresh: bool,
    /// Rotate the pair this many seconds before it expires.
    pub refresh_threshold_secs: u64,
    /// Recheck interval for pairs without an expiry and after a failed rotation.
    pub recheck_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
            recheck_secs: DEFAULT_REFRESH_RECHECK_SECS,
        }
    }
}

impl AuthSettings {
    #[must_use]
    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.refresh_threshold_secs)
    }

    #[must_use]
    pub fn recheck_interval(&self) -> Duration {
        Duration::from_secs(self.recheck_secs)
    }
}

/// WebSocket subscription channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    pub url: String,
    pub max_reconnect_attempts: u32,
    pub reconnect_base_delay_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_base_delay_ms: DEFAULT_RECONNECT_BASE_DELAY_MS,
            connect_timeout_ms: DEFAULT_WS_CONNECT_TIMEOUT_MS,
        }
    }
}

impl RealtimeConfig {
    #[must_use]
    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Key-value persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Keychain service name the token entries are filed under.
    pub service_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { service_name: DEFAULT_KEYCHAIN_SERVICE.to_string() }
    }
}

/// Logging bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `financeflow_infra=debug`.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), json: false }
    }
}
