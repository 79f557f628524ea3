//! Configuration loader
//!
//! Loads the client configuration from a file and environment variables.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file
//! 2. Fall back to defaults when no file exists
//! 3. Apply environment overrides on top
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `FINANCEFLOW_API_URL`: REST base URL
//! - `FINANCEFLOW_API_TIMEOUT_MS`: request timeout in milliseconds
//! - `FINANCEFLOW_RETRY_MAX_ATTEMPTS`: total attempts per request
//! - `FINANCEFLOW_RETRY_BASE_DELAY_MS`: linear retry base delay
//! - `FINANCEFLOW_WS_URL`: subscription socket URL
//! - `FINANCEFLOW_WS_MAX_RECONNECT_ATTEMPTS`: reconnect cap
//! - `FINANCEFLOW_WS_RECONNECT_DELAY_MS`: exponential reconnect base delay
//! - `FINANCEFLOW_KEYCHAIN_SERVICE`: keychain service name
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./financeflow.{toml,json}` and `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use financeflow_domain::{ClientConfig, FinanceFlowError, Result};

use crate::errors::InfraError;

const FILE_NAMES: [&str; 4] = ["financeflow.toml", "financeflow.json", "config.toml", "config.json"];

/// Load configuration: file (or defaults), then environment overrides.
///
/// # Errors
/// Returns `FinanceFlowError::Config` if a probed file cannot be parsed, an
/// override does not parse, or the result fails validation.
pub fn load() -> Result<ClientConfig> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            ClientConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Supports JSON and
/// TOML (detected by file extension). Missing sections take their defaults.
///
/// # Errors
/// Returns `FinanceFlowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or unsupported
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FinanceFlowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FinanceFlowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;
    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by the extension of `path`.
///
/// # Errors
/// Returns `FinanceFlowError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from)?,
        "json" => serde_json::from_str(contents).map_err(InfraError::from)?,
        _ => {
            return Err(FinanceFlowError::Config(format!(
                "Unsupported config format: {extension}"
            )))
        }
    };
    Ok(config)
}

/// Probe the standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Apply `FINANCEFLOW_*` environment overrides in place.
///
/// # Errors
/// Returns `FinanceFlowError::Config` when a numeric override does not
/// parse.
pub fn apply_env_overrides(config: &mut ClientConfig) -> Result<()> {
    if let Some(url) = env_string("FINANCEFLOW_API_URL") {
        config.api.base_url = url;
    }
    if let Some(timeout) = env_parse("FINANCEFLOW_API_TIMEOUT_MS")? {
        config.api.timeout_ms = timeout;
    }
    if let Some(attempts) = env_parse("FINANCEFLOW_RETRY_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = env_parse("FINANCEFLOW_RETRY_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(url) = env_string("FINANCEFLOW_WS_URL") {
        config.realtime.url = url;
    }
    if let Some(attempts) = env_parse("FINANCEFLOW_WS_MAX_RECONNECT_ATTEMPTS")? {
        config.realtime.max_reconnect_attempts = attempts;
    }
    if let Some(delay) = env_parse("FINANCEFLOW_WS_RECONNECT_DELAY_MS")? {
        config.realtime.reconnect_base_delay_ms = delay;
    }
    if let Some(service) = env_string("FINANCEFLOW_KEYCHAIN_SERVICE") {
        config.storage.service_name = service;
    }
    Ok(())
}

/// Non-empty environment variable.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| FinanceFlowError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn test_env_overrides_apply_on_top_of_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("FINANCEFLOW_API_URL", "https://api.example.com/v1");
        std::env::set_var("FINANCEFLOW_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("FINANCEFLOW_WS_RECONNECT_DELAY_MS", " 250 ");

        let mut config = ClientConfig::default();
        let result = apply_env_overrides(&mut config);

        std::env::remove_var("FINANCEFLOW_API_URL");
        std::env::remove_var("FINANCEFLOW_RETRY_MAX_ATTEMPTS");
        std::env::remove_var("FINANCEFLOW_WS_RECONNECT_DELAY_MS");

        assert!(result.is_ok());
        assert_eq!(config.api.base_url, "https://api.example.com/v1");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.realtime.reconnect_base_delay_ms, 250);
        assert_eq!(config.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_invalid_numeric_override_is_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("FINANCEFLOW_API_TIMEOUT_MS", "soon");
        let result = apply_env_overrides(&mut ClientConfig::default());
        std::env::remove_var("FINANCEFLOW_API_TIMEOUT_MS");

        assert!(matches!(result, Err(FinanceFlowError::Config(msg)) if msg.contains("FINANCEFLOW_API_TIMEOUT_MS")));
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("FINANCEFLOW_WS_URL", "   ");
        let mut config = ClientConfig::default();
        let result = apply_env_overrides(&mut config);
        std::env::remove_var("FINANCEFLOW_WS_URL");

        assert!(result.is_ok());
        assert_eq!(config.realtime.url, "ws://localhost:8000/ws");
    }

    #[test]
    fn test_parse_config_partial_toml_keeps_defaults() {
        let config =
            parse_config("[retry]\nmax_attempts = 2\n", Path::new("financeflow.toml")).unwrap();
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert_eq!(config.realtime.max_reconnect_attempts, 5);
    }

    #[test]
    fn test_parse_config_unsupported_extension() {
        let result = parse_config("", Path::new("config.yaml"));
        assert!(matches!(result, Err(FinanceFlowError::Config(msg)) if msg.contains("yaml")));
    }
}
