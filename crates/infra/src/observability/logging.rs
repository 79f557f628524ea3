//! `tracing-subscriber` installation.
//!
//! Library code only emits `tracing` events; the embedding binary decides
//! whether to install this subscriber or its own.

use financeflow_domain::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `config.filter` when set. Returns `false` when a
/// global subscriber is already installed (including by an earlier call).
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(filter = %config.filter, json = config.json, "Logging initialized");
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_is_rejected() {
        let config = LoggingConfig { filter: "financeflow=debug".into(), json: false };
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
