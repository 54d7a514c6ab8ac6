//! Log output setup.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pgcrud=info";

/// Builds the filter from the configured directive, then `RUST_LOG`, then the default.
pub fn env_filter(config: Option<&LoggingConfig>) -> EnvFilter {
    config
        .and_then(|c| c.filter.as_deref())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a formatting subscriber. Returns `false` if one was already installed.
pub fn init(config: Option<&LoggingConfig>) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true)
        .try_init()
        .is_ok()
}
