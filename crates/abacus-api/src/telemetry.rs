//! Structured logging setup
//!
//! Installs a `tracing` subscriber with an `EnvFilter` and either a JSON or
//! a human-readable formatter. `RUST_LOG` takes precedence over the
//! configured level.

use crate::config::{LogFormat, LoggingConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},abacus_api={level},abacus_core={level},tower_http=info",
            level = config.level
        ))
    })
}

/// Initialize the global subscriber; call once at startup
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_target(false).boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter(config))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    info!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}
