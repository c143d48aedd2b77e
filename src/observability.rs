//! Observability for autosnap.
//!
//! Structured logging via `tracing`. Each line carries a timestamp and
//! level, which is the contract the surrounding tooling scrapes.

use crate::config::ObservabilityConfig;
use crate::error::{AutosnapError, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
///
/// The level comes from the config but `RUST_LOG` wins when set, so a
/// single invocation can be turned up without touching the config file.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| AutosnapError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| AutosnapError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}
