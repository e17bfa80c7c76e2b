//! Tracing subscriber setup: structured JSON logs with env-filter control.
//!
//! # Telemetry invariants
//!
//! - **No attribute values or key material** must appear in any log field.
//!   Decrypt fallbacks are counted, never logged with content.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); the
//!   standard `RUST_LOG` filter takes precedence when set.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// Called once by the host process before any codec is constructed.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(())
}
