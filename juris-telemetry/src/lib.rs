//! # juris-telemetry
//!
//! Logging setup for the juris binaries.
//!
//! Filtering follows `RUST_LOG` and defaults to `info`. Every `init_*`
//! function installs a global subscriber and fails if one is already set.

pub mod memory;

#[cfg(test)]
mod test_capture;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub use memory::{CONVERSATION_KEY, CaptureLayer, CapturedSpan, SpanStore};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to install subscriber for '{service}': {message}")]
    Init { service: String, message: String },
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_error(service_name: &str, e: impl std::fmt::Display) -> TelemetryError {
    TelemetryError::Init { service: service_name.to_string(), message: e.to_string() }
}

/// Human-readable logs on stderr.
pub fn init_telemetry(service_name: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|e| init_error(service_name, e))?;
    tracing::debug!(service = service_name, "telemetry initialised");
    Ok(())
}

/// One JSON object per line on stderr.
pub fn init_with_json(service_name: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| init_error(service_name, e))?;
    tracing::debug!(service = service_name, "telemetry initialised");
    Ok(())
}

/// Human-readable logs plus span capture into `store`.
///
/// Capture is not subject to `RUST_LOG`, so stage timings are recorded
/// even when logging is quiet.
pub fn init_with_capture(service_name: &str, store: Arc<SpanStore>) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(env_filter()),
        )
        .with(CaptureLayer::new(store))
        .try_init()
        .map_err(|e| init_error(service_name, e))?;
    tracing::debug!(service = service_name, "telemetry initialised");
    Ok(())
}
