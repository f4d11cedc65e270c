//! # Courier Telemetry
//!
//! Structured logging and Prometheus metrics shared by every courier crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use courier_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COURIER_SERVICE_NAME` | `courier` | Service name attached to startup logs |
//! | `COURIER_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `COURIER_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `COURIER_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |

#![warn(missing_docs)]

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, CALLS_CANCELLED, CALLS_COMPLETED,
    CALLS_IN_FLIGHT, CALLS_ISSUED, CALLS_TIMED_OUT, CALL_DURATION, PUBLISH_FAILURES, REGISTRY,
    UNMATCHED_RESPONSES,
};
pub use tracing_setup::{init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    /// Metric registration failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration could not be applied.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let tracing_guard = init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Span carrying the correlation id of one call.
#[macro_export]
macro_rules! call_span {
    ($method:expr, $correlation_id:expr) => {
        tracing::info_span!(
            "call",
            method = %$method,
            correlation_id = %$correlation_id
        )
    };
}
