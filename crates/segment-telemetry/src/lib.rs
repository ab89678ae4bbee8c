//! # Segment Telemetry
//!
//! Logging and metrics for the segments service.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered as JSON lines (or human-readable
//!   text in development) through `tracing-subscriber`
//! - **Metrics**: Prometheus counters and histograms, exported as text by
//!   the API's `/metrics` route
//!
//! ## Usage
//!
//! ```rust,ignore
//! use segment_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SEGMENTS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SEGMENTS_JSON_LOGS` | `true` | JSON lines instead of pretty text |
//! | `SEGMENTS_SERVICE_NAME` | `segments` | Service name attached to startup logs |

#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, HTTP_REQUESTS, HTTP_REQUEST_DURATION,
    STORE_FAILURES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        metrics = metrics.registered(),
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}
