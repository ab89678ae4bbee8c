//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name reported in startup logs
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to emit JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Whether to include file and line in log records
    pub with_source_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "segments".to_string(),
            log_level: "info".to_string(),
            json_logs: true,
            with_source_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEGMENTS_SERVICE_NAME`: Service name (default: segments)
    /// - `SEGMENTS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `SEGMENTS_JSON_LOGS`: Enable JSON logs (default: true)
    /// - `SEGMENTS_LOG_SOURCE`: Include file/line (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("SEGMENTS_SERVICE_NAME")
                .unwrap_or_else(|_| "segments".to_string()),

            log_level: env::var("SEGMENTS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("SEGMENTS_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            with_source_location: env::var("SEGMENTS_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1" || value == "yes"
}
