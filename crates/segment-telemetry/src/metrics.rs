//! Prometheus metrics for the segments service.
//!
//! All metrics follow the naming convention: `segments_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., http_requests_total)
//! - **Histogram**: Distribution of values (e.g., http_request_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Registry served by `/metrics`
    pub static ref REGISTRY: Registry = Registry::new();

    /// HTTP requests by route and response status
    pub static ref HTTP_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("segments_http_requests_total", "HTTP requests by route and status"),
        &["route", "status"]
    ).expect("metric creation failed");

    /// HTTP request latency by route
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "segments_http_request_duration_seconds",
            "Time spent serving HTTP requests"
        ).buckets(exponential_buckets(0.0005, 2.0, 14).expect("valid buckets")),
        &["route"]
    ).expect("metric creation failed");

    /// Store failures by operation and error kind
    pub static ref STORE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("segments_store_failures_total", "Store failures by operation and kind"),
        &["operation", "kind"]
    ).expect("metric creation failed");
}

/// Proof that the service metrics are registered in [`REGISTRY`].
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of metric families registered.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register the service metrics with [`REGISTRY`].
///
/// Registering twice fails with `TelemetryError::MetricsInit`.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let collectors: [Box<dyn prometheus::core::Collector>; 3] = [
        Box::new(HTTP_REQUESTS.clone()),
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(STORE_FAILURES.clone()),
    ];
    let registered = collectors.len();

    for collector in collectors {
        REGISTRY
            .register(collector)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle { registered })
}

/// Render [`REGISTRY`] in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let mut text = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut text)
        .map_err(|e| TelemetryError::MetricsInit(format!("encode: {e}")))?;
    String::from_utf8(text).map_err(|e| TelemetryError::MetricsInit(format!("utf-8: {e}")))
}
