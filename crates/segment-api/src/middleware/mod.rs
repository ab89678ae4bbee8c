//! Middleware stack for the HTTP API.
//!
//! Layer order: Request → Tracing → Metrics → Timeout → BodyLimit → Handler

pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use metrics::{route_label, MetricsLayer};
pub use timeout::TimeoutLayer;
pub use tracing::{TracingLayer, REQUEST_ID_HEADER};
