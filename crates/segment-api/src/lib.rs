//! # Segments HTTP API
//!
//! JSON routes over the [`SegmentApi`](segment_service::SegmentApi).
//!
//! ## Routes
//!
//! | Method+Path | Body | Success | Domain failure |
//! |-------------|------|---------|----------------|
//! | POST /api/create_segment | `{segment}` | 201 | 200 `{error}` |
//! | POST /api/delete_segment | `{segment}` | 202 | 200 `{error}` |
//! | POST /api/change_user_segments | `{user_id, segments_to_add, segments_to_delete}` | 201 | 200 `{errors: [..]}` |
//! | GET /api/get_user_segments | `?user_id=` or `{user_id}` | 200 `{user_id, user_segments}` | - |
//! | GET /health | - | 200 | - |
//! | GET /metrics | - | 200 Prometheus text | - |
//!
//! Wrong method → 405. Malformed body → empty 400. Anything unclassified,
//! including a missed deadline → empty 500.
//!
//! ## Middleware
//!
//! Request → Tracing → Metrics → Timeout → BodyLimit → Handler

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use domain::{ApiConfig, ApiError, ApiResult, ConfigError, ServerError};
pub use router::{build_router, routes, AppState};
pub use server::ApiServer;
