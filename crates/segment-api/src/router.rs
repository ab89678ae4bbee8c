use crate::domain::config::ApiConfig;
use crate::handlers;
use crate::middleware::{MetricsLayer, TimeoutLayer, TracingLayer};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use segment_service::SegmentApi;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Route paths
pub mod routes {
    pub const CREATE_SEGMENT: &str = "/api/create_segment";
    pub const DELETE_SEGMENT: &str = "/api/delete_segment";
    pub const CHANGE_USER_SEGMENTS: &str = "/api/change_user_segments";
    pub const GET_USER_SEGMENTS: &str = "/api/get_user_segments";
    pub const HEALTH: &str = "/health";
    pub const METRICS: &str = "/metrics";

    /// Every served path.
    pub const ALL: [&str; 6] = [
        CREATE_SEGMENT,
        DELETE_SEGMENT,
        CHANGE_USER_SEGMENTS,
        GET_USER_SEGMENTS,
        HEALTH,
        METRICS,
    ];
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn SegmentApi>,
}

/// Build the router with its middleware stack.
///
/// A wrong method on a known path is answered with 405 by the router.
pub fn build_router(api: Arc<dyn SegmentApi>, config: &ApiConfig) -> Router {
    let state = AppState { api };

    let middleware = ServiceBuilder::new()
        .layer(TracingLayer::new())
        .layer(MetricsLayer::new())
        .layer(TimeoutLayer::new(config.request_timeout));

    Router::new()
        .route(routes::CREATE_SEGMENT, post(handlers::create_segment))
        .route(routes::DELETE_SEGMENT, post(handlers::delete_segment))
        .route(
            routes::CHANGE_USER_SEGMENTS,
            post(handlers::change_user_segments),
        )
        .route(routes::GET_USER_SEGMENTS, get(handlers::get_user_segments))
        .route(routes::HEALTH, get(handlers::health_check))
        .route(routes::METRICS, get(handlers::metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(middleware)
        .with_state(state)
}
