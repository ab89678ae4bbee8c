//! Route handlers.
//!
//! Bodies are taken as raw bytes and decoded with `serde_json`, so an
//! unreadable or malformed body is always an empty 400 whatever the
//! content type.

use crate::domain::error::{ApiError, ApiResult};
use crate::router::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use segment_service::{SegmentChange, SegmentName, UserId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Debug, Deserialize)]
struct SegmentRequest {
    segment: SegmentName,
}

#[derive(Debug, Deserialize)]
struct ChangeUserSegmentsRequest {
    user_id: UserId,
    #[serde(default)]
    segments_to_add: Option<Vec<String>>,
    #[serde(default)]
    segments_to_delete: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct UserRequest {
    user_id: UserId,
}

/// Query string of `GET /api/get_user_segments`.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<i64>,
}

/// Body of a successful `GET /api/get_user_segments`.
#[derive(Debug, Serialize)]
pub struct UserSegmentsResponse {
    pub user_id: UserId,
    pub user_segments: Vec<SegmentName>,
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    Ok(serde_json::from_slice(body)?)
}

/// `POST /api/create_segment`
pub async fn create_segment(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let req: SegmentRequest = parse(&body)?;
    state
        .api
        .create_segment(&req.segment)
        .await
        .map_err(ApiError::on_create)?;
    Ok(StatusCode::CREATED)
}

/// `POST /api/delete_segment`
pub async fn delete_segment(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let req: SegmentRequest = parse(&body)?;
    state
        .api
        .delete_segment(&req.segment)
        .await
        .map_err(ApiError::on_delete)?;
    Ok(StatusCode::ACCEPTED)
}

/// `POST /api/change_user_segments`
///
/// Segment names are passed on unvalidated; an unusable name fails its
/// half of the change like any other missing segment.
pub async fn change_user_segments(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let req: ChangeUserSegmentsRequest = parse(&body)?;
    let change = SegmentChange::new(
        req.user_id,
        req.segments_to_add.unwrap_or_default(),
        req.segments_to_delete.unwrap_or_default(),
    );
    state
        .api
        .change_user_segments(&change)
        .await
        .map_err(ApiError::on_change)?;
    Ok(StatusCode::CREATED)
}

/// `GET /api/get_user_segments`
///
/// `user_id` comes from the query string when present, otherwise from a
/// JSON body.
pub async fn get_user_segments(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<UserSegmentsResponse>> {
    let Query(query) = query.map_err(ApiError::bad_request)?;
    let user_id = match query.user_id {
        Some(id) => UserId(id),
        None => parse::<UserRequest>(&body)?.user_id,
    };

    let user_segments = state
        .api
        .get_user_segments(user_id)
        .await
        .map_err(ApiError::on_get)?;

    Ok(Json(UserSegmentsResponse {
        user_id,
        user_segments,
    }))
}

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "segments",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `GET /metrics`
pub async fn metrics() -> impl IntoResponse {
    match segment_telemetry::encode_metrics() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            ApiError::internal().into_response()
        }
    }
}
