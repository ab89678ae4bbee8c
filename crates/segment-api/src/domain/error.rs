//! HTTP error responses and server-level errors.
//!
//! Only this module turns domain failures into user-visible text. Anything
//! it does not recognise becomes a bare 500 and is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use segment_service::{ErrorKind, ServiceError};
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, error};

/// User-visible messages per domain error kind
pub mod messages {
    pub const SEGMENT_ALREADY_EXISTS: &str = "segment with this name is already exists";
    pub const SEGMENT_NOT_FOUND: &str = "can't find the segment";
    pub const USER_NOT_IN_SEGMENT: &str = "user doesn't have this segment";
    pub const USER_ALREADY_IN_SEGMENT: &str = "user is already has this segment";
}

/// Message shown for a domain kind, `None` for storage failures.
pub fn message_for(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::SegmentAlreadyExists => Some(messages::SEGMENT_ALREADY_EXISTS),
        ErrorKind::SegmentNotFound => Some(messages::SEGMENT_NOT_FOUND),
        ErrorKind::UserNotInSegment => Some(messages::USER_NOT_IN_SEGMENT),
        ErrorKind::UserAlreadyInSegment => Some(messages::USER_ALREADY_IN_SEGMENT),
        ErrorKind::StorageFailure => None,
    }
}

/// Error response: a status and an optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body, `None` for an empty response
    pub body: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Malformed request; empty 400.
    pub fn bad_request(details: impl fmt::Display) -> Self {
        debug!(error = %details, "rejecting malformed request");
        Self::new(StatusCode::BAD_REQUEST, None)
    }

    /// Unclassified failure; empty 500.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    /// Domain failures answer 200 with the message in the body.
    fn single(message: &str) -> Self {
        Self::new(StatusCode::OK, Some(json!({ "error": message })))
    }

    fn unexpected(err: &ServiceError) -> Self {
        error!(error = %err, "request failed");
        Self::internal()
    }

    /// Map a `create_segment` failure.
    pub fn on_create(err: ServiceError) -> Self {
        if err.has_kind(ErrorKind::SegmentAlreadyExists) {
            return Self::single(messages::SEGMENT_ALREADY_EXISTS);
        }
        Self::unexpected(&err)
    }

    /// Map a `delete_segment` failure.
    pub fn on_delete(err: ServiceError) -> Self {
        if err.has_kind(ErrorKind::SegmentNotFound) {
            return Self::single(messages::SEGMENT_NOT_FOUND);
        }
        Self::unexpected(&err)
    }

    /// Map a `change_user_segments` failure: one message per matched kind.
    pub fn on_change(err: ServiceError) -> Self {
        let errors: Vec<&str> = err
            .domain_kinds_in_report_order()
            .into_iter()
            .filter_map(message_for)
            .collect();

        if errors.is_empty() {
            return Self::unexpected(&err);
        }
        if err.kinds().any(|k| !k.is_domain()) {
            // Storage failure next to a domain failure
            error!(error = %err, "change partially failed in storage");
        }
        Self::new(StatusCode::OK, Some(json!({ "errors": errors })))
    }

    /// Map a `get_user_segments` failure.
    pub fn on_get(err: ServiceError) -> Self {
        Self::unexpected(&err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Some(body) => write!(f, "[{}] {}", self.status.as_u16(), body),
            None => write!(f, "[{}]", self.status.as_u16()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::bad_request(e)
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Server-level errors (not user-facing)
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Listener could not bind
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server loop failed
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
