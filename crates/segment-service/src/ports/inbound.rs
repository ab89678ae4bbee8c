//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the segments subsystem, consumed by the HTTP layer.

use crate::domain::{SegmentChange, SegmentName, ServiceError, UserId};
use async_trait::async_trait;

/// Segment and membership management.
///
/// Every error carries the operation it came from and keeps the
/// underlying [`ErrorKind`](crate::domain::ErrorKind) recoverable.
#[async_trait]
pub trait SegmentApi: Send + Sync {
    /// Create a segment.
    ///
    /// ## Errors
    ///
    /// - `SegmentAlreadyExists`: name already taken
    /// - `StorageFailure`: backing store failed
    async fn create_segment(&self, name: &SegmentName) -> Result<(), ServiceError>;

    /// Delete a segment and, with it, its memberships.
    ///
    /// ## Errors
    ///
    /// - `SegmentNotFound`: no such segment
    /// - `StorageFailure`: backing store failed
    async fn delete_segment(&self, name: &SegmentName) -> Result<(), ServiceError>;

    /// Add and remove segments for one user.
    ///
    /// The add batch is attempted first, then the delete batch; an empty
    /// list skips its batch. When both batches fail, both failures are
    /// reported.
    ///
    /// ## Errors
    ///
    /// - `SegmentNotFound`, `UserAlreadyInSegment`: add batch rejected
    /// - `UserNotInSegment`: delete batch removed nothing
    /// - `StorageFailure`: backing store failed
    async fn change_user_segments(&self, change: &SegmentChange) -> Result<(), ServiceError>;

    /// Segments the user belongs to. Empty for a user without memberships.
    async fn get_user_segments(&self, user: UserId) -> Result<Vec<SegmentName>, ServiceError>;
}
