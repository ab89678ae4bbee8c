//! # Outbound Ports (Driven Ports)
//!
//! Persistence required by the Segment Service.
//!
//! Production: `PgSegmentStore` (adapters/storage/postgres.rs)
//! Testing: `InMemorySegmentStore` (adapters/storage/memory.rs) and
//! `MockSegmentStore` (below)

use crate::domain::{SchemaError, SegmentName, StoreError, UserId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Durable storage of segments and memberships.
///
/// Every uniqueness and referential rule is enforced by the store itself;
/// implementations never check-then-act.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Insert a new segment.
    ///
    /// Fails with `SegmentAlreadyExists` on a name collision.
    async fn create_segment(&self, name: &SegmentName) -> Result<(), StoreError>;

    /// Delete a segment.
    ///
    /// Fails with `SegmentNotFound` when no row was removed.
    async fn delete_segment(&self, name: &SegmentName) -> Result<(), StoreError>;

    /// Add `user` to every segment in `segments` as one atomic batch.
    ///
    /// Fails with `SegmentNotFound` when a segment does not exist and with
    /// `UserAlreadyInSegment` when a membership is already present. On
    /// failure nothing from the batch is applied. An empty list is a no-op.
    async fn add_user_to_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError>;

    /// Remove `user` from every segment in `segments` as one atomic batch.
    ///
    /// Fails with `UserNotInSegment` when the batch removed zero rows in
    /// total. An empty list is a no-op.
    async fn delete_user_from_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError>;

    /// Segments `user` currently belongs to. No particular order is
    /// guaranteed; a user without memberships gets an empty list.
    async fn get_user_segments(&self, user: UserId) -> Result<Vec<SegmentName>, StoreError>;

    /// Create tables and constraints if absent. Safe to run on every start.
    async fn init_schema(&self) -> Result<(), StoreError>;

    /// Check that the constraints used for error classification exist.
    async fn verify_schema(&self) -> Result<(), SchemaError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateSegment(SegmentName),
    DeleteSegment(SegmentName),
    AddUserToSegments(UserId, Vec<SegmentName>),
    DeleteUserFromSegments(UserId, Vec<SegmentName>),
    GetUserSegments(UserId),
}

/// Store double that records calls and replays scripted results.
///
/// Unscripted calls succeed (and `get_user_segments` returns an empty list).
#[derive(Default)]
pub struct MockSegmentStore {
    calls: Mutex<Vec<StoreCall>>,
    create_results: Mutex<VecDeque<Result<(), StoreError>>>,
    delete_results: Mutex<VecDeque<Result<(), StoreError>>>,
    add_results: Mutex<VecDeque<Result<(), StoreError>>>,
    remove_results: Mutex<VecDeque<Result<(), StoreError>>>,
    get_results: Mutex<VecDeque<Result<Vec<SegmentName>, StoreError>>>,
}

impl MockSegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next `create_segment` result.
    pub fn push_create(&self, result: Result<(), StoreError>) -> &Self {
        self.create_results.lock().push_back(result);
        self
    }

    /// Script the next `delete_segment` result.
    pub fn push_delete(&self, result: Result<(), StoreError>) -> &Self {
        self.delete_results.lock().push_back(result);
        self
    }

    /// Script the next `add_user_to_segments` result.
    pub fn push_add(&self, result: Result<(), StoreError>) -> &Self {
        self.add_results.lock().push_back(result);
        self
    }

    /// Script the next `delete_user_from_segments` result.
    pub fn push_remove(&self, result: Result<(), StoreError>) -> &Self {
        self.remove_results.lock().push_back(result);
        self
    }

    /// Script the next `get_user_segments` result.
    pub fn push_get(&self, result: Result<Vec<SegmentName>, StoreError>) -> &Self {
        self.get_results.lock().push_back(result);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl SegmentStore for MockSegmentStore {
    async fn create_segment(&self, name: &SegmentName) -> Result<(), StoreError> {
        self.record(StoreCall::CreateSegment(name.clone()));
        self.create_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn delete_segment(&self, name: &SegmentName) -> Result<(), StoreError> {
        self.record(StoreCall::DeleteSegment(name.clone()));
        self.delete_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn add_user_to_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError> {
        self.record(StoreCall::AddUserToSegments(user, segments.to_vec()));
        self.add_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn delete_user_from_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError> {
        self.record(StoreCall::DeleteUserFromSegments(user, segments.to_vec()));
        self.remove_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn get_user_segments(&self, user: UserId) -> Result<Vec<SegmentName>, StoreError> {
        self.record(StoreCall::GetUserSegments(user));
        self.get_results.lock().pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn verify_schema(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}
