//! # Segment Service
//!
//! Application service implementing [`SegmentApi`] on top of a
//! [`SegmentStore`].
//!
//! The service adds operation context to store errors and, for
//! `change_user_segments`, keeps every failed batch so the caller can
//! report each one.

use crate::domain::{
    Operation, OperationFailure, SegmentChange, SegmentName, ServiceError, StoreError, UserId,
};
use crate::ports::inbound::SegmentApi;
use crate::ports::outbound::SegmentStore;
use async_trait::async_trait;
use segment_telemetry::STORE_FAILURES;
use std::sync::Arc;
use tracing::{debug, warn};

/// The Segment Service.
pub struct SegmentService<S: SegmentStore> {
    store: Arc<S>,
}

impl<S: SegmentStore> SegmentService<S> {
    /// Create a service over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn failure(operation: Operation, error: StoreError) -> OperationFailure {
        warn!(operation = %operation, kind = %error.kind(), error = %error, "store call failed");
        STORE_FAILURES
            .with_label_values(&[operation.context(), error.kind().as_str()])
            .inc();
        OperationFailure::new(operation, error)
    }
}

impl<S: SegmentStore> Clone for SegmentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

#[async_trait]
impl<S: SegmentStore + 'static> SegmentApi for SegmentService<S> {
    async fn create_segment(&self, name: &SegmentName) -> Result<(), ServiceError> {
        debug!(segment = %name, "creating segment");
        self.store
            .create_segment(name)
            .await
            .map_err(|e| Self::failure(Operation::CreateSegment, e).into())
    }

    async fn delete_segment(&self, name: &SegmentName) -> Result<(), ServiceError> {
        debug!(segment = %name, "deleting segment");
        self.store
            .delete_segment(name)
            .await
            .map_err(|e| Self::failure(Operation::DeleteSegment, e).into())
    }

    async fn change_user_segments(&self, change: &SegmentChange) -> Result<(), ServiceError> {
        debug!(
            user_id = %change.user_id,
            add = change.to_add.len(),
            delete = change.to_delete.len(),
            "changing user segments"
        );

        let mut failures = Vec::new();

        if !change.to_add.is_empty() {
            let added = match parse_all(&change.to_add) {
                Some(names) => {
                    self.store
                        .add_user_to_segments(change.user_id, &names)
                        .await
                }
                // An unusable name can never reference a stored segment.
                None => Err(StoreError::SegmentNotFound),
            };
            if let Err(e) = added {
                failures.push(Self::failure(Operation::AddUserToSegments, e));
            }
        }

        if !change.to_delete.is_empty() {
            let names = parse_valid(&change.to_delete);
            let removed = if names.is_empty() {
                Err(StoreError::UserNotInSegment)
            } else {
                self.store
                    .delete_user_from_segments(change.user_id, &names)
                    .await
            };
            if let Err(e) = removed {
                failures.push(Self::failure(Operation::DeleteUserFromSegments, e));
            }
        }

        ServiceError::from_failures(failures)
    }

    async fn get_user_segments(&self, user: UserId) -> Result<Vec<SegmentName>, ServiceError> {
        debug!(user_id = %user, "getting user segments");
        self.store
            .get_user_segments(user)
            .await
            .map_err(|e| Self::failure(Operation::GetUserSegments, e).into())
    }
}

/// Every name parsed, or `None` if any of them is invalid.
fn parse_all(names: &[String]) -> Option<Vec<SegmentName>> {
    names
        .iter()
        .map(|name| SegmentName::new(name.as_str()).ok())
        .collect()
}

/// The valid names only; invalid ones match no membership.
fn parse_valid(names: &[String]) -> Vec<SegmentName> {
    names
        .iter()
        .filter_map(|name| SegmentName::new(name.as_str()).ok())
        .collect()
}
