use crate::domain::{Membership, SchemaError, SegmentName, StoreError, UserId};
use crate::ports::outbound::SegmentStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeSet;

#[derive(Default)]
struct Tables {
    segments: BTreeSet<SegmentName>,
    memberships: BTreeSet<(UserId, SegmentName)>,
}

/// In-memory segment store for tests and local runs.
///
/// Mirrors the PostgreSQL schema: segment names are unique, a membership
/// needs its segment, deleting a segment cascades to its memberships.
/// Each batch runs under one write lock, so readers never observe it
/// half-applied.
#[derive(Default)]
pub struct InMemorySegmentStore {
    tables: RwLock<Tables>,
}

impl InMemorySegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All segments, ordered by name.
    pub fn segments(&self) -> Vec<SegmentName> {
        self.tables.read().segments.iter().cloned().collect()
    }

    /// All memberships, ordered by user then segment.
    pub fn memberships(&self) -> Vec<Membership> {
        self.tables
            .read()
            .memberships
            .iter()
            .map(|(user_id, segment)| Membership {
                user_id: *user_id,
                segment: segment.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl SegmentStore for InMemorySegmentStore {
    async fn create_segment(&self, name: &SegmentName) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if !tables.segments.insert(name.clone()) {
            return Err(StoreError::SegmentAlreadyExists);
        }
        Ok(())
    }

    async fn delete_segment(&self, name: &SegmentName) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if !tables.segments.remove(name) {
            return Err(StoreError::SegmentNotFound);
        }
        tables.memberships.retain(|(_, segment)| segment != name);
        Ok(())
    }

    async fn add_user_to_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();

        // Validate the whole batch before touching anything
        let mut pending = BTreeSet::new();
        for segment in segments {
            if !tables.segments.contains(segment) {
                return Err(StoreError::SegmentNotFound);
            }
            let row = (user, segment.clone());
            if tables.memberships.contains(&row) || !pending.insert(row) {
                return Err(StoreError::UserAlreadyInSegment);
            }
        }

        tables.memberships.extend(pending);
        Ok(())
    }

    async fn delete_user_from_segments(
        &self,
        user: UserId,
        segments: &[SegmentName],
    ) -> Result<(), StoreError> {
        if segments.is_empty() {
            return Ok(());
        }

        let mut tables = self.tables.write();
        let removed = segments
            .iter()
            .filter(|segment| tables.memberships.remove(&(user, (*segment).clone())))
            .count();

        if removed == 0 {
            return Err(StoreError::UserNotInSegment);
        }
        Ok(())
    }

    async fn get_user_segments(&self, user: UserId) -> Result<Vec<SegmentName>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .memberships
            .iter()
            .filter(|(member, _)| *member == user)
            .map(|(_, segment)| segment.clone())
            .collect())
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn verify_schema(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}
