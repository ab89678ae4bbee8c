//! # Segment Service
//!
//! Segments are named cohorts; a membership ties one user to one segment.
//! This crate owns the persistent relationship between the two and the
//! error taxonomy every layer above it speaks.
//!
//! ## Architecture
//!
//! ```text
//! segment-api ──SegmentApi──→ SegmentService ──SegmentStore──→ PgSegmentStore ──→ PostgreSQL
//!                                                         └──→ InMemorySegmentStore
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Segment names are unique | `segment_pkey` |
//! | A membership needs its segment | `users_in_segment_segment_fkey` |
//! | A (user, segment) pair is unique | `users_in_segment_user_id_segment_key` |
//! | Batches apply all-or-nothing | one transaction per batch |
//!
//! Violations are classified by constraint name (`adapters::storage::constraints`),
//! never by a read-then-write check.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities and the error taxonomy
//! - `ports/` - Port traits (inbound API, outbound store)
//! - `service.rs` - Application service implementing the API
//! - `adapters/` - PostgreSQL and in-memory stores
//!
//! ## Usage
//!
//! ```ignore
//! use segment_service::{InMemorySegmentStore, SegmentApi, SegmentName, SegmentService};
//! use std::sync::Arc;
//!
//! let service = SegmentService::new(Arc::new(InMemorySegmentStore::new()));
//! service.create_segment(&SegmentName::new("AVITO_VOICE_MESSAGES")?).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use adapters::InMemorySegmentStore;
#[cfg(feature = "postgres")]
pub use adapters::PgSegmentStore;
pub use domain::{
    ErrorKind, InvalidSegmentName, Membership, Operation, OperationFailure, SchemaError,
    SegmentChange, SegmentName, ServiceError, StoreError, UserId, MAX_SEGMENT_NAME_LEN,
};
pub use ports::inbound::SegmentApi;
pub use ports::outbound::{MockSegmentStore, SegmentStore, StoreCall};
pub use service::SegmentService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
