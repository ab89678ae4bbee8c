//! # Adapters Module
//!
//! Adapter implementations for the segments subsystem.
//!
//! ## Modules
//!
//! - `storage`: PostgreSQL and in-memory `SegmentStore` implementations

pub mod storage;

pub use storage::InMemorySegmentStore;
#[cfg(feature = "postgres")]
pub use storage::PgSegmentStore;
