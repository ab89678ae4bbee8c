//! Storage Adapters
//!
//! Implementations of the `SegmentStore` port.

pub mod constraints;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
pub mod schema;

pub use constraints::{classify, ConstraintRule, ConstraintType, CONSTRAINT_RULES};
pub use memory::InMemorySegmentStore;
#[cfg(feature = "postgres")]
pub use postgres::PgSegmentStore;
