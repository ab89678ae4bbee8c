//! # Domain Module
//!
//! Core domain types: segment names, users, memberships and the error
//! taxonomy.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
