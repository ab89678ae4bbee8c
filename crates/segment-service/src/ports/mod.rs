//! # Ports Layer
//!
//! Defines the port traits for the segments subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (API exposed to the HTTP layer)
//! - `outbound.rs` - Driven ports (storage required by the service)

pub mod inbound;
pub mod outbound;
