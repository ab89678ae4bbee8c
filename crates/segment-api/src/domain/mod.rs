//! Domain types for the HTTP API: configuration and error handling.

pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::{ApiConfig, ConfigError};
pub use error::{message_for, messages, ApiError, ApiResult, ServerError};
