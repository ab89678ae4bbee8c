//! # Segments Node
//!
//! Wires the segments service together and runs it.
//!
//! ## Startup Sequence
//!
//! 1. Initialise telemetry (logging, metrics registry)
//! 2. Load configuration from the environment
//! 3. Open the PostgreSQL pool (or the in-memory store in development)
//! 4. Create the schema if missing, then verify its constraint names
//! 5. Serve HTTP until Ctrl+C, draining in-flight requests
//! 6. Close the pool

pub mod config;
pub mod runtime;

pub use config::{
    load_config, load_config_from, ConfigError, DatabaseConfig, NodeConfig, StoreBackend,
};
pub use runtime::{connect_pool, prepare_store, run};
