//! # Node Configuration
//!
//! Runtime parameters, read once from the environment at startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | required for the postgres store |
//! | `SEGMENTS_STORE` | `postgres` (or `memory`) |
//! | `SEGMENTS_LISTEN_ADDR` | `0.0.0.0:80` |
//! | `SEGMENTS_DB_MAX_CONNECTIONS` | `10` |
//! | `SEGMENTS_DB_ACQUIRE_TIMEOUT_MS` | `5000` |
//! | `SEGMENTS_REQUEST_TIMEOUT_MS` | `10000` |
//! | `SEGMENTS_MAX_BODY_BYTES` | `1048576` |
//!
//! Logging variables are read by `segment_telemetry::TelemetryConfig`.

use segment_api::ApiConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// HTTP server configuration.
    pub api: ApiConfig,
    /// Database pool configuration.
    pub database: DatabaseConfig,
    /// Which store backs the service.
    pub store: StoreBackend,
}

impl NodeConfig {
    /// Check the configuration is usable before anything is started.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api
            .validate()
            .map_err(|e| ConfigError::Api(e.to_string()))?;

        if self.store == StoreBackend::Postgres {
            if self.database.url.is_none() {
                return Err(ConfigError::MissingDatabaseUrl);
            }
            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "SEGMENTS_DB_MAX_CONNECTIONS",
                    value: "0".into(),
                    reason: "must be at least 1".into(),
                });
            }
        }
        Ok(())
    }
}

/// Database pool configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection string.
    pub url: Option<String>,
    /// Pool size.
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout: Duration::from_millis(5000),
        }
    }
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// PostgreSQL through a connection pool.
    #[default]
    Postgres,
    /// Process-local store, for development only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store {other:?}, expected postgres or memory")),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set to something unusable.
    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The postgres store needs a connection string.
    #[error("DATABASE_URL must be set when SEGMENTS_STORE=postgres")]
    MissingDatabaseUrl,

    /// HTTP settings rejected.
    #[error("invalid API configuration: {0}")]
    Api(String),
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration through `lookup`, starting from defaults.
pub fn load_config_from<F>(lookup: F) -> Result<NodeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NodeConfig::default();

    config.database.url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

    if let Some(store) = parse_var::<StoreBackend, _>(&lookup, "SEGMENTS_STORE")? {
        config.store = store;
    }
    if let Some(addr) = parse_var::<SocketAddr, _>(&lookup, "SEGMENTS_LISTEN_ADDR")? {
        config.api.listen_addr = addr;
    }
    if let Some(n) = parse_var::<u32, _>(&lookup, "SEGMENTS_DB_MAX_CONNECTIONS")? {
        config.database.max_connections = n;
    }
    if let Some(ms) = parse_var::<u64, _>(&lookup, "SEGMENTS_DB_ACQUIRE_TIMEOUT_MS")? {
        config.database.acquire_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = parse_var::<u64, _>(&lookup, "SEGMENTS_REQUEST_TIMEOUT_MS")? {
        config.api.request_timeout = Duration::from_millis(ms);
    }
    if let Some(bytes) = parse_var::<usize, _>(&lookup, "SEGMENTS_MAX_BODY_BYTES")? {
        config.api.max_body_bytes = bytes;
    }

    config.validate()?;
    Ok(config)
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}
