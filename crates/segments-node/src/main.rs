//! Segments node binary.

use anyhow::{Context, Result};
use segment_telemetry::{init_telemetry, TelemetryConfig};
use segments_node::{load_config, run};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = load_config().context("invalid configuration")?;
    info!(
        version = segment_service::VERSION,
        store = ?config.store,
        listen_addr = %config.api.listen_addr,
        "Starting segments node"
    );

    run(config, shutdown_signal()).await?;

    info!("Segments node stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for Ctrl+C, shutting down"),
    }
}
