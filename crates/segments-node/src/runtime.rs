//! Node lifecycle: store selection, schema preparation and the serve loop.

use crate::config::{DatabaseConfig, NodeConfig, StoreBackend};
use anyhow::{Context, Result};
use segment_api::{ApiConfig, ApiServer};
use segment_service::{
    InMemorySegmentStore, PgSegmentStore, SegmentApi, SegmentService, SegmentStore,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Open the connection pool.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config.url.as_deref().context("DATABASE_URL is not set")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;

    info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

/// Create the schema if it is missing, then check the constraint names
/// that failure classification depends on.
pub async fn prepare_store<S: SegmentStore>(store: &S) -> Result<()> {
    store
        .init_schema()
        .await
        .context("failed to initialise schema")?;
    store
        .verify_schema()
        .await
        .context("schema does not match the expected constraints")?;
    Ok(())
}

/// Run the node until `shutdown` resolves.
pub async fn run<F>(config: NodeConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match config.store {
        StoreBackend::Memory => {
            warn!("using the in-memory store, data is lost on exit");
            serve(Arc::new(InMemorySegmentStore::new()), &config.api, shutdown).await
        }
        StoreBackend::Postgres => {
            let pool = connect_pool(&config.database).await?;
            let store = Arc::new(PgSegmentStore::new(pool.clone()));

            let result = match prepare_store(store.as_ref()).await {
                Ok(()) => serve(store, &config.api, shutdown).await,
                Err(e) => Err(e),
            };

            pool.close().await;
            info!("database pool closed");
            result
        }
    }
}

async fn serve<S, F>(store: Arc<S>, config: &ApiConfig, shutdown: F) -> Result<()>
where
    S: SegmentStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let api: Arc<dyn SegmentApi> = Arc::new(SegmentService::new(store));

    let server = ApiServer::bind(config, api)
        .await
        .context("failed to start HTTP server")?;
    server.serve(shutdown).await.context("HTTP server failed")?;
    Ok(())
}
