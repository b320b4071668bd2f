//! StockMesh engine entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mesh_runtime::{RestStorefrontClient, RuntimeConfig, SyncEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RuntimeConfig::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    if config.sites.is_empty() {
        warn!("no sites configured; events will apply locally without propagation");
    }

    let storefront = RestStorefrontClient::new(Duration::from_millis(config.http_timeout_ms));
    let engine = SyncEngine::new(config, storefront)?;

    let workers = engine.spawn_workers();
    let scheduler = engine.spawn_reconcile_scheduler();
    info!(workers = workers.len(), "engine running");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested, draining propagation queue");

    if let Some(handle) = scheduler {
        handle.abort();
    }
    engine.shutdown();
    for handle in workers {
        let _ = handle.await;
    }

    info!("engine stopped");
    Ok(())
}
