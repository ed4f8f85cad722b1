use std::sync::Arc;

use anyhow::Context;
use chrono::{TimeDelta, Utc};
use common::retry::calculate_backoff;
use common::storage::ChunkStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use videohost::config::AppConfig;
use videohost::database::init_db;
use videohost::state::{AppState, StoreSlot};
use videohost::store::DbChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let slot = StoreSlot::new();
    tokio::spawn(connect_store(config.clone(), slot.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = videohost::build_router(AppState {
        config,
        store: slot,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Connect to the database in the background, retrying with backoff, then
/// clean up leftovers from a previous run and open the store for requests.
async fn connect_store(config: AppConfig, slot: StoreSlot) {
    let mut attempt = 0u32;
    let db = loop {
        match init_db(&config.database).await {
            Ok(db) => break db,
            Err(e) => {
                attempt = attempt.saturating_add(1);
                let delay = calculate_backoff(attempt, 500, 30_000);
                warn!(
                    attempt,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Database connection failed"
                );
                tokio::time::sleep(delay).await;
            }
        }
    };
    info!("Database connected");

    let store = DbChunkStore::new(db, config.storage.chunk_size);

    let stale_after = i64::try_from(config.storage.stale_after_secs).unwrap_or(i64::MAX);
    match TimeDelta::try_seconds(stale_after).and_then(|d| Utc::now().checked_sub_signed(d)) {
        Some(cutoff) => {
            if let Err(e) = store.sweep_stale(cutoff).await {
                error!(error = %e, "Failed to remove stale uploads");
            }
        }
        None => warn!(stale_after, "Stale upload cutoff out of range, skipping sweep"),
    }

    slot.set(Arc::new(store));
    info!(
        chunk_size = config.storage.chunk_size,
        max_upload_size = config.storage.max_upload_size,
        "Storage ready"
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
