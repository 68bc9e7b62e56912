//! # fleet-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the device API.
//! Binds to a configurable port (default 8080).

use std::sync::Arc;

use anyhow::Context;
use fleet_api::db::devices::PgDeviceStore;
use fleet_api::state::{AppConfig, AppState, LogFormat};
use fleet_state::{DeviceStore, InMemoryDeviceStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    // Initialize structured tracing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(?config, "configuration loaded");

    // Initialize database pool (optional, absent means in-memory only).
    let db_pool = fleet_api::db::init_pool(&config)
        .await
        .context("database initialization failed")?;

    let store: Arc<dyn DeviceStore> = match &db_pool {
        Some(pool) => Arc::new(PgDeviceStore::new(pool.clone())),
        None => Arc::new(InMemoryDeviceStore::new()),
    };

    let mut state = AppState::with_store(store, db_pool);
    if config.metrics_enabled {
        let handle = fleet_api::middleware::metrics::install_recorder()
            .context("failed to install Prometheus recorder")?;
        state = state.with_metrics(handle);
    }

    let app = fleet_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Fleet API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Fleet API stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
