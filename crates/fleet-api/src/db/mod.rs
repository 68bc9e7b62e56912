//! # Database Persistence Layer
//!
//! Postgres persistence for device records via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, devices
//! are stored in the `devices` table through [`devices::PgDeviceStore`].
//! When absent, the API runs against the in-memory store (suitable for
//! development and testing; state does not survive restarts).

pub mod devices;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::AppConfig;

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no database URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(config: &AppConfig) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, running with the in-memory device store. \
             Devices will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "connected to PostgreSQL"
    );

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    Ok(Some(pool))
}
