//! Device persistence operations.
//!
//! [`PgDeviceStore`] implements [`DeviceStore`] over the `devices` table.
//! Every primitive is a single statement, so Postgres row locking gives the
//! per-id atomicity the lifecycle service relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::{Device, DeviceDraft, DeviceId, DeviceState, Timestamp};
use fleet_state::{DeviceStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, name, brand, state, created_at";

/// Postgres-backed device store.
#[derive(Debug, Clone)]
pub struct PgDeviceStore {
    pool: PgPool,
}

impl PgDeviceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_list(&self, sql: &str, binds: ListBinds<'_>) -> Result<Vec<Device>, StoreError> {
        let mut query = sqlx::query_as::<_, DeviceRow>(sql);
        if let Some(brand) = binds.brand {
            query = query.bind(brand);
        }
        if let Some(state) = binds.state {
            query = query.bind(state.as_str());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(backend)?;
        Ok(into_devices(rows))
    }
}

#[derive(Default)]
struct ListBinds<'a> {
    brand: Option<&'a str>,
    state: Option<DeviceState>,
}

#[async_trait]
impl DeviceStore for PgDeviceStore {
    async fn get(&self, id: DeviceId) -> Result<Option<Device>, StoreError> {
        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {COLUMNS} FROM devices WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(DeviceRow::into_device).transpose()
    }

    async fn get_all(&self) -> Result<Vec<Device>, StoreError> {
        self.fetch_list(
            &format!("SELECT {COLUMNS} FROM devices ORDER BY created_at, id"),
            ListBinds::default(),
        )
        .await
    }

    async fn get_by_brand(&self, brand: &str) -> Result<Vec<Device>, StoreError> {
        self.fetch_list(
            &format!("SELECT {COLUMNS} FROM devices WHERE brand = $1 ORDER BY created_at, id"),
            ListBinds {
                brand: Some(brand),
                ..ListBinds::default()
            },
        )
        .await
    }

    async fn get_by_state(&self, state: DeviceState) -> Result<Vec<Device>, StoreError> {
        self.fetch_list(
            &format!("SELECT {COLUMNS} FROM devices WHERE state = $1 ORDER BY created_at, id"),
            ListBinds {
                state: Some(state),
                ..ListBinds::default()
            },
        )
        .await
    }

    async fn get_by_brand_and_state(
        &self,
        brand: &str,
        state: DeviceState,
    ) -> Result<Vec<Device>, StoreError> {
        self.fetch_list(
            &format!(
                "SELECT {COLUMNS} FROM devices WHERE brand = $1 AND state = $2 \
                 ORDER BY created_at, id"
            ),
            ListBinds {
                brand: Some(brand),
                state: Some(state),
            },
        )
        .await
    }

    async fn insert(&self, draft: DeviceDraft) -> Result<Device, StoreError> {
        let device = draft.into_device(DeviceId::new(), Timestamp::now());

        sqlx::query(
            "INSERT INTO devices (id, name, brand, state, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*device.id.as_uuid())
        .bind(&device.name)
        .bind(&device.brand)
        .bind(device.state.as_str())
        .bind(*device.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(device)
    }

    async fn save(&self, device: Device) -> Result<Device, StoreError> {
        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            "INSERT INTO devices (id, name, brand, state, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE
             SET name = EXCLUDED.name, brand = EXCLUDED.brand, state = EXCLUDED.state
             RETURNING {COLUMNS}"
        ))
        .bind(*device.id.as_uuid())
        .bind(&device.name)
        .bind(&device.brand)
        .bind(device.state.as_str())
        .bind(*device.created_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        row.into_device()
    }

    async fn delete(&self, device: &Device) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(*device.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Convert list rows, dropping (and logging) rows that cannot be decoded.
fn into_devices(rows: Vec<DeviceRow>) -> Vec<Device> {
    rows.into_iter()
        .filter_map(|row| match row.into_device() {
            Ok(device) => Some(device),
            Err(e) => {
                tracing::error!(error = %e, "skipping corrupt device row");
                None
            }
        })
        .collect()
}

// ── Row type ─────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct DeviceRow {
    id: Uuid,
    name: String,
    brand: String,
    state: String,
    created_at: DateTime<Utc>,
}

impl DeviceRow {
    fn into_device(self) -> Result<Device, StoreError> {
        let state = self
            .state
            .parse::<DeviceState>()
            .map_err(|e| StoreError::Corrupt {
                id: self.id.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Device {
            id: DeviceId::from_uuid(self.id),
            name: self.name,
            brand: self.brand,
            state,
            created_at: Timestamp::from_utc(self.created_at),
        })
    }
}
