//! # Device Store
//!
//! The storage contract the lifecycle service depends on, and a thread-safe
//! in-memory implementation.
//!
//! Implementations must make each individual primitive atomic per device id
//! (two concurrent `save` calls for one id never interleave into a mixed
//! record). They are not asked to make a `get` followed by a `save` atomic.
//!
//! List results are ordered by `created_at`, then by `id`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::{Device, DeviceDraft, DeviceId, DeviceState, Timestamp};
use parking_lot::RwLock;
use thiserror::Error;

/// Failures reported by a device store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not complete the call (I/O, driver, pool).
    #[error("device store backend failure: {0}")]
    Backend(String),

    /// A persisted record could not be decoded into a [`Device`].
    #[error("stored device {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Durable keyed storage of device records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Fetch one device, or `None` if no record exists for `id`.
    async fn get(&self, id: DeviceId) -> Result<Option<Device>, StoreError>;

    /// Every stored device.
    async fn get_all(&self) -> Result<Vec<Device>, StoreError>;

    /// Devices whose brand equals `brand` exactly.
    async fn get_by_brand(&self, brand: &str) -> Result<Vec<Device>, StoreError>;

    /// Devices in the given state.
    async fn get_by_state(&self, state: DeviceState) -> Result<Vec<Device>, StoreError>;

    /// Devices matching both the brand and the state.
    async fn get_by_brand_and_state(
        &self,
        brand: &str,
        state: DeviceState,
    ) -> Result<Vec<Device>, StoreError>;

    /// Persist a new device, assigning its `id` and `created_at`.
    async fn insert(&self, draft: DeviceDraft) -> Result<Device, StoreError>;

    /// Insert or overwrite the record for `device.id`.
    ///
    /// `created_at` of an existing record is never changed.
    async fn save(&self, device: Device) -> Result<Device, StoreError>;

    /// Remove the record for `device.id`. Removing an absent record is not an error.
    async fn delete(&self, device: &Device) -> Result<(), StoreError>;
}

// ─── In-Memory Store ─────────────────────────────────────────────────

/// Thread-safe, cloneable in-memory device store.
///
/// Every primitive takes the lock for its own duration only and never across
/// an `.await`. `parking_lot::RwLock` does not poison, so a panicking writer
/// cannot wedge the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeviceStore {
    data: Arc<RwLock<HashMap<DeviceId, Device>>>,
}

impl InMemoryDeviceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored devices.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_where(&self, keep: impl Fn(&Device) -> bool) -> Vec<Device> {
        let mut devices: Vec<Device> = self
            .data
            .read()
            .values()
            .filter(|d| keep(d))
            .cloned()
            .collect();
        devices.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        devices
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get(&self, id: DeviceId) -> Result<Option<Device>, StoreError> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Device>, StoreError> {
        Ok(self.collect_where(|_| true))
    }

    async fn get_by_brand(&self, brand: &str) -> Result<Vec<Device>, StoreError> {
        Ok(self.collect_where(|d| d.brand == brand))
    }

    async fn get_by_state(&self, state: DeviceState) -> Result<Vec<Device>, StoreError> {
        Ok(self.collect_where(|d| d.state == state))
    }

    async fn get_by_brand_and_state(
        &self,
        brand: &str,
        state: DeviceState,
    ) -> Result<Vec<Device>, StoreError> {
        Ok(self.collect_where(|d| d.brand == brand && d.state == state))
    }

    async fn insert(&self, draft: DeviceDraft) -> Result<Device, StoreError> {
        let device = draft.into_device(DeviceId::new(), Timestamp::now());
        self.data.write().insert(device.id, device.clone());
        Ok(device)
    }

    async fn save(&self, device: Device) -> Result<Device, StoreError> {
        let mut guard = self.data.write();
        let stored = match guard.get_mut(&device.id) {
            Some(existing) => {
                existing.name = device.name;
                existing.brand = device.brand;
                existing.state = device.state;
                existing.clone()
            }
            None => {
                guard.insert(device.id, device.clone());
                device
            }
        };
        Ok(stored)
    }

    async fn delete(&self, device: &Device) -> Result<(), StoreError> {
        self.data.write().remove(&device.id);
        Ok(())
    }
}
