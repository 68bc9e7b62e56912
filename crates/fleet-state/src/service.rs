//! # Device Lifecycle Service
//!
//! Create, read, filter, update and delete devices. Every rule about what
//! may change lives here or in [`crate::guard`]; the store is only asked to
//! persist what the service has already decided.
//!
//! Each operation performs at most one store read followed by at most one
//! store write. Requests that can be rejected without looking at stored data
//! (unknown state text, incomplete full update) are rejected before the store
//! is touched. Guard violations are raised after the read and before any write.

use std::sync::Arc;

use fleet_core::{Device, DeviceDraft, DeviceId, DeviceState};
use tracing::{debug, error, info, warn};

use crate::error::LifecycleError;
use crate::guard::{check_deletion, check_identity_change, IdentityLocked};
use crate::store::{DeviceStore, StoreError};

/// Input for [`DeviceLifecycleService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub name: String,
    pub brand: String,
    /// Defaults to [`DeviceState::Available`] when absent.
    pub state: Option<DeviceState>,
}

/// Requested field values for an update. Absent fields are `None`.
///
/// A full update requires every field; a partial update applies only the
/// ones present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

impl DeviceChanges {
    /// Names of the fields that are absent, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.brand.is_none() {
            missing.push("brand");
        }
        if self.state.is_none() {
            missing.push("state");
        }
        missing
    }

    fn apply_to(self, device: &mut Device) {
        if let Some(name) = self.name {
            device.name = name;
        }
        if let Some(brand) = self.brand {
            device.brand = brand;
        }
        if let Some(state) = self.state {
            device.state = state;
        }
    }
}

/// Owns the device lifecycle rules.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct DeviceLifecycleService {
    store: Arc<dyn DeviceStore>,
}

impl DeviceLifecycleService {
    pub fn new(store: Arc<dyn DeviceStore>) -> Self {
        Self { store }
    }

    // ─── Reads ───────────────────────────────────────────────────────

    /// Create a device. The store assigns its id and creation time.
    pub async fn create(&self, new: NewDevice) -> Result<Device, LifecycleError> {
        debug!(name = %new.name, brand = %new.brand, "creating device");

        let draft = DeviceDraft {
            name: new.name,
            brand: new.brand,
            state: new.state.unwrap_or_default(),
        };
        let device = self
            .store
            .insert(draft)
            .await
            .map_err(store_failure("create"))?;

        info!(device_id = %device.id, state = %device.state, "device created");
        Ok(device)
    }

    /// Fetch one device.
    pub async fn get_by_id(&self, id: DeviceId) -> Result<Device, LifecycleError> {
        debug!(device_id = %id, "fetching device");
        self.load(id).await
    }

    /// Every device, in store order.
    pub async fn get_all(&self) -> Result<Vec<Device>, LifecycleError> {
        debug!("listing devices");
        self.store
            .get_all()
            .await
            .map_err(store_failure("get_all"))
    }

    /// Devices whose brand matches exactly.
    pub async fn get_by_brand(&self, brand: &str) -> Result<Vec<Device>, LifecycleError> {
        debug!(brand, "listing devices by brand");
        self.store
            .get_by_brand(brand)
            .await
            .map_err(store_failure("get_by_brand"))
    }

    /// Devices in the state named by `state_text` (trimmed, case-insensitive).
    pub async fn get_by_state(&self, state_text: &str) -> Result<Vec<Device>, LifecycleError> {
        let state = DeviceState::parse_normalized(state_text)?;
        debug!(%state, "listing devices by state");
        self.store
            .get_by_state(state)
            .await
            .map_err(store_failure("get_by_state"))
    }

    /// Devices matching both the brand and the normalized state.
    pub async fn get_by_brand_and_state(
        &self,
        brand: &str,
        state_text: &str,
    ) -> Result<Vec<Device>, LifecycleError> {
        let state = DeviceState::parse_normalized(state_text)?;
        debug!(brand, %state, "listing devices by brand and state");
        self.store
            .get_by_brand_and_state(brand, state)
            .await
            .map_err(store_failure("get_by_brand_and_state"))
    }

    // ─── Mutations ───────────────────────────────────────────────────

    /// Replace name, brand and state. All three must be present.
    pub async fn update(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> Result<Device, LifecycleError> {
        let missing = changes.missing_fields();
        if !missing.is_empty() {
            warn!(device_id = %id, ?missing, "full update rejected: fields missing");
            return Err(LifecycleError::ValidationRequired { missing });
        }

        let mut device = self.load(id).await?;
        self.guard_identity(&device, &changes)?;
        changes.apply_to(&mut device);

        let saved = self
            .store
            .save(device)
            .await
            .map_err(store_failure("update"))?;
        info!(device_id = %saved.id, state = %saved.state, "device updated");
        Ok(saved)
    }

    /// Apply only the fields present in `changes`.
    pub async fn partial_update(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> Result<Device, LifecycleError> {
        let mut device = self.load(id).await?;
        self.guard_identity(&device, &changes)?;
        changes.apply_to(&mut device);

        let saved = self
            .store
            .save(device)
            .await
            .map_err(store_failure("partial_update"))?;
        info!(device_id = %saved.id, state = %saved.state, "device partially updated");
        Ok(saved)
    }

    /// Remove a device that is not in use.
    pub async fn delete(&self, id: DeviceId) -> Result<(), LifecycleError> {
        let device = self.load(id).await?;
        check_deletion(&device).map_err(|_| {
            warn!(device_id = %id, "deletion rejected: device in use");
            LifecycleError::DeletionConflict { id }
        })?;

        self.store
            .delete(&device)
            .await
            .map_err(store_failure("delete"))?;
        info!(device_id = %id, "device deleted");
        Ok(())
    }

    // ─── Helpers ─────────────────────────────────────────────────────

    async fn load(&self, id: DeviceId) -> Result<Device, LifecycleError> {
        self.store
            .get(id)
            .await
            .map_err(store_failure("get"))?
            .ok_or(LifecycleError::NotFound { id })
    }

    fn guard_identity(
        &self,
        current: &Device,
        changes: &DeviceChanges,
    ) -> Result<(), LifecycleError> {
        check_identity_change(current, changes).map_err(|IdentityLocked { field }| {
            warn!(device_id = %current.id, %field, "update rejected: device in use");
            LifecycleError::UpdateConflict {
                id: current.id,
                field,
            }
        })
    }
}

fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> LifecycleError {
    move |err| {
        error!(operation, error = %err, "device store call failed");
        LifecycleError::Store(err)
    }
}
