//! Errors returned by [`DeviceLifecycleService`](crate::DeviceLifecycleService).

use fleet_core::{DeviceId, ValidationError};
use thiserror::Error;

use crate::guard::GuardedField;
use crate::store::StoreError;

/// Every way a lifecycle operation can fail.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// No device exists for the given id.
    #[error("Device not found with id: {id}")]
    NotFound { id: DeviceId },

    /// State text did not normalize to a known state.
    #[error(transparent)]
    InvalidState(#[from] ValidationError),

    /// A full update omitted one or more required fields.
    #[error("PUT request requires 'name', 'brand', and 'state' fields to be present.")]
    ValidationRequired { missing: Vec<&'static str> },

    /// Attempted to change the name or brand of an in-use device.
    #[error("Cannot update '{field}' for device {id} because its state is IN_USE.")]
    UpdateConflict { id: DeviceId, field: GuardedField },

    /// Attempted to delete an in-use device.
    #[error("Cannot delete device with ID {id} because its state is IN_USE.")]
    DeletionConflict { id: DeviceId },

    /// The device store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn fixed_id() -> DeviceId {
        DeviceId::from_uuid(Uuid::nil())
    }

    #[test]
    fn not_found_message_names_the_id() {
        let err = LifecycleError::NotFound { id: fixed_id() };
        assert_eq!(
            err.to_string(),
            "Device not found with id: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn update_conflict_message_names_field_and_id() {
        let err = LifecycleError::UpdateConflict {
            id: fixed_id(),
            field: GuardedField::Brand,
        };
        assert_eq!(
            err.to_string(),
            "Cannot update 'brand' for device 00000000-0000-0000-0000-000000000000 because its state is IN_USE."
        );
    }

    #[test]
    fn deletion_conflict_message() {
        let err = LifecycleError::DeletionConflict { id: fixed_id() };
        assert!(err.to_string().starts_with("Cannot delete device with ID 0000"));
    }

    #[test]
    fn invalid_state_is_transparent() {
        let err: LifecycleError = ValidationError::InvalidState {
            value: "BROKEN".to_string(),
        }
        .into();
        assert!(err.to_string().contains("\"BROKEN\""));
    }

    #[test]
    fn store_error_converts() {
        let err: LifecycleError = StoreError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, LifecycleError::Store(StoreError::Backend(_))));
    }
}
