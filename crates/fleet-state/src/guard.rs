//! # Lifecycle Guard
//!
//! A device that is `IN_USE` keeps its physical identity: its name and brand
//! cannot change until it leaves that state. Its state can always change.
//! An in-use device also cannot be deleted.
//!
//! Both checks are pure functions of the currently stored record and the
//! requested changes. Full update and partial update call the same
//! [`check_identity_change`]; the difference between them is only which
//! fields are present in [`DeviceChanges`].

use fleet_core::Device;

use crate::service::DeviceChanges;

/// The identity fields that are locked while a device is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedField {
    Name,
    Brand,
}

impl GuardedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Brand => "brand",
        }
    }
}

impl std::fmt::Display for GuardedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An update supplied a different value for a field locked while in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityLocked {
    pub field: GuardedField,
}

/// Deletion of an in-use device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionLocked;

/// Check whether `changes` may be applied to `current`.
///
/// Only fields present in `changes` are compared. Supplying the value that
/// is already stored is never a violation. `name` is checked before `brand`.
pub fn check_identity_change(
    current: &Device,
    changes: &DeviceChanges,
) -> Result<(), IdentityLocked> {
    if !current.is_in_use() {
        return Ok(());
    }

    if differs(changes.name.as_deref(), &current.name) {
        return Err(IdentityLocked {
            field: GuardedField::Name,
        });
    }
    if differs(changes.brand.as_deref(), &current.brand) {
        return Err(IdentityLocked {
            field: GuardedField::Brand,
        });
    }
    Ok(())
}

/// Check whether `current` may be deleted.
pub fn check_deletion(current: &Device) -> Result<(), DeletionLocked> {
    if current.is_in_use() {
        Err(DeletionLocked)
    } else {
        Ok(())
    }
}

fn differs(requested: Option<&str>, stored: &str) -> bool {
    requested.is_some_and(|value| value != stored)
}
