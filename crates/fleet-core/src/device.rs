//! # Device Records and Lifecycle State
//!
//! ## States
//!
//! ```text
//! AVAILABLE ◀──▶ IN_USE ◀──▶ INACTIVE
//!     ▲                          │
//!     └──────────────────────────┘
//! ```
//!
//! Any state may move to any other; what the lifecycle restricts is which
//! *other* fields may change while a device is `IN_USE` (see `fleet-state`).
//!
//! ## Normalization
//!
//! Free-form state text from query strings is trimmed and upper-cased before
//! it is matched against the wire names. [`DeviceState::parse_normalized`] is
//! the only place that happens.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::DeviceId;
use crate::temporal::Timestamp;

// ─── Device State ────────────────────────────────────────────────────

/// The lifecycle state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    /// Ready to be handed out.
    #[default]
    Available,
    /// Currently held by someone. Name and brand are locked.
    InUse,
    /// Taken out of circulation.
    Inactive,
}

impl DeviceState {
    /// Every state, in declaration order.
    pub const ALL: [DeviceState; 3] = [Self::Available, Self::InUse, Self::Inactive];

    /// Return the wire representation of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InUse => "IN_USE",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Whether the device is currently in use.
    pub fn is_in_use(&self) -> bool {
        matches!(self, Self::InUse)
    }

    /// Parse free-form state text.
    ///
    /// Leading/trailing whitespace is trimmed and the text is upper-cased
    /// before matching, so `" in_use "` and `"IN_USE"` are the same state.
    /// Errors carry the text exactly as supplied.
    pub fn parse_normalized(text: &str) -> Result<Self, ValidationError> {
        let normalized = text.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidState {
                value: text.to_string(),
            })
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_normalized(s)
    }
}

// ─── Device ──────────────────────────────────────────────────────────

/// A persisted device.
///
/// `id` and `created_at` are assigned by a store on first insert and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Store-assigned identifier.
    pub id: DeviceId,
    /// Human-readable device name.
    pub name: String,
    /// Manufacturer brand.
    pub brand: String,
    /// Current lifecycle state.
    pub state: DeviceState,
    /// When the device was first persisted.
    pub created_at: Timestamp,
}

impl Device {
    /// Whether the device is currently in use.
    pub fn is_in_use(&self) -> bool {
        self.state.is_in_use()
    }
}

/// A device that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDraft {
    /// Human-readable device name.
    pub name: String,
    /// Manufacturer brand.
    pub brand: String,
    /// Initial lifecycle state.
    pub state: DeviceState,
}

impl DeviceDraft {
    /// Promote the draft into a persisted record with the given identity.
    ///
    /// Intended for store implementations; the service never calls this.
    pub fn into_device(self, id: DeviceId, created_at: Timestamp) -> Device {
        Device {
            id,
            name: self.name,
            brand: self.brand,
            state: self.state,
            created_at,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
