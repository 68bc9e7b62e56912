#![deny(missing_docs)]

//! # fleet-core: Foundational Types for the Fleet Device Service
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies, only `serde`,
//! `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`DeviceId`] is not a bare
//!    `Uuid`, and a [`Timestamp`] is always UTC with whole-second precision.
//!
//! 2. **Closed lifecycle state.** [`DeviceState`] has exactly three variants.
//!    Free-form state text only exists before [`DeviceState::parse_normalized`];
//!    past that boundary an invalid state is unrepresentable.
//!
//! 3. **Store-assigned identity.** A [`DeviceDraft`] carries only the caller's
//!    fields. Only a store turns it into a [`Device`] with an `id` and a
//!    `created_at`, so neither can be supplied by a caller.
//!
//! 4. **[`ValidationError`].** Structured errors with `thiserror`, no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod device;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use device::{Device, DeviceDraft, DeviceState};
pub use error::ValidationError;
pub use identity::DeviceId;
pub use temporal::Timestamp;
