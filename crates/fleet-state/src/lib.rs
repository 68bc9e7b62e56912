//! # fleet-state: Device Lifecycle Service
//!
//! Owns every business rule of the fleet device service. Callers talk to
//! [`DeviceLifecycleService`]; the service talks to storage only through the
//! [`DeviceStore`] trait.
//!
//! ## Modules
//!
//! - **Guard** (`guard.rs`): the pure "cannot rewire an in-use device's
//!   identity" rule and the in-use deletion rule. Full and partial update
//!   both call the same check.
//!
//! - **Service** (`service.rs`): create, read, filter, full update, partial
//!   update and delete. Each operation is at most one store read followed by
//!   at most one store write.
//!
//! - **Store** (`store.rs`): the async storage contract plus
//!   [`InMemoryDeviceStore`].
//!
//! ## Concurrency
//!
//! The service holds no mutable state and takes no locks. A read-check-write
//! sequence is not atomic: two concurrent updates of the same device can both
//! pass the guard against the same snapshot, and the later write wins.

pub mod error;
pub mod guard;
pub mod service;
pub mod store;

pub use error::LifecycleError;
pub use guard::{check_deletion, check_identity_change, DeletionLocked, GuardedField, IdentityLocked};
pub use service::{DeviceChanges, DeviceLifecycleService, NewDevice};
pub use store::{DeviceStore, InMemoryDeviceStore, StoreError};
