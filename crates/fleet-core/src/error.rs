//! # Validation Errors
//!
//! Structured errors raised when raw input cannot be turned into a domain
//! primitive. Each variant carries the rejected input so that the caller can
//! be told exactly what was wrong.

use thiserror::Error;

/// Validation errors for domain primitive construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// State text does not normalize to one of the defined lifecycle states.
    #[error("invalid device state: \"{value}\" (valid values are: AVAILABLE, IN_USE, INACTIVE)")]
    InvalidState {
        /// The text as supplied, before normalization.
        value: String,
    },

    /// Device identifier is not a UUID.
    #[error("invalid device id: \"{value}\" (expected a UUID)")]
    InvalidDeviceId {
        /// The text that failed to parse.
        value: String,
    },

    /// Timestamp string is not valid UTC ISO 8601.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
