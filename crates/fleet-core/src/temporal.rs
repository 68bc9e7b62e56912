//! # Device Timestamps
//!
//! A device's `created_at` is stamped once by a store and never changes.
//! [`Timestamp`] keeps it in UTC at whole-second precision so that the
//! in-memory store (nanoseconds) and Postgres `TIMESTAMPTZ` (microseconds)
//! hand back exactly the value they were given.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC instant with sub-second precision discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap an existing instant, dropping its fractional seconds.
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self(instant.trunc_subsecs(0))
    }

    /// Parse RFC 3339 text in UTC `Z` form, e.g. `2026-03-01T08:15:00Z`.
    ///
    /// Numeric offsets are refused even when they are `+00:00`.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidTimestamp {
            value: text.to_string(),
            reason,
        };

        if !text.ends_with('Z') {
            return Err(invalid("expected a UTC time ending in 'Z'".to_string()));
        }
        let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| invalid(e.to_string()))?;
        Ok(Self::from_utc(parsed.with_timezone(&Utc)))
    }

    /// The wrapped instant.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}
