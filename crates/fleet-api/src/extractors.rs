//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs and helpers to extract
//! and validate JSON bodies and path identifiers in handlers.

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use fleet_core::DeviceId;

use crate::error::AppError;

/// Per-field validation problems, keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Trait for request types that check their shape beyond what serde
/// deserialization checks.
pub trait Validate {
    /// Collect every field problem. An empty map means the request is valid.
    fn validate(&self) -> FieldErrors;
}

/// Record `message` for `field` when `value` is present but blank.
pub fn reject_blank(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&str>,
    message: &str,
) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        errors.insert(field, message.to_string());
    }
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    let errors = value.validate();
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Extract a device id from the path, mapping malformed ids to [`AppError::BadRequest`].
pub fn extract_device_id(
    result: Result<Path<String>, PathRejection>,
) -> Result<DeviceId, AppError> {
    let Path(raw) = result.map_err(|err| AppError::BadRequest(err.body_text()))?;
    Ok(raw.parse::<DeviceId>()?)
}
