//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps lifecycle errors from fleet-state to HTTP status codes and returns
//! JSON bodies carrying a code, a message, a timestamp and optional details.
//! Internal error details are logged, never returned.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_core::Timestamp;
use fleet_state::LifecycleError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// When the error was produced (ISO8601, UTC).
    pub timestamp: String,
    /// Per-field problems or other structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Request fields failed shape checks (400). Keyed by field name.
    #[error("Input validation failed for fields.")]
    Validation(BTreeMap<&'static str, String>),

    /// State text is not a known device state (400).
    #[error("{0}")]
    InvalidState(String),

    /// Request body or path could not be parsed (400).
    #[error("{0}")]
    BadRequest(String),

    /// Conflict with the current device state (409).
    #[error("{0}")]
    Conflict(String),

    /// A full replacement omitted required fields (409).
    #[error("{message}")]
    IncompleteReplacement {
        message: String,
        missing: Vec<&'static str>,
    },

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) | Self::IncompleteReplacement { .. } => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(fields) => Some(serde_json::json!(fields)),
            Self::IncompleteReplacement { missing, .. } => {
                Some(serde_json::json!({ "missing": missing }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An unexpected error occurred. Please check server logs.".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                timestamp: Timestamp::now().to_iso8601(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert lifecycle errors to API errors.
impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound { .. } => Self::NotFound(err.to_string()),
            LifecycleError::InvalidState(_) => Self::InvalidState(err.to_string()),
            LifecycleError::ValidationRequired { ref missing } => Self::IncompleteReplacement {
                missing: missing.clone(),
                message: err.to_string(),
            },
            LifecycleError::UpdateConflict { .. } | LifecycleError::DeletionConflict { .. } => {
                Self::Conflict(err.to_string())
            }
            LifecycleError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}

/// Convert malformed identifiers to API errors.
impl From<fleet_core::ValidationError> for AppError {
    fn from(err: fleet_core::ValidationError) -> Self {
        match err {
            fleet_core::ValidationError::InvalidState { .. } => Self::InvalidState(err.to_string()),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}
