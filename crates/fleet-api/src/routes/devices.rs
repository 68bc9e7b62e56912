//! # Device API
//!
//! Device CRUD over HTTP. Handlers decode and shape-check requests, call the
//! lifecycle service, and map its results onto status codes. They make no
//! lifecycle decisions of their own.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use fleet_core::{Device, DeviceState};
use fleet_state::{DeviceChanges, LifecycleError, NewDevice};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{
    extract_device_id, extract_validated_json, reject_blank, FieldErrors, Validate,
};
use crate::middleware::metrics::record_mutation;
use crate::state::AppState;

// ─── DTOs ────────────────────────────────────────────────────────────

/// Request to register a new device.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    /// Defaults to `AVAILABLE`.
    #[schema(value_type = Option<String>, example = "AVAILABLE")]
    pub state: Option<DeviceState>,
}

impl Validate for CreateDeviceRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.name.as_deref().map_or(true, |v| v.trim().is_empty()) {
            errors.insert("name", "Name is required".to_string());
        }
        if self.brand.as_deref().map_or(true, |v| v.trim().is_empty()) {
            errors.insert("brand", "Brand is required".to_string());
        }
        errors
    }
}

/// Request body for both full (PUT) and partial (PATCH) updates.
///
/// PUT requires every field; PATCH applies only the fields present.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeviceUpdateRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    #[schema(value_type = Option<String>, example = "IN_USE")]
    pub state: Option<DeviceState>,
}

impl Validate for DeviceUpdateRequest {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        reject_blank(&mut errors, "name", self.name.as_deref(), "Name must not be blank");
        reject_blank(&mut errors, "brand", self.brand.as_deref(), "Brand must not be blank");
        errors
    }
}

impl From<DeviceUpdateRequest> for DeviceChanges {
    fn from(req: DeviceUpdateRequest) -> Self {
        DeviceChanges {
            name: req.name,
            brand: req.brand,
            state: req.state,
        }
    }
}

/// Optional filters for listing devices. Empty values count as absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDevicesQuery {
    /// Exact brand match.
    pub brand: Option<String>,
    /// State name, case-insensitive.
    pub state: Option<String>,
}

/// A device as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    #[schema(value_type = String, example = "AVAILABLE")]
    pub state: DeviceState,
    pub created_at: DateTime<Utc>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: *device.id.as_uuid(),
            name: device.name,
            brand: device.brand,
            state: device.state,
            created_at: *device.created_at.as_datetime(),
        }
    }
}

// ─── Router ──────────────────────────────────────────────────────────

/// Build the devices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices).post(create_device))
        .route(
            "/devices/{id}",
            get(get_device)
                .put(update_device)
                .patch(patch_device)
                .delete(delete_device),
        )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn observe<T>(operation: &'static str, result: Result<T, LifecycleError>) -> Result<T, AppError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(LifecycleError::NotFound { .. }) => "not_found",
        Err(LifecycleError::Store(_)) => "error",
        Err(_) => "rejected",
    };
    record_mutation(operation, outcome);
    result.map_err(AppError::from)
}

// ─── Handlers ────────────────────────────────────────────────────────

/// POST /devices: Create a device.
#[utoipa::path(
    post,
    path = "/devices",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = DeviceResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
    ),
    tag = "devices"
)]
pub async fn create_device(
    State(state): State<AppState>,
    body: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let new = NewDevice {
        name: req.name.unwrap_or_default(),
        brand: req.brand.unwrap_or_default(),
        state: req.state,
    };

    let device = observe("create", state.devices.create(new).await)?;
    Ok((StatusCode::CREATED, Json(device.into())))
}

/// GET /devices/{id}: Fetch one device.
#[utoipa::path(
    get,
    path = "/devices/{id}",
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device found", body = DeviceResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "devices"
)]
pub async fn get_device(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeviceResponse>, AppError> {
    let id = extract_device_id(id)?;
    let device = state.devices.get_by_id(id).await?;
    Ok(Json(device.into()))
}

/// GET /devices: List devices, optionally filtered by brand and/or state.
#[utoipa::path(
    get,
    path = "/devices",
    params(ListDevicesQuery),
    responses(
        (status = 200, description = "Devices", body = Vec<DeviceResponse>),
        (status = 400, description = "Unknown state", body = crate::error::ErrorBody),
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<Vec<DeviceResponse>>, AppError> {
    let svc = &state.devices;
    let devices = match (non_empty(query.brand), non_empty(query.state)) {
        (Some(brand), Some(st)) => svc.get_by_brand_and_state(&brand, &st).await?,
        (Some(brand), None) => svc.get_by_brand(&brand).await?,
        (None, Some(st)) => svc.get_by_state(&st).await?,
        (None, None) => svc.get_all().await?,
    };
    Ok(Json(devices.into_iter().map(DeviceResponse::from).collect()))
}

/// PUT /devices/{id}: Replace name, brand and state.
#[utoipa::path(
    put,
    path = "/devices/{id}",
    params(("id" = Uuid, Path, description = "Device ID")),
    request_body = DeviceUpdateRequest,
    responses(
        (status = 200, description = "Device updated", body = DeviceResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Device in use or fields missing", body = crate::error::ErrorBody),
    ),
    tag = "devices"
)]
pub async fn update_device(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<DeviceUpdateRequest>, JsonRejection>,
) -> Result<Json<DeviceResponse>, AppError> {
    let id = extract_device_id(id)?;
    let req = extract_validated_json(body)?;
    let device = observe("update", state.devices.update(id, req.into()).await)?;
    Ok(Json(device.into()))
}

/// PATCH /devices/{id}: Update only the fields supplied.
#[utoipa::path(
    patch,
    path = "/devices/{id}",
    params(("id" = Uuid, Path, description = "Device ID")),
    request_body = DeviceUpdateRequest,
    responses(
        (status = 200, description = "Device updated", body = DeviceResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Device in use", body = crate::error::ErrorBody),
    ),
    tag = "devices"
)]
pub async fn patch_device(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<DeviceUpdateRequest>, JsonRejection>,
) -> Result<Json<DeviceResponse>, AppError> {
    let id = extract_device_id(id)?;
    let req = extract_validated_json(body)?;
    let device = observe(
        "partial_update",
        state.devices.partial_update(id, req.into()).await,
    )?;
    Ok(Json(device.into()))
}

/// DELETE /devices/{id}: Remove a device that is not in use.
#[utoipa::path(
    delete,
    path = "/devices/{id}",
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Device in use", body = crate::error::ErrorBody),
    ),
    tag = "devices"
)]
pub async fn delete_device(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_device_id(id)?;
    observe("delete", state.devices.delete(id).await)?;
    Ok(StatusCode::NO_CONTENT)
}
