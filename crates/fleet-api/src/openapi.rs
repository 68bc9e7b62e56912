//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the device API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fleet Device API",
        version = "0.1.0",
        description = "Register devices, track their lifecycle state, and guard in-use devices against identity changes and deletion.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::devices::create_device,
        crate::routes::devices::get_device,
        crate::routes::devices::list_devices,
        crate::routes::devices::update_device,
        crate::routes::devices::patch_device,
        crate::routes::devices::delete_device,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Device DTOs
        crate::routes::devices::CreateDeviceRequest,
        crate::routes::devices::DeviceUpdateRequest,
        crate::routes::devices::DeviceResponse,
    )),
    tags(
        (name = "devices", description = "Device Management API"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
