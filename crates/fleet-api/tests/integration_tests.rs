//! # Integration Tests for fleet-api
//!
//! Drives the full router with the in-memory store: health probes, device
//! CRUD, the in-use guard over HTTP, filtering, error bodies, and OpenAPI
//! generation.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_api::state::AppState;

/// Helper: build the test app over an empty in-memory store.
fn test_app() -> axum::Router {
    fleet_api::app(AppState::new())
}

/// Helper: send a request with an optional JSON body.
async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn create(app: &axum::Router, body: Value) -> Value {
    let (status, device) = send(app, Method::POST, "/devices", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {device}");
    device
}

fn device_uri(device: &Value) -> String {
    format!("/devices/{}", device["id"].as_str().unwrap())
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health/liveness", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn test_readiness_probe_without_database() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health/readiness", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ready".into()));
}

#[tokio::test]
async fn test_metrics_not_mounted_without_recorder() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Create & Read ------------------------------------------------------------

#[tokio::test]
async fn test_create_defaults_state_and_round_trips() {
    let app = test_app();
    let created = create(&app, json!({"name": "Phone", "brand": "BrandX"})).await;
    assert_eq!(created["state"], "AVAILABLE");
    assert!(created["createdAt"].is_string());

    let (status, fetched) = send(&app, Method::GET, &device_uri(&created), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_blank_name_is_validation_error() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/devices",
        Some(json!({"name": " ", "brand": "BrandX"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["name"], "Name is required");
    assert!(body["error"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_create_unknown_state_is_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/devices",
        Some(json!({"name": "Phone", "brand": "BrandX", "state": "BROKEN"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_unknown_device_is_404() {
    let app = test_app();
    let uri = format!("/devices/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Device not found with id: "));
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/devices/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// -- Filtering ----------------------------------------------------------------

#[tokio::test]
async fn test_list_filters_by_brand_and_state() {
    let app = test_app();
    create(&app, json!({"name": "A", "brand": "BrandX"})).await;
    create(&app, json!({"name": "B", "brand": "BrandX", "state": "IN_USE"})).await;
    create(&app, json!({"name": "C", "brand": "BrandY", "state": "IN_USE"})).await;

    let (_, all) = send(&app, Method::GET, "/devices", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, by_brand) = send(&app, Method::GET, "/devices?brand=BrandX", None).await;
    assert_eq!(by_brand.as_array().unwrap().len(), 2);

    let (_, by_state) = send(&app, Method::GET, "/devices?state=in_use", None).await;
    assert_eq!(by_state.as_array().unwrap().len(), 2);

    let (_, both) = send(&app, Method::GET, "/devices?brand=BrandX&state=In_Use", None).await;
    let both = both.as_array().unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["name"], "B");
}

#[tokio::test]
async fn test_list_empty_filters_are_ignored() {
    let app = test_app();
    create(&app, json!({"name": "A", "brand": "BrandX"})).await;
    let (status, all) = send(&app, Method::GET, "/devices?brand=&state=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_unknown_state_is_invalid_state() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/devices?state=INVALID_STATE", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

// -- Full Update --------------------------------------------------------------

#[tokio::test]
async fn test_put_in_use_brand_change_conflicts() {
    let app = test_app();
    let device = create(
        &app,
        json!({"name": "Tablet 2", "brand": "BrandY", "state": "IN_USE"}),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &device_uri(&device),
        Some(json!({"name": "Tablet 2", "brand": "OtherBrand", "state": "IN_USE"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Cannot update 'brand' for device"));
}

#[tokio::test]
async fn test_put_in_use_same_identity_new_state_succeeds() {
    let app = test_app();
    let device = create(
        &app,
        json!({"name": "Tablet 2", "brand": "BrandY", "state": "IN_USE"}),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &device_uri(&device),
        Some(json!({"name": "Tablet 2", "brand": "BrandY", "state": "AVAILABLE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AVAILABLE");
    assert_eq!(body["createdAt"], device["createdAt"]);
}

#[tokio::test]
async fn test_put_missing_state_is_conflict_with_missing_fields() {
    let app = test_app();
    let device = create(&app, json!({"name": "Phone", "brand": "BrandX"})).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &device_uri(&device),
        Some(json!({"name": "Phone", "brand": "BrandX"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"]["message"],
        "PUT request requires 'name', 'brand', and 'state' fields to be present."
    );
    assert_eq!(body["error"]["details"]["missing"], json!(["state"]));
}

// -- Partial Update -----------------------------------------------------------

#[tokio::test]
async fn test_patch_state_only_on_in_use_device() {
    let app = test_app();
    let device = create(
        &app,
        json!({"name": "Tablet 2", "brand": "BrandY", "state": "IN_USE"}),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &device_uri(&device),
        Some(json!({"state": "AVAILABLE"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AVAILABLE");
    assert_eq!(body["name"], "Tablet 2");
    assert_eq!(body["brand"], "BrandY");
}

#[tokio::test]
async fn test_patch_brand_on_in_use_device_conflicts() {
    let app = test_app();
    let device = create(
        &app,
        json!({"name": "Tablet 2", "brand": "BrandY", "state": "IN_USE"}),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        &device_uri(&device),
        Some(json!({"brand": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_malformed_json_is_bad_request() {
    let app = test_app();
    let device = create(&app, json!({"name": "Phone", "brand": "BrandX"})).await;

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(device_uri(&device))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Delete -------------------------------------------------------------------

#[tokio::test]
async fn test_delete_in_use_conflicts_and_device_survives() {
    let app = test_app();
    let device = create(
        &app,
        json!({"name": "Tablet 2", "brand": "BrandY", "state": "IN_USE"}),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, &device_uri(&device), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Cannot delete device with ID"));

    let (status, _) = send(&app, Method::GET, &device_uri(&device), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_inactive_device_returns_204() {
    let app = test_app();
    let device = create(
        &app,
        json!({"name": "Laptop", "brand": "BrandZ", "state": "INACTIVE"}),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, &device_uri(&device), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &device_uri(&device), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = test_app();
    let (status, spec) = send(&app, Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/devices"].is_object());
    assert!(spec["paths"]["/devices/{id}"]["patch"].is_object());
}
