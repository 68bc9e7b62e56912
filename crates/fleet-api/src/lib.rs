//! # fleet-api: Axum API Service for Device Fleet Management
//!
//! Thin request-handling layer over `fleet-state`. Handlers decode and
//! shape-check requests, invoke the lifecycle service, and translate its
//! errors into HTTP responses.
//!
//! ## API Surface
//!
//! | Path                 | Module                  |
//! |----------------------|-------------------------|
//! | `/devices`, `/devices/{id}` | [`routes::devices`] |
//! | `/openapi.json`      | [`openapi`]             |
//! | `/health/*`          | this module             |
//! | `/metrics`           | this module (when a recorder is installed) |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and `/metrics` sit outside the metrics middleware so that
/// scrapes and probes do not count as API traffic.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::devices::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .with_state(state.clone());

    let mut ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));
    if state.metrics.is_some() {
        ops = ops.route("/metrics", get(prometheus_metrics));
    }

    Router::new().merge(ops.with_state(state)).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: pings Postgres when a pool is configured.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    (StatusCode::OK, "ready").into_response()
}

/// GET /metrics: Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
