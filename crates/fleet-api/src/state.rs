//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor, and the environment-driven configuration
//! the binary builds it from.
//!
//! AppState holds:
//! - **Lifecycle service** over whichever [`DeviceStore`] was selected
//!   (Postgres when `DATABASE_URL` is set, in-memory otherwise)
//! - **Database pool**, used by the readiness probe
//! - **Prometheus handle**, rendered at `/metrics` when installed

use std::sync::Arc;

use fleet_state::{DeviceLifecycleService, DeviceStore, InMemoryDeviceStore};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use thiserror::Error;

// ─── Configuration ───────────────────────────────────────────────────

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled Postgres connections.
    pub db_max_connections: u32,
    /// Whether the Prometheus recorder is installed and `/metrics` mounted.
    pub metrics_enabled: bool,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("metrics_enabled", &self.metrics_enabled)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            db_max_connections: 10,
            metrics_enabled: true,
            log_format: LogFormat::Text,
        }
    }
}

/// A configuration variable held a value that could not be used.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    /// Build configuration from process environment variables.
    ///
    /// | Variable                   | Default |
    /// |----------------------------|---------|
    /// | `FLEET_PORT` / `PORT`      | 8080    |
    /// | `DATABASE_URL`             | unset (in-memory) |
    /// | `FLEET_DB_MAX_CONNECTIONS` | 10      |
    /// | `FLEET_METRICS_ENABLED`    | true    |
    /// | `FLEET_LOG_FORMAT`         | text    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port_var = get("FLEET_PORT")
            .map(|v| ("FLEET_PORT", v))
            .or_else(|| get("PORT").map(|v| ("PORT", v)));
        let port = match port_var {
            Some((var, value)) => parse_number(var, &value)?,
            None => defaults.port,
        };

        let db_max_connections = match get("FLEET_DB_MAX_CONNECTIONS") {
            Some(value) => {
                let n: u32 = parse_number("FLEET_DB_MAX_CONNECTIONS", &value)?;
                if n == 0 {
                    return Err(ConfigError::InvalidValue {
                        var: "FLEET_DB_MAX_CONNECTIONS",
                        value,
                        reason: "must be at least 1".to_string(),
                    });
                }
                n
            }
            None => defaults.db_max_connections,
        };

        let metrics_enabled = match get("FLEET_METRICS_ENABLED") {
            Some(value) => parse_flag("FLEET_METRICS_ENABLED", &value)?,
            None => defaults.metrics_enabled,
        };

        let log_format = match get("FLEET_LOG_FORMAT") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" | "pretty" => LogFormat::Text,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "FLEET_LOG_FORMAT",
                        value,
                        reason: "expected \"json\" or \"text\"".to_string(),
                    })
                }
            },
            None => defaults.log_format,
        };

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            db_max_connections,
            metrics_enabled,
            log_format,
        })
    }
}

fn parse_number<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

// ─── Application State ───────────────────────────────────────────────

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub devices: DeviceLifecycleService,
    /// Postgres pool when persistence is enabled.
    pub db_pool: Option<PgPool>,
    /// Renders the Prometheus exposition when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// In-memory state without a database. Used by tests and local runs.
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryDeviceStore::new()), None)
    }

    /// State over an explicit store and optional pool.
    pub fn with_store(store: Arc<dyn DeviceStore>, db_pool: Option<PgPool>) -> Self {
        Self {
            devices: DeviceLifecycleService::new(store),
            db_pool,
            metrics: None,
        }
    }

    /// Attach an installed Prometheus recorder handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
