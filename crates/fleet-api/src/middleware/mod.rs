//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`metrics`]: request counters and latency histograms via the `metrics` facade.

pub mod metrics;
pub mod tracing_layer;
