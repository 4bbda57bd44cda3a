//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`metrics`]: request counters.
//! - [`immutable`]: cache headers and legacy-name redirects for file routes.
//! - [`strip_vary`]: drops `Vary` from file responses.

pub mod immutable;
pub mod metrics;
pub mod strip_vary;
pub mod tracing_layer;
