//! # dedupe-api — File Serving for the Dedupe Stack
//!
//! Serves content-addressed files so that clients cache them forever, and
//! keeps links to original file names working after content has been
//! renamed by hash.
//!
//! ## API Surface
//!
//! | Path                     | Module              | Purpose                          |
//! |--------------------------|---------------------|----------------------------------|
//! | `{unique prefix}*`       | [`routes::serve`]   | Content-hashed files, immutable  |
//! | `{legacy prefix}*`       | [`routes::serve`]   | Original names, 302 on rename    |
//! | `/v1/files/*`            | [`routes::files`]   | Upload through dedup storage     |
//! | `/v1/originals/*`        | [`routes::files`]   | Original name of a stored file   |
//! | `/health/*`, `/metrics`  | this module         | Probes and counters              |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → [file routes: StripVary → ImmutableServing] → Handler
//! ```

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::{Json, Router};

use crate::middleware::metrics::MetricsSnapshot;

pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let api = Router::new()
        .merge(routes::serve::router(&state))
        .merge(routes::files::router())
        .route("/metrics", get(metrics_snapshot))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics — request counters as JSON.
async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
