//! # File Serving
//!
//! Mounts the unique and legacy roots with `ServeDir` at their namespace
//! prefixes, behind the immutable-serving filter. Text responses are
//! gzip-compressed when the client accepts it; compression announces
//! `Vary: Accept-Encoding`, which the outermost layer strips from every file
//! response.

use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;

use crate::middleware::immutable::immutable_middleware;
use crate::middleware::strip_vary::strip_vary;
use crate::state::AppState;

/// Assemble the file-serving router.
pub fn router(state: &AppState) -> Router<AppState> {
    let config = &state.config;
    Router::new()
        .nest_service(
            config.unique_namespace_prefix.mount_path(),
            ServeDir::new(&config.unique_root_dir),
        )
        .nest_service(
            config.legacy_namespace_prefix.mount_path(),
            ServeDir::new(&config.legacy_root_dir),
        )
        .layer(from_fn_with_state(state.clone(), immutable_middleware))
        .layer(CompressionLayer::new())
        .layer(from_fn(strip_vary))
}
