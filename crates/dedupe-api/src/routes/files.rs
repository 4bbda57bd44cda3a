//! # File API
//!
//! - `POST /v1/files/{*name}`     — Store the request body under a content-hashed name
//! - `GET  /v1/originals/{*name}` — Latest original name recorded for a stored file

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dedupe_store::StorageBackend;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the file API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/files/{*name}", post(upload))
        .route("/v1/originals/{*name}", get(original))
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of an upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredFile {
    /// Name the content is stored under, relative to the legacy root.
    pub name: String,
    /// Name the client asked for.
    pub original_name: String,
    /// Public URL of the stored file.
    pub url: String,
    /// `sha256:<hex>` digest of the content.
    pub digest: String,
    /// The content was already stored; nothing was written.
    pub deduplicated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OriginalName {
    pub name: String,
    pub original_name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredFile>), AppError> {
    let name = name.trim_start_matches('/').to_string();
    if name.is_empty() {
        return Err(AppError::Validation("file name must not be empty".into()));
    }

    let mut content = Cursor::new(body);
    let outcome = state.media.store(&name, &mut content).await?;

    let status = if outcome.deduplicated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(StoredFile {
            url: state.media.url(&outcome.name),
            name: outcome.name,
            original_name: name,
            digest: outcome.digest.to_string(),
            deduplicated: outcome.deduplicated,
        }),
    ))
}

async fn original(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<OriginalName>, AppError> {
    let name = name.trim_start_matches('/').to_string();
    let original_name = state.media.resolve_original(&name).await?;
    Ok(Json(OriginalName {
        name,
        original_name,
    }))
}
