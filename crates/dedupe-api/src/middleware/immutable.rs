//! # Immutable Serving
//!
//! Response filter sitting in front of the file-serving routers.
//!
//! - Unique namespace: content never changes under a given name, so
//!   successful responses are marked cacheable forever.
//! - Legacy namespace: a 404 for a name the ledger has seen is redirected to
//!   the content-hashed file it was last stored as. Unknown names keep their
//!   original 404.
//!
//! A ledger that cannot be reached during a redirect lookup is a 500, never
//! a 404: clients must not cache "gone" for a file that may exist.

use axum::extract::{OriginalUri, Request, State};
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dedupe_core::{DedupeConfig, NamespacePrefix};
use dedupe_store::{Ledger, StorageError};
use tracing::debug;

use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// `Cache-Control` value for content-addressed files (ten years).
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=315360000, immutable";

/// Serving decisions for the unique and legacy namespaces.
#[derive(Debug, Clone)]
pub struct ImmutableServing<L> {
    unique_prefix: NamespacePrefix,
    legacy_prefix: NamespacePrefix,
    ledger: L,
    metrics: ApiMetrics,
}

impl<L: Ledger> ImmutableServing<L> {
    pub fn new(config: &DedupeConfig, ledger: L, metrics: ApiMetrics) -> Self {
        Self {
            unique_prefix: config.unique_namespace_prefix.clone(),
            legacy_prefix: config.legacy_namespace_prefix.clone(),
            ledger,
            metrics,
        }
    }

    /// Decide the final response for a request to `path` given the response
    /// produced by the file server.
    pub async fn filter(&self, path: &str, mut response: Response) -> Result<Response, AppError> {
        if self.unique_prefix.contains(path) {
            let status = response.status();
            if status.is_success() || status == StatusCode::NOT_MODIFIED {
                response.headers_mut().insert(
                    CACHE_CONTROL,
                    HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
                );
                self.metrics.record_immutable();
            }
            return Ok(response);
        }

        if response.status() != StatusCode::NOT_FOUND {
            return Ok(response);
        }
        let Some(encoded) = self.legacy_prefix.strip(path) else {
            return Ok(response);
        };
        // Paths that are not valid UTF-8 once decoded cannot name a ledger entry.
        let Ok(original_name) = urlencoding::decode(encoded) else {
            return Ok(response);
        };

        let record = self
            .ledger
            .latest_by_original_name(&original_name)
            .await
            .map_err(StorageError::from)?;

        match record {
            Some(record) => {
                let location = self.legacy_prefix.join(&encode_path(&record.name));
                debug!(from = %path, to = %location, "redirecting legacy name");
                let value = HeaderValue::from_str(&location)
                    .map_err(|e| AppError::Internal(format!("bad redirect location: {e}")))?;
                self.metrics.record_redirect();
                Ok((StatusCode::FOUND, [(LOCATION, value)]).into_response())
            }
            None => Ok(response),
        }
    }
}

fn encode_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Axum middleware wrapping [`ImmutableServing::filter`].
///
/// The full request path is taken from [`OriginalUri`] so the decision is the
/// same whether the layer sits inside or outside a nested router.
pub async fn immutable_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_owned(),
        None => request.uri().path().to_owned(),
    };
    let response = next.run(request).await;
    state.serving.filter(&path, response).await
}
