//! # Application State
//!
//! Shared state for the Axum application, passed to route handlers and the
//! immutable-serving middleware via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Config**: validated namespace prefixes, roots and extension aliases.
//! - **Media store**: deduplicating storage over the legacy root. Uploads are
//!   saved here under content-hashed names.
//! - **Serving**: the immutable-serving filter, sharing the media store's
//!   ledger so redirects see every association the store records.
//! - **Metrics**: request counters.
//!
//! Every field is an `Arc` or a cheap handle, so cloning the state per
//! request is free.

use std::sync::Arc;

use dedupe_core::DedupeConfig;
use dedupe_store::{DedupStorage, FileSystemStorage, LedgerBackend};

use crate::middleware::immutable::ImmutableServing;
use crate::middleware::metrics::ApiMetrics;

/// Deduplicating store used for uploads into the legacy namespace.
pub type MediaStore = DedupStorage<FileSystemStorage, LedgerBackend>;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<DedupeConfig>,
    pub media: Arc<MediaStore>,
    pub serving: Arc<ImmutableServing<LedgerBackend>>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Build the state from a validated config and the selected ledger.
    pub fn new(config: DedupeConfig, ledger: LedgerBackend) -> Self {
        let metrics = ApiMetrics::new();
        let backend = FileSystemStorage::new(
            config.legacy_root_dir.clone(),
            config.legacy_namespace_prefix.as_str(),
        );
        let media = DedupStorage::new(
            backend,
            ledger.clone(),
            config.extension_aliases.clone(),
        );
        let serving = ImmutableServing::new(&config, ledger, metrics.clone());
        Self {
            config: Arc::new(config),
            media: Arc::new(media),
            serving: Arc::new(serving),
            metrics,
        }
    }

    /// State backed by an in-memory ledger.
    pub fn in_memory(config: DedupeConfig) -> Self {
        Self::new(config, LedgerBackend::Memory(Default::default()))
    }
}
