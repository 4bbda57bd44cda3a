//! # Deduplicating Storage
//!
//! [`DedupStorage`] wraps any [`StorageBackend`] and implements the same
//! trait. `exists`, `open` and `url` are delegated unchanged; `save` is
//! intercepted so that content is stored once under a name derived from its
//! digest, and every new (original name → stored name) pairing is appended
//! to the [`Ledger`].
//!
//! ## Save Protocol
//!
//! 1. Rewind and hash the content.
//! 2. Build the unique name from the requested name and digest.
//! 3. If the backend already has that name, return it: same name means same
//!    bytes. No write, no ledger record.
//! 4. Otherwise persist through the backend. The name the backend returns is
//!    authoritative. If it differs from the requested name, append a record.
//!
//! There is no "available name" suffixing: an existing target is a dedup
//! hit, never a collision.

use dedupe_core::{unique_name, ContentDigest, ExtensionAliases};
use tracing::{debug, error, info};

use crate::backend::{Content, ContentStream, StorageBackend};
use crate::error::StorageError;
use crate::hasher::{digest_stream, rewind};
use crate::ledger::{Ledger, NewUniqueFile, UniqueFileRecord};

/// Result of a deduplicating save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Name the content is stored under.
    pub name: String,
    /// Digest of the content.
    pub digest: ContentDigest,
    /// The content already existed; nothing was written.
    pub deduplicated: bool,
    /// Ledger record appended by this save, if any.
    pub record: Option<UniqueFileRecord>,
}

/// Content-addressed decorator over a storage backend.
#[derive(Debug, Clone)]
pub struct DedupStorage<B, L> {
    backend: B,
    ledger: L,
    aliases: ExtensionAliases,
}

impl<B: StorageBackend, L: Ledger> DedupStorage<B, L> {
    pub fn new(backend: B, ledger: L, aliases: ExtensionAliases) -> Self {
        Self {
            backend,
            ledger,
            aliases,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Store `content` requested as `name`, reporting what happened.
    pub async fn store<C: Content + ?Sized>(
        &self,
        name: &str,
        content: &mut C,
    ) -> Result<SaveOutcome, StorageError> {
        let digest = digest_stream(content).await?;
        let unique = unique_name(name, &digest, &self.aliases);

        if self.backend.exists(&unique).await? {
            debug!(requested = %name, name = %unique, "content already stored");
            return Ok(SaveOutcome {
                name: unique,
                digest,
                deduplicated: true,
                record: None,
            });
        }

        rewind(content).await?;
        let stored = self.backend.save(&unique, content).await?;

        let record = if stored != name {
            let record = self
                .ledger
                .append(NewUniqueFile::new(stored.clone(), name))
                .await
                .map_err(|e| {
                    error!(
                        requested = %name,
                        name = %stored,
                        error = %e,
                        "stored file but failed to record its original name"
                    );
                    e
                })?;
            Some(record)
        } else {
            None
        };

        info!(requested = %name, name = %stored, "stored unique file");
        Ok(SaveOutcome {
            name: stored,
            digest,
            deduplicated: false,
            record,
        })
    }

    /// Latest original name recorded for `unique_name`, or the name itself
    /// when no record exists.
    pub async fn resolve_original(&self, unique_name: &str) -> Result<String, StorageError> {
        let record = self.ledger.latest_by_unique_name(unique_name).await?;
        Ok(record.map_or_else(|| unique_name.to_string(), |r| r.original_name))
    }
}

impl<B: StorageBackend, L: Ledger> StorageBackend for DedupStorage<B, L> {
    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        self.backend.exists(name).await
    }

    async fn open(&self, name: &str) -> Result<ContentStream, StorageError> {
        self.backend.open(name).await
    }

    async fn save<C: Content + ?Sized>(
        &self,
        name: &str,
        content: &mut C,
    ) -> Result<String, StorageError> {
        Ok(self.store(name, content).await?.name)
    }

    fn url(&self, name: &str) -> String {
        self.backend.url(name)
    }
}
