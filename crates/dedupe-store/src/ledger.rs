//! # Name History Ledger
//!
//! Append-only record of every (original name → unique name) association
//! produced by the deduplicating store. Queried in both directions:
//!
//! - by original name, to redirect legacy URLs to current content;
//! - by unique name, to recover the name a file was uploaded under.
//!
//! ## Ordering
//!
//! "Latest" means the greatest sequence number assigned by the ledger at
//! append time, never wall-clock order. [`MemoryLedger`] assigns the number
//! under its write lock; the PostgreSQL ledger uses a `BIGSERIAL` column.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::db::PgLedger;
use crate::error::LedgerError;

/// One recorded association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueFileRecord {
    /// Ledger sequence number. Strictly increasing in append order.
    pub id: i64,
    /// Unique, content-derived storage name.
    pub name: String,
    /// Name requested by the writer.
    pub original_name: String,
    /// Informational append time.
    pub created_at: DateTime<Utc>,
}

/// A record not yet appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUniqueFile {
    pub name: String,
    pub original_name: String,
}

impl NewUniqueFile {
    pub fn new(name: impl Into<String>, original_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            original_name: original_name.into(),
        }
    }
}

/// Append-only association store.
///
/// Implementations must accept concurrent appends without losing records.
pub trait Ledger: Send + Sync {
    /// Persist a new record and return it with its sequence number.
    fn append(
        &self,
        record: NewUniqueFile,
    ) -> impl Future<Output = Result<UniqueFileRecord, LedgerError>> + Send;

    /// Most recently appended record with this original name.
    fn latest_by_original_name(
        &self,
        original_name: &str,
    ) -> impl Future<Output = Result<Option<UniqueFileRecord>, LedgerError>> + Send;

    /// Most recently appended record with this unique name.
    fn latest_by_unique_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<UniqueFileRecord>, LedgerError>> + Send;
}

/// In-process ledger. State does not survive restarts.
///
/// Cloning shares the underlying records.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Arc<RwLock<Vec<UniqueFileRecord>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in append order.
    pub fn records(&self) -> Vec<UniqueFileRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn latest_where(&self, pred: impl Fn(&UniqueFileRecord) -> bool) -> Option<UniqueFileRecord> {
        self.records.read().iter().rev().find(|r| pred(r)).cloned()
    }
}

impl Ledger for MemoryLedger {
    async fn append(&self, record: NewUniqueFile) -> Result<UniqueFileRecord, LedgerError> {
        let mut records = self.records.write();
        let id = records.last().map_or(1, |r| r.id + 1);
        let record = UniqueFileRecord {
            id,
            name: record.name,
            original_name: record.original_name,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn latest_by_original_name(
        &self,
        original_name: &str,
    ) -> Result<Option<UniqueFileRecord>, LedgerError> {
        Ok(self.latest_where(|r| r.original_name == original_name))
    }

    async fn latest_by_unique_name(
        &self,
        name: &str,
    ) -> Result<Option<UniqueFileRecord>, LedgerError> {
        Ok(self.latest_where(|r| r.name == name))
    }
}

/// Ledger selected at startup: PostgreSQL when a database is configured,
/// otherwise in-memory.
#[derive(Debug, Clone)]
pub enum LedgerBackend {
    Memory(MemoryLedger),
    Postgres(PgLedger),
}

impl LedgerBackend {
    /// Choose the backend from an optional pool.
    pub fn from_pool(pool: Option<sqlx::PgPool>) -> Self {
        match pool {
            Some(pool) => Self::Postgres(PgLedger::new(pool)),
            None => {
                tracing::warn!(
                    "no database configured, name history is in-memory only; \
                     legacy redirects will not survive restarts"
                );
                Self::Memory(MemoryLedger::new())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl Ledger for LedgerBackend {
    async fn append(&self, record: NewUniqueFile) -> Result<UniqueFileRecord, LedgerError> {
        match self {
            Self::Memory(l) => l.append(record).await,
            Self::Postgres(l) => l.append(record).await,
        }
    }

    async fn latest_by_original_name(
        &self,
        original_name: &str,
    ) -> Result<Option<UniqueFileRecord>, LedgerError> {
        match self {
            Self::Memory(l) => l.latest_by_original_name(original_name).await,
            Self::Postgres(l) => l.latest_by_original_name(original_name).await,
        }
    }

    async fn latest_by_unique_name(
        &self,
        name: &str,
    ) -> Result<Option<UniqueFileRecord>, LedgerError> {
        match self {
            Self::Memory(l) => l.latest_by_unique_name(name).await,
            Self::Postgres(l) => l.latest_by_unique_name(name).await,
        }
    }
}
