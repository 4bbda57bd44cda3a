//! # dedupe-store — Deduplicating File Storage
//!
//! Stores each distinct piece of content exactly once, under a name derived
//! from its SHA-256 digest, and keeps an append-only history of the names
//! content was originally saved under.
//!
//! ## Layers
//!
//! ```text
//! DedupStorage<B, L>   — hash, name, dedup check, ledger append
//!   ├── B: StorageBackend  (FileSystemStorage)
//!   └── L: Ledger          (MemoryLedger | PgLedger, via LedgerBackend)
//! ```
//!
//! Backends and ledgers are injected at construction. Both are shared
//! across request tasks and must be safe for concurrent use.

pub mod backend;
pub mod db;
pub mod dedup;
pub mod error;
pub mod hasher;
pub mod ledger;

pub use backend::{Content, ContentStream, FileSystemStorage, StorageBackend};
pub use db::PgLedger;
pub use dedup::{DedupStorage, SaveOutcome};
pub use error::{LedgerError, StorageError};
pub use ledger::{Ledger, LedgerBackend, MemoryLedger, NewUniqueFile, UniqueFileRecord};
