//! # Storage Error Types
//!
//! One error type, [`StorageError`], flows out of every [`StorageBackend`]
//! operation. The deduplicating decorator implements the same trait, so
//! hashing and ledger failures are carried as variants of it rather than
//! as a separate hierarchy.
//!
//! [`StorageBackend`]: crate::backend::StorageBackend

use dedupe_core::HashInputError;
use thiserror::Error;

/// Error from a storage operation.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The named file does not exist.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The name is empty, absolute, or escapes the storage root.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Underlying filesystem failure.
    #[error("storage backend IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be hashed. Nothing was persisted.
    #[error("content could not be hashed: {0}")]
    HashInput(#[from] HashInputError),

    /// The name history ledger failed.
    ///
    /// On a write the blob may already be persisted while its association
    /// was lost.
    #[error("name ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),
}

/// The ledger could not be read or written.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The ledger is unreachable for another reason.
    #[error("{0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_input_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "seek");
        let err = StorageError::from(HashInputError::Rewind(io));
        assert!(matches!(err, StorageError::HashInput(HashInputError::Rewind(_))));
        assert!(err.to_string().starts_with("content could not be hashed"));
    }

    #[test]
    fn ledger_error_display_is_prefixed() {
        let err = StorageError::from(LedgerError::Unavailable("connection refused".into()));
        assert_eq!(err.to_string(), "name ledger unavailable: connection refused");
    }
}
