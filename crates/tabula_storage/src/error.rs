//! Error types for storage operations.

use crate::changes::RowConflict;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target store already exists and cannot be created again.
    #[error("store already exists")]
    StoreExists,

    /// The target store has not been created.
    #[error("store does not exist")]
    StoreMissing,

    /// A row with the same key is already pending insertion.
    #[error("{type_name} row {key} is already pending insertion")]
    DuplicatePending {
        /// The record type.
        type_name: &'static str,
        /// Debug rendering of the row key.
        key: String,
    },

    /// A row conflict aborted the submission.
    #[error("change conflict: {0}")]
    Conflict(RowConflict),

    /// The store's internal bookkeeping is inconsistent.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Creates a duplicate pending insert error.
    pub fn duplicate_pending(type_name: &'static str, key: impl std::fmt::Debug) -> Self {
        Self::DuplicatePending {
            type_name,
            key: format!("{key:?}"),
        }
    }
}
