//! Error types for Tabula core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in table and unit-of-work operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage or driver error, propagated unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] tabula_storage::StorageError),

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// The item could not be located in the table.
    #[error("{type_name} item is not tracked by this table")]
    NotTracked {
        /// The record type.
        type_name: &'static str,
    },

    /// A per-type registry slot holds a value of the wrong type.
    #[error("registry slot for {type_name} is corrupted")]
    RegistryCorrupted {
        /// The record type.
        type_name: &'static str,
    },
}

impl CoreError {
    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a not-tracked error for `T`.
    pub fn not_tracked<T>() -> Self {
        Self::NotTracked {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Creates a registry corruption error for `T`.
    pub fn registry_corrupted<T>() -> Self {
        Self::RegistryCorrupted {
            type_name: std::any::type_name::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_storage::StorageError;

    #[test]
    fn storage_errors_convert() {
        let err: CoreError = StorageError::StoreExists.into();
        assert!(matches!(err, CoreError::Storage(StorageError::StoreExists)));
        assert_eq!(err.to_string(), "storage error: store already exists");
    }

    #[test]
    fn not_tracked_names_the_type() {
        let err = CoreError::not_tracked::<u32>();
        assert_eq!(err.to_string(), "u32 item is not tracked by this table");
    }
}
