//! Driver trait definition.

use crate::changes::{ChangeSet, SubmitReport};
use crate::error::StorageResult;
use crate::row::Row;

/// How a driver handles row conflicts during submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictMode {
    /// Apply every row that can be applied and report the rest.
    #[default]
    ContinueOnConflict,
    /// Apply nothing if any row conflicts.
    FailOnFirstConflict,
}

/// A driver's native collection for one record type.
///
/// Collections stage changes; nothing reaches the store until
/// [`Driver::submit_changes`] runs.
pub trait NativeCollection<T: Row> {
    /// Stages `row` for insertion.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::DuplicatePending`] if a row with the
    /// same key is already staged for insertion.
    fn insert_on_submit(&mut self, row: T) -> StorageResult<()>;

    /// Stages `row` as modified.
    ///
    /// Whether the row exists is only checked at submit time.
    fn attach_modified(&mut self, row: T) -> StorageResult<()>;

    /// Stages `row` for deletion.
    fn delete_on_submit(&mut self, row: T) -> StorageResult<()>;

    /// Returns the committed rows.
    ///
    /// Staged changes are not visible until they are submitted.
    fn rows(&self) -> StorageResult<Vec<T>>;
}

/// A backing store reached through a driver.
///
/// The driver owns store lifecycle, per-type change tracking, identity and
/// conflict detection.
///
/// # Implementors
///
/// - [`super::MemoryDriver`] - In-process store with relational semantics
pub trait Driver {
    /// Checks whether the target store exists. Has no side effects.
    fn store_exists(&self) -> StorageResult<bool>;

    /// Creates the target store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created, including when it
    /// already exists.
    fn create_store(&mut self) -> StorageResult<()>;

    /// Enumerates every staged change across all collections.
    fn pending_changes(&self) -> StorageResult<ChangeSet>;

    /// Applies every staged change and clears the staging area.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable, or if `mode` is
    /// [`ConflictMode::FailOnFirstConflict`] and any row conflicts.
    fn submit_changes(&mut self, mode: ConflictMode) -> StorageResult<SubmitReport>;

    /// Returns the native collection for `T`, creating it on first use.
    fn collection<T: Row>(&mut self) -> StorageResult<&mut dyn NativeCollection<T>>;
}
