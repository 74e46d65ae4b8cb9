//! Change sets and submission reports.

use crate::row::Row;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A single staged row, with its concrete type erased.
///
/// Observers read rows back through [`ChangedRow::downcast_ref`].
#[derive(Clone)]
pub struct ChangedRow {
    type_id: TypeId,
    type_name: &'static str,
    key: String,
    row: Arc<dyn Any + Send + Sync>,
}

impl ChangedRow {
    /// Captures a copy of `row`.
    pub fn new<T: Row>(row: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            key: format!("{:?}", row.key()),
            row: Arc::new(row),
        }
    }

    /// Returns the record type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the debug rendering of the row key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Checks whether the row is a `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns the row as a `T`, or `None` if it is another type.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.row.downcast_ref::<T>()
    }
}

impl fmt::Debug for ChangedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangedRow")
            .field("type_name", &self.type_name)
            .field("key", &self.key)
            .finish()
    }
}

/// Pending inserts, updates and deletes, partitioned by kind.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Rows staged for insertion.
    pub inserts: Vec<ChangedRow>,
    /// Rows staged for update.
    pub updates: Vec<ChangedRow>,
    /// Rows staged for deletion.
    pub deletes: Vec<ChangedRow>,
}

impl ChangeSet {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the per-kind counts.
    #[must_use]
    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            inserts: self.inserts.len(),
            updates: self.updates.len(),
            deletes: self.deletes.len(),
        }
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    /// Appends every row from `other`.
    pub fn extend(&mut self, other: ChangeSet) {
        self.inserts.extend(other.inserts);
        self.updates.extend(other.updates);
        self.deletes.extend(other.deletes);
    }

    /// Iterates the pending inserts of type `T`.
    pub fn inserts_of<T: 'static>(&self) -> impl Iterator<Item = &T> {
        self.inserts.iter().filter_map(ChangedRow::downcast_ref::<T>)
    }

    /// Iterates the pending updates of type `T`.
    pub fn updates_of<T: 'static>(&self) -> impl Iterator<Item = &T> {
        self.updates.iter().filter_map(ChangedRow::downcast_ref::<T>)
    }

    /// Iterates the pending deletes of type `T`.
    pub fn deletes_of<T: 'static>(&self) -> impl Iterator<Item = &T> {
        self.deletes.iter().filter_map(ChangedRow::downcast_ref::<T>)
    }
}

/// Number of pending rows per change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    /// Pending inserts.
    pub inserts: usize,
    /// Pending updates.
    pub updates: usize,
    /// Pending deletes.
    pub deletes: usize,
}

impl ChangeCounts {
    /// Sum of all kinds.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }
}

impl std::ops::AddAssign for ChangeCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.inserts += rhs.inserts;
        self.updates += rhs.updates;
        self.deletes += rhs.deletes;
    }
}

/// Why a row could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// An insert targeted a key that already exists.
    DuplicateKey,
    /// An update or delete targeted a row that no longer exists.
    RowMissing,
    /// The row changed since it was staged.
    RowChanged {
        /// Version observed when the change was staged.
        expected: Option<u64>,
        /// Version found at submit time.
        actual: u64,
    },
}

/// A row the driver refused to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowConflict {
    /// The record type.
    pub type_name: &'static str,
    /// Debug rendering of the row key.
    pub key: String,
    /// The conflict kind.
    pub kind: ConflictKind,
}

impl fmt::Display for RowConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConflictKind::DuplicateKey => {
                write!(f, "{} row {} already exists", self.type_name, self.key)
            }
            ConflictKind::RowMissing => {
                write!(f, "{} row {} not found", self.type_name, self.key)
            }
            ConflictKind::RowChanged { expected, actual } => write!(
                f,
                "{} row {} changed (expected version {:?}, found {})",
                self.type_name, self.key, expected, actual
            ),
        }
    }
}

/// Outcome of a driver submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitReport {
    /// Changes that were staged when the submission started.
    pub changes: ChangeCounts,
    /// Rows written to the store.
    pub applied: usize,
    /// Rows skipped because of conflicts.
    pub conflicts: Vec<RowConflict>,
}

impl SubmitReport {
    /// Returns true if every row was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}
