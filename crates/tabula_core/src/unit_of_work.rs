//! The unit-of-work contract.

use crate::entity::Entity;
use crate::error::CoreResult;
use crate::table::TableHandle;
use tabula_storage::{ChangeCounts, RowConflict};

/// A session that hands out tables and commits their changes together.
///
/// Tables borrow the unit of work, so every handle must be dropped before
/// [`save`](UnitOfWork::save) can be called:
///
/// ```rust,ignore
/// {
///     let mut widgets = uow.table::<Widget>()?;
///     widgets.add(widget)?;
/// }
/// uow.save()?;
/// ```
pub trait UnitOfWork {
    /// Returns the table for `T`.
    fn table<T: Entity>(&mut self) -> CoreResult<TableHandle<'_, T>>;

    /// Commits every pending change as one batch.
    fn save(&mut self) -> CoreResult<SaveReport>;
}

/// Outcome of a [`UnitOfWork::save`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Changes that were pending when the save started.
    pub changes: ChangeCounts,
    /// Rows the backend actually wrote.
    pub applied: usize,
    /// Rows the backend skipped because they conflicted.
    pub conflicts: Vec<RowConflict>,
}

impl SaveReport {
    /// Returns true if every pending change was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}
