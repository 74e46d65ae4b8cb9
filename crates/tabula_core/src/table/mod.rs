//! The table contract.
//!
//! A [`Table`] is a typed, queryable, mutable view over one record type.
//! Mutations are staged; they reach the backing store when the owning
//! unit of work saves.
//!
//! Querying uses host-language iterator adapters rather than a query
//! language:
//!
//! ```rust,ignore
//! let cheap: Vec<Widget> = widgets
//!     .query()?
//!     .filter_by(|w| w.price < 10)
//!     .order_by(|w| w.name.clone())
//!     .collect();
//! ```

mod query;
mod soft_delete;

pub use query::Query;
pub use soft_delete::SoftDeleteTable;

use crate::error::CoreResult;
use tabula_storage::Row;

/// A table handed out by a unit of work.
///
/// The handle borrows the unit of work mutably, so it cannot outlive the
/// next `save`.
pub type TableHandle<'a, T> = Box<dyn Table<T> + 'a>;

/// A queryable, mutable collection of one record type.
pub trait Table<T: Row> {
    /// Stages `item` for insertion.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidOperation`] for a duplicate. What
    /// counts as one depends on the backend:
    ///
    /// - In memory, a record equal to `item` under the type's
    ///   [`crate::EqualityPolicy`] is already in the table view, whether
    ///   seeded, saved or added since.
    /// - Relationally, a row with the same key is already pending
    ///   insertion. A clash with a committed row is not an error here; it
    ///   is reported as a [`crate::ConflictKind::DuplicateKey`] conflict
    ///   when the unit of work is saved.
    fn add(&mut self, item: T) -> CoreResult<()>;

    /// Stages `item` for update.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::NotTracked`] if the backend cannot
    /// resolve the record.
    fn update(&mut self, item: T) -> CoreResult<()>;

    /// Stages `item` for removal.
    fn remove(&mut self, item: T) -> CoreResult<()>;

    /// Removes every record in the current view that matches `predicate`.
    ///
    /// Each match goes through [`remove`](Table::remove), so decorators
    /// that change removal apply here too. Returns the number of records
    /// staged for removal.
    fn remove_where(&mut self, predicate: &dyn Fn(&T) -> bool) -> CoreResult<usize> {
        let matches: Vec<T> = self.query()?.filter(|item| predicate(item)).collect();
        let count = matches.len();
        for item in matches {
            self.remove(item)?;
        }
        Ok(count)
    }

    /// Returns a lazy query over the current view.
    fn query(&self) -> CoreResult<Query<'_, T>>;
}

impl<T: Row, I: Table<T> + ?Sized> Table<T> for &mut I {
    fn add(&mut self, item: T) -> CoreResult<()> {
        (**self).add(item)
    }

    fn update(&mut self, item: T) -> CoreResult<()> {
        (**self).update(item)
    }

    fn remove(&mut self, item: T) -> CoreResult<()> {
        (**self).remove(item)
    }

    fn remove_where(&mut self, predicate: &dyn Fn(&T) -> bool) -> CoreResult<usize> {
        (**self).remove_where(predicate)
    }

    fn query(&self) -> CoreResult<Query<'_, T>> {
        (**self).query()
    }
}

impl<T: Row, I: Table<T> + ?Sized> Table<T> for Box<I> {
    fn add(&mut self, item: T) -> CoreResult<()> {
        (**self).add(item)
    }

    fn update(&mut self, item: T) -> CoreResult<()> {
        (**self).update(item)
    }

    fn remove(&mut self, item: T) -> CoreResult<()> {
        (**self).remove(item)
    }

    fn remove_where(&mut self, predicate: &dyn Fn(&T) -> bool) -> CoreResult<usize> {
        (**self).remove_where(predicate)
    }

    fn query(&self) -> CoreResult<Query<'_, T>> {
        (**self).query()
    }
}
