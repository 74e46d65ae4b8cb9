//! Soft-delete decorator.

use super::{Query, Table};
use crate::entity::SoftDelete;
use crate::error::CoreResult;
use std::fmt;
use std::marker::PhantomData;
use tabula_storage::Row;
use tracing::trace;

/// Wraps a table so removal flips a deletion flag instead of deleting.
///
/// - [`remove`](Table::remove) marks the item deleted and hands it to the
///   inner table's `update`; the inner `remove` is never called.
/// - [`query`](Table::query) hides flagged records.
/// - Everything else is delegated unchanged.
///
/// There is no way to see deleted records through this layer; use the
/// inner table for that.
pub struct SoftDeleteTable<T, I> {
    inner: I,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T, I> SoftDeleteTable<T, I>
where
    T: Row + SoftDelete,
    I: Table<T>,
{
    /// Wraps `inner`.
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns the wrapped table, which still sees deleted records.
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Unwraps the decorator.
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<T, I> Table<T> for SoftDeleteTable<T, I>
where
    T: Row + SoftDelete,
    I: Table<T>,
{
    fn add(&mut self, item: T) -> CoreResult<()> {
        self.inner.add(item)
    }

    fn update(&mut self, item: T) -> CoreResult<()> {
        self.inner.update(item)
    }

    fn remove(&mut self, mut item: T) -> CoreResult<()> {
        item.mark_deleted();
        trace!(
            record_type = std::any::type_name::<T>(),
            key = ?item.key(),
            "soft delete staged as update"
        );
        self.inner.update(item)
    }

    fn query(&self) -> CoreResult<Query<'_, T>> {
        Ok(self.inner.query()?.filter_by(|item| !item.is_deleted()))
    }
}

impl<T, I: fmt::Debug> fmt::Debug for SoftDeleteTable<T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftDeleteTable")
            .field("inner", &self.inner)
            .finish()
    }
}
