//! Table adapter over a driver's native collection.

use crate::error::{CoreError, CoreResult};
use crate::table::{Query, Table};
use std::fmt;
use tabula_storage::{NativeCollection, Row, StorageError};

/// A [`Table`] that forwards to a driver's native collection.
///
/// The adapter holds no state of its own. Identity, change tracking and
/// conflict detection belong to the driver, and queries only see rows
/// the driver has committed.
pub struct DriverTable<'a, T: Row> {
    native: &'a mut dyn NativeCollection<T>,
}

impl<'a, T: Row> DriverTable<'a, T> {
    /// Wraps a native collection.
    pub fn new(native: &'a mut dyn NativeCollection<T>) -> Self {
        Self { native }
    }
}

impl<T: Row> Table<T> for DriverTable<'_, T> {
    fn add(&mut self, item: T) -> CoreResult<()> {
        self.native.insert_on_submit(item).map_err(|err| match err {
            StorageError::DuplicatePending { type_name, key } => CoreError::invalid_operation(
                format!("{type_name} item {key} is already pending insertion"),
            ),
            other => other.into(),
        })
    }

    fn update(&mut self, item: T) -> CoreResult<()> {
        Ok(self.native.attach_modified(item)?)
    }

    fn remove(&mut self, item: T) -> CoreResult<()> {
        Ok(self.native.delete_on_submit(item)?)
    }

    fn query(&self) -> CoreResult<Query<'_, T>> {
        Ok(Query::new(self.native.rows()?))
    }
}

impl<T: Row> fmt::Debug for DriverTable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverTable")
            .field("record_type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
