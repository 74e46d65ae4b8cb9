//! Record types and deletion policies.

use crate::table::{SoftDeleteTable, Table, TableHandle};
use tabula_storage::Row;

/// A record type that can be served through a [`Table`].
///
/// The associated [`Deletion`](Entity::Deletion) type decides, at compile
/// time, whether tables for this type delete physically or flip a flag.
///
/// ```rust
/// use tabula_core::{Entity, Row, SoftDelete, SoftDeletion};
///
/// #[derive(Clone)]
/// struct Invoice { number: u64, voided: bool }
///
/// impl Row for Invoice {
///     type Key = u64;
///     fn key(&self) -> u64 { self.number }
/// }
///
/// impl SoftDelete for Invoice {
///     fn is_deleted(&self) -> bool { self.voided }
///     fn mark_deleted(&mut self) { self.voided = true; }
/// }
///
/// impl Entity for Invoice {
///     type Deletion = SoftDeletion;
/// }
/// ```
pub trait Entity: Row {
    /// How removal is carried out for this type.
    type Deletion: DeletionPolicy<Self>;
}

/// The soft-delete capability: a record that carries a deletion flag.
pub trait SoftDelete {
    /// Returns true if the record has been logically deleted.
    fn is_deleted(&self) -> bool;

    /// Sets the deletion flag.
    fn mark_deleted(&mut self);
}

/// Chooses the table variant handed out for a record type.
pub trait DeletionPolicy<T: Row> {
    /// True if removal only flips a flag.
    const SOFT: bool;

    /// Wraps a backend table in the variant this policy requires.
    fn wrap<'a, I>(inner: I) -> TableHandle<'a, T>
    where
        I: Table<T> + 'a;
}

/// Removal physically deletes the record.
#[derive(Debug, Clone, Copy)]
pub enum HardDelete {}

impl<T: Row> DeletionPolicy<T> for HardDelete {
    const SOFT: bool = false;

    fn wrap<'a, I>(inner: I) -> TableHandle<'a, T>
    where
        I: Table<T> + 'a,
    {
        Box::new(inner)
    }
}

/// Removal sets the record's deletion flag; see [`SoftDeleteTable`].
#[derive(Debug, Clone, Copy)]
pub enum SoftDeletion {}

impl<T: Row + SoftDelete> DeletionPolicy<T> for SoftDeletion {
    const SOFT: bool = true;

    fn wrap<'a, I>(inner: I) -> TableHandle<'a, T>
    where
        I: Table<T> + 'a,
    {
        Box::new(SoftDeleteTable::new(inner))
    }
}
