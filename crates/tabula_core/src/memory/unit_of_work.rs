//! In-memory unit of work.

use crate::config::Config;
use crate::entity::{DeletionPolicy, Entity};
use crate::equality::EqualityPolicy;
use crate::error::CoreResult;
use crate::memory::MemoryTable;
use crate::registry::{ErasedSlot, SlotRegistry};
use crate::table::TableHandle;
use crate::unit_of_work::{SaveReport, UnitOfWork};
use std::any::Any;
use std::fmt;
use tabula_storage::{ChangeCounts, ChangeSet, MemoryStore, Row};
use tracing::{debug, info, warn};

/// Everything a unit of work keeps for one record type.
///
/// `table` is `None` until the type is first requested and again after
/// each save.
struct TypeSlot<T: Row> {
    equality: EqualityPolicy<T>,
    table: Option<MemoryTable<T>>,
}

impl<T: Row> TypeSlot<T> {
    fn new() -> Self {
        Self {
            equality: EqualityPolicy::by_key(),
            table: None,
        }
    }
}

impl<T: Row> ErasedSlot for TypeSlot<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn commit(&mut self, store: &MemoryStore) -> Option<ChangeCounts> {
        let table = self.table.take()?;
        let counts = table.change_counts();
        let records = table.into_records();
        debug!(
            record_type = std::any::type_name::<T>(),
            records = records.len(),
            inserts = counts.inserts,
            updates = counts.updates,
            deletes = counts.deletes,
            "committed memory table"
        );
        store.replace(records);
        Some(counts)
    }

    fn export_changes(&self, changes: &mut ChangeSet) {
        if let Some(table) = &self.table {
            table.export_changes(changes);
        }
    }
}

/// An in-memory implementation of a unit of work.
///
/// Tables are created on first request, seeded from the [`MemoryStore`],
/// and cached until [`save`](UnitOfWork::save). Saving copies every live
/// table into the store and drops it, so the next request for the type
/// reseeds from what was just saved.
///
/// Handles returned by [`table`](UnitOfWork::table) borrow the unit of
/// work mutably; a handle obtained before a save cannot be used after it.
///
/// # Shared Store
///
/// [`MemoryUnitOfWork::new`] uses the process-wide store, so records saved
/// by one unit of work are visible to the next. Two units of work saving
/// the same type concurrently race; the last save wins. Tests should use
/// [`with_store`](MemoryUnitOfWork::with_store) and a private store.
///
/// # Example
///
/// ```rust
/// use tabula_core::{Entity, HardDelete, MemoryStore, MemoryUnitOfWork, Row, UnitOfWork};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Widget { id: u32, name: &'static str }
///
/// impl Row for Widget {
///     type Key = u32;
///     fn key(&self) -> u32 { self.id }
/// }
///
/// impl Entity for Widget {
///     type Deletion = HardDelete;
/// }
///
/// let store = MemoryStore::new();
/// let mut uow = MemoryUnitOfWork::with_store(store.clone());
/// uow.table::<Widget>().unwrap().add(Widget { id: 1, name: "a" }).unwrap();
/// uow.save().unwrap();
///
/// assert_eq!(store.len::<Widget>(), 1);
/// ```
pub struct MemoryUnitOfWork {
    store: MemoryStore,
    slots: SlotRegistry,
}

impl MemoryUnitOfWork {
    /// Creates a unit of work over the process-wide store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(MemoryStore::global())
    }

    /// Creates a unit of work over `store`.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        Self::with_config(store, Config::default())
    }

    /// Creates a unit of work over `store` with custom configuration.
    #[must_use]
    pub fn with_config(store: MemoryStore, config: Config) -> Self {
        Self {
            store,
            slots: SlotRegistry::with_capacity(config.registry_capacity),
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Replaces the stored records for `T`, keeping key equality.
    ///
    /// See [`populate_table_with`](Self::populate_table_with).
    pub fn populate_table<T, I>(&mut self, items: I) -> CoreResult<()>
    where
        T: Entity,
        I: IntoIterator<Item = T>,
    {
        self.populate_table_with(EqualityPolicy::by_key(), items)
    }

    /// Replaces the stored records and the equality policy for `T`.
    ///
    /// Only tables created afterwards see the new records and policy; a
    /// table that is already live keeps its own copy and will overwrite
    /// the seeded records when saved.
    pub fn populate_table_with<T, I>(
        &mut self,
        equality: EqualityPolicy<T>,
        items: I,
    ) -> CoreResult<()>
    where
        T: Entity,
        I: IntoIterator<Item = T>,
    {
        let records: Vec<T> = items.into_iter().collect();
        let slot = self.slots.slot_mut(TypeSlot::<T>::new)?;
        if slot.table.is_some() {
            warn!(
                record_type = std::any::type_name::<T>(),
                "populating a type whose table is already live"
            );
        }
        slot.equality = equality;

        debug!(
            record_type = std::any::type_name::<T>(),
            records = records.len(),
            "populated memory store"
        );
        self.store.replace(records);
        Ok(())
    }

    /// Checks whether a table for `T` is currently live.
    #[must_use]
    pub fn has_table<T: Entity>(&self) -> bool {
        self.slots
            .slot::<TypeSlot<T>>()
            .is_some_and(|slot| slot.table.is_some())
    }

    /// Returns the staged changes of every live table.
    #[must_use]
    pub fn pending_changes(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        for slot in self.slots.slots() {
            slot.export_changes(&mut changes);
        }
        changes
    }
}

impl Default for MemoryUnitOfWork {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryUnitOfWork")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    fn table<T: Entity>(&mut self) -> CoreResult<TableHandle<'_, T>> {
        let store = &self.store;
        let TypeSlot { equality, table } = self.slots.slot_mut(TypeSlot::<T>::new)?;

        let table = table.get_or_insert_with(|| {
            let seed = store.load::<T>();
            debug!(
                record_type = std::any::type_name::<T>(),
                records = seed.len(),
                soft_delete = <T::Deletion as DeletionPolicy<T>>::SOFT,
                "created memory table"
            );
            MemoryTable::new(equality.clone(), &seed)
        });

        Ok(<T::Deletion as DeletionPolicy<T>>::wrap(table))
    }

    fn save(&mut self) -> CoreResult<SaveReport> {
        let mut report = SaveReport::default();
        let mut tables = 0;

        for slot in self.slots.slots_mut() {
            if let Some(counts) = slot.commit(&self.store) {
                tables += 1;
                report.changes += counts;
            }
        }
        report.applied = report.changes.total();

        info!(
            tables,
            inserts = report.changes.inserts,
            updates = report.changes.updates,
            deletes = report.changes.deletes,
            "saved memory unit of work"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{HardDelete, SoftDelete, SoftDeletion};
    use crate::error::CoreError;
    use crate::table::Table;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: u32,
        name: String,
    }

    impl Row for Widget {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    impl Entity for Widget {
        type Deletion = HardDelete;
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Memo {
        id: u32,
        deleted: bool,
    }

    impl Row for Memo {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    impl SoftDelete for Memo {
        fn is_deleted(&self) -> bool {
            self.deleted
        }
        fn mark_deleted(&mut self) {
            self.deleted = true;
        }
    }

    impl Entity for Memo {
        type Deletion = SoftDeletion;
    }

    fn widget(id: u32, name: &str) -> Widget {
        Widget {
            id,
            name: name.to_string(),
        }
    }

    fn private() -> MemoryUnitOfWork {
        MemoryUnitOfWork::with_store(MemoryStore::new())
    }

    #[test]
    fn unseeded_table_is_empty() {
        let mut uow = private();
        let widgets = uow.table::<Widget>().unwrap();
        assert_eq!(widgets.query().unwrap().count(), 0);
    }

    #[test]
    fn table_is_cached_until_save() {
        let mut uow = private();
        assert!(!uow.has_table::<Widget>());

        uow.table::<Widget>().unwrap().add(widget(1, "a")).unwrap();
        assert!(uow.has_table::<Widget>());

        // Same live table: the staged insert is still visible
        let count = uow.table::<Widget>().unwrap().query().unwrap().count();
        assert_eq!(count, 1);
        assert!(uow.store().is_empty::<Widget>());

        uow.save().unwrap();
        assert!(!uow.has_table::<Widget>());
        assert_eq!(uow.store().len::<Widget>(), 1);
    }

    #[test]
    fn save_reports_counts() {
        let mut uow = private();
        uow.populate_table(vec![widget(1, "a"), widget(2, "b")])
            .unwrap();
        {
            let mut widgets = uow.table::<Widget>().unwrap();
            widgets.add(widget(3, "c")).unwrap();
            widgets.update(widget(1, "A")).unwrap();
            widgets.remove(widget(2, "b")).unwrap();
        }

        let counts = uow.pending_changes().counts();
        assert_eq!((counts.inserts, counts.updates, counts.deletes), (1, 1, 1));

        let report = uow.save().unwrap();
        assert_eq!(report.changes, counts);
        assert!(report.is_clean());
        assert!(uow.pending_changes().is_empty());
    }

    #[test]
    fn save_without_tables_is_noop() {
        let mut uow = private();
        let report = uow.save().unwrap();
        assert_eq!(report, SaveReport::default());
    }

    #[test]
    fn populate_after_table_is_live_has_no_effect_on_it() {
        let mut uow = private();
        uow.table::<Widget>().unwrap();
        uow.populate_table(vec![widget(1, "a")]).unwrap();

        let count = uow.table::<Widget>().unwrap().query().unwrap().count();
        assert_eq!(count, 0);
    }

    #[test]
    fn custom_equality_is_used_by_new_tables() {
        let mut uow = private();
        let by_name = EqualityPolicy::new(|a: &Widget, b: &Widget| a.name == b.name);
        uow.populate_table_with(by_name, vec![widget(1, "a")])
            .unwrap();

        uow.table::<Widget>()
            .unwrap()
            .update(widget(5, "a"))
            .unwrap();
        uow.save().unwrap();

        assert_eq!(&*uow.store().load::<Widget>(), &[widget(5, "a")]);
    }

    #[test]
    fn duplicate_add_is_invalid() {
        let mut uow = private();
        let mut widgets = uow.table::<Widget>().unwrap();
        widgets.add(widget(1, "a")).unwrap();
        let result = widgets.add(widget(1, "a"));
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));
    }

    #[test]
    fn soft_delete_types_get_decorated_tables() {
        let mut uow = private();
        uow.populate_table(vec![Memo { id: 1, deleted: false }])
            .unwrap();
        {
            let mut memos = uow.table::<Memo>().unwrap();
            memos.remove(Memo { id: 1, deleted: false }).unwrap();
            assert_eq!(memos.query().unwrap().count(), 0);
        }
        uow.save().unwrap();

        let stored = uow.store().load::<Memo>();
        assert_eq!(&*stored, &[Memo { id: 1, deleted: true }]);
    }
}
