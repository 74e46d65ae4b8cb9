//! In-memory table implementation.

use crate::equality::EqualityPolicy;
use crate::error::{CoreError, CoreResult};
use crate::table::{Query, Table};
use tabula_storage::{ChangeCounts, ChangeSet, ChangedRow, Row};

/// Net changes staged against a [`MemoryTable`] since it was seeded.
#[derive(Debug)]
struct StagedChanges<T> {
    inserts: Vec<T>,
    updates: Vec<T>,
    deletes: Vec<T>,
}

impl<T: Row> StagedChanges<T> {
    fn new() -> Self {
        Self {
            inserts: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
        }
    }

    fn record_update(&mut self, item: T, equality: &EqualityPolicy<T>) {
        // An insert that is later modified is still just an insert
        if let Some(index) = equality.position(&self.inserts, &item) {
            self.inserts[index] = item;
        } else if let Some(index) = equality.position(&self.updates, &item) {
            self.updates[index] = item;
        } else {
            self.updates.push(item);
        }
    }

    fn record_delete(&mut self, item: T, equality: &EqualityPolicy<T>) {
        if let Some(index) = equality.position(&self.inserts, &item) {
            self.inserts.remove(index);
            return;
        }
        self.updates.retain(|pending| !equality.equals(pending, &item));
        self.deletes.push(item);
    }

    fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            inserts: self.inserts.len(),
            updates: self.updates.len(),
            deletes: self.deletes.len(),
        }
    }

    fn export(&self, changes: &mut ChangeSet) {
        changes
            .inserts
            .extend(self.inserts.iter().cloned().map(ChangedRow::new));
        changes
            .updates
            .extend(self.updates.iter().cloned().map(ChangedRow::new));
        changes
            .deletes
            .extend(self.deletes.iter().cloned().map(ChangedRow::new));
    }
}

/// A working copy of one record type's committed records.
///
/// Records are located with the table's [`EqualityPolicy`] by linear scan;
/// the first match wins. Queries see staged state, not the store.
///
/// # Example
///
/// ```rust
/// use tabula_core::{EqualityPolicy, MemoryTable, Row, Table};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Tag { id: u8, label: &'static str }
///
/// impl Row for Tag {
///     type Key = u8;
///     fn key(&self) -> u8 { self.id }
/// }
///
/// let mut tags = MemoryTable::new(EqualityPolicy::by_key(), &[Tag { id: 1, label: "old" }]);
/// tags.update(Tag { id: 1, label: "new" }).unwrap();
/// tags.add(Tag { id: 2, label: "two" }).unwrap();
///
/// assert_eq!(tags.len(), 2);
/// assert_eq!(tags.change_counts().total(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryTable<T: Row> {
    equality: EqualityPolicy<T>,
    items: Vec<T>,
    changes: StagedChanges<T>,
}

impl<T: Row> MemoryTable<T> {
    /// Creates a table seeded with a copy of `seed`.
    pub fn new(equality: EqualityPolicy<T>, seed: &[T]) -> Self {
        Self {
            equality,
            items: seed.to_vec(),
            changes: StagedChanges::new(),
        }
    }

    /// Returns the number of records in the current view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the current view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the records in the current view.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.items
    }

    /// Returns the policy used to locate records.
    #[must_use]
    pub fn equality(&self) -> &EqualityPolicy<T> {
        &self.equality
    }

    /// Returns the number of staged changes per kind.
    #[must_use]
    pub fn change_counts(&self) -> ChangeCounts {
        self.changes.counts()
    }

    /// Returns the staged changes.
    #[must_use]
    pub fn pending_changes(&self) -> ChangeSet {
        let mut changes = ChangeSet::new();
        self.changes.export(&mut changes);
        changes
    }

    pub(crate) fn export_changes(&self, changes: &mut ChangeSet) {
        self.changes.export(changes);
    }

    pub(crate) fn into_records(self) -> Vec<T> {
        self.items
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.equality.position(&self.items, item)
    }
}

impl<T: Row> Table<T> for MemoryTable<T> {
    fn add(&mut self, item: T) -> CoreResult<()> {
        if self.position(&item).is_some() {
            return Err(CoreError::invalid_operation(format!(
                "{} item {:?} is already in the table",
                std::any::type_name::<T>(),
                item.key()
            )));
        }
        self.changes.inserts.push(item.clone());
        self.items.push(item);
        Ok(())
    }

    fn update(&mut self, item: T) -> CoreResult<()> {
        let index = self
            .position(&item)
            .ok_or_else(CoreError::not_tracked::<T>)?;
        self.items[index] = item.clone();
        self.changes.record_update(item, &self.equality);
        Ok(())
    }

    fn remove(&mut self, item: T) -> CoreResult<()> {
        let index = self
            .position(&item)
            .ok_or_else(CoreError::not_tracked::<T>)?;
        self.items.remove(index);
        self.changes.record_delete(item, &self.equality);
        Ok(())
    }

    fn query(&self) -> CoreResult<Query<'_, T>> {
        Ok(Query::new(self.items.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn widget(id: u32, name: &str) -> Widget {
        Widget {
            id,
            name: name.to_string(),
        }
    }

    fn seeded() -> MemoryTable<Widget> {
        MemoryTable::new(
            EqualityPolicy::by_key(),
            &[widget(1, "a"), widget(2, "b")],
        )
    }

    #[test]
    fn new_table_copies_seed() {
        let table = seeded();
        assert_eq!(table.len(), 2);
        assert_eq!(table.change_counts().total(), 0);
        assert!(table.pending_changes().is_empty());
    }

    #[test]
    fn add_appends_and_tracks_insert() {
        let mut table = seeded();
        table.add(widget(3, "c")).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.change_counts().inserts, 1);
        let changes = table.pending_changes();
        assert_eq!(changes.inserts_of::<Widget>().next(), Some(&widget(3, "c")));
    }

    #[test]
    fn add_duplicate_fails() {
        let mut table = seeded();
        let result = table.add(widget(1, "again"));
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn add_checks_the_current_view() {
        let mut table = seeded();
        table.add(widget(3, "c")).unwrap();
        let result = table.add(widget(3, "again"));
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));

        table.remove(widget(1, "a")).unwrap();
        table.add(widget(1, "back")).unwrap();
        let ids: Vec<u32> = table.query().unwrap().map(|w| w.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn update_replaces_first_match() {
        let mut table = seeded();
        table.update(widget(2, "B")).unwrap();

        assert_eq!(table.records()[1], widget(2, "B"));
        assert_eq!(table.change_counts().updates, 1);

        // A second update of the same record stays one pending update
        table.update(widget(2, "BB")).unwrap();
        assert_eq!(table.change_counts().updates, 1);
    }

    #[test]
    fn update_unknown_fails() {
        let mut table = seeded();
        let result = table.update(widget(9, "z"));
        assert!(matches!(result, Err(CoreError::NotTracked { .. })));
    }

    #[test]
    fn remove_deletes_from_view() {
        let mut table = seeded();
        table.remove(widget(1, "ignored")).unwrap();

        let ids: Vec<u32> = table.query().unwrap().map(|w| w.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(table.change_counts().deletes, 1);
    }

    #[test]
    fn remove_of_new_insert_leaves_no_change() {
        let mut table = seeded();
        table.add(widget(3, "c")).unwrap();
        table.update(widget(3, "cc")).unwrap();
        table.remove(widget(3, "cc")).unwrap();

        assert_eq!(table.change_counts().total(), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn remove_after_update_is_a_delete() {
        let mut table = seeded();
        table.update(widget(1, "A")).unwrap();
        table.remove(widget(1, "A")).unwrap();

        let counts = table.change_counts();
        assert_eq!((counts.updates, counts.deletes), (0, 1));
    }

    #[test]
    fn remove_where_uses_current_view() {
        let mut table = seeded();
        table.add(widget(3, "a")).unwrap();

        let removed = table.remove_where(&|w| w.name == "a").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(table.records(), &[widget(2, "b")]);
    }

    #[test]
    fn custom_equality_policy() {
        let by_name = EqualityPolicy::new(|a: &Widget, b: &Widget| a.name == b.name);
        let mut table = MemoryTable::new(by_name, &[widget(1, "a")]);

        table.update(widget(7, "a")).unwrap();
        assert_eq!(table.records(), &[widget(7, "a")]);
    }
}
