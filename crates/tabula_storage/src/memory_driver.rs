//! In-process driver with relational semantics.

use crate::backend::{ConflictMode, Driver, NativeCollection};
use crate::changes::{
    ChangeCounts, ChangeSet, ChangedRow, ConflictKind, RowConflict, SubmitReport,
};
use crate::error::{StorageError, StorageResult};
use crate::row::Row;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A committed row and the version it was written at.
#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    row: T,
}

#[derive(Default)]
struct DatabaseState {
    created: bool,
    last_version: u64,
    tables: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DatabaseState {
    fn committed<T: Row>(&self) -> Option<&Vec<Versioned<T>>> {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|table| table.downcast_ref::<Vec<Versioned<T>>>())
    }

    fn committed_mut<T: Row>(&mut self) -> StorageResult<&mut Vec<Versioned<T>>> {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<Versioned<T>>::new()))
            .downcast_mut::<Vec<Versioned<T>>>()
            .ok_or_else(|| {
                StorageError::Corrupted(format!(
                    "table slot for {} holds another type",
                    std::any::type_name::<T>()
                ))
            })
    }

    fn version_of<T: Row>(&self, key: &T::Key) -> Option<u64> {
        self.committed::<T>()?
            .iter()
            .find(|entry| &entry.row.key() == key)
            .map(|entry| entry.version)
    }

    fn next_version(&mut self) -> u64 {
        self.last_version += 1;
        self.last_version
    }
}

/// Shared state behind one or more [`MemoryDriver`] connections.
///
/// Every connection made with [`connect`](Self::connect) sees the same
/// committed rows but keeps its own staged changes, so two connections can
/// produce real row conflicts.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<RwLock<DatabaseState>>,
}

impl MemoryDatabase {
    /// Creates a database whose store has not been created yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database whose store already exists.
    #[must_use]
    pub fn created() -> Self {
        let database = Self::new();
        database.state.write().created = true;
        database
    }

    /// Checks whether the store exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.state.read().created
    }

    /// Opens a new connection.
    #[must_use]
    pub fn connect(&self) -> MemoryDriver {
        MemoryDriver {
            database: self.clone(),
            collections: HashMap::new(),
        }
    }

    /// Writes `rows` directly as committed rows, bypassing staging.
    ///
    /// Existing rows of `T` are replaced.
    pub fn seed<T: Row>(&self, rows: Vec<T>) -> StorageResult<()> {
        let mut state = self.state.write();
        let versioned: Vec<Versioned<T>> = rows
            .into_iter()
            .map(|row| Versioned {
                version: state.next_version(),
                row,
            })
            .collect();
        *state.committed_mut::<T>()? = versioned;
        Ok(())
    }

    /// Returns the committed rows of `T`.
    #[must_use]
    pub fn rows<T: Row>(&self) -> Vec<T> {
        self.state.read().committed::<T>().map_or_else(Vec::new, |entries| {
            entries.iter().map(|entry| entry.row.clone()).collect()
        })
    }

    /// Returns the committed version of the row with `key`.
    #[must_use]
    pub fn version<T: Row>(&self, key: &T::Key) -> Option<u64> {
        self.state.read().version_of::<T>(key)
    }
}

impl fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryDatabase")
            .field("created", &state.created)
            .field("tables", &state.tables.len())
            .finish()
    }
}

/// A staged update or delete, with the version it was staged against.
struct Tracked<T> {
    row: T,
    base: Option<u64>,
}

/// Per-type staging area of one connection.
struct StagedCollection<T: Row> {
    database: MemoryDatabase,
    inserts: Vec<T>,
    updates: Vec<Tracked<T>>,
    deletes: Vec<Tracked<T>>,
}

impl<T: Row> StagedCollection<T> {
    fn new(database: MemoryDatabase) -> Self {
        Self {
            database,
            inserts: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
        }
    }

    fn conflict(&self, key: &T::Key, kind: ConflictKind) -> RowConflict {
        RowConflict {
            type_name: std::any::type_name::<T>(),
            key: format!("{key:?}"),
            kind,
        }
    }

    fn insert_conflict(&self, state: &DatabaseState, row: &T) -> Option<RowConflict> {
        let key = row.key();
        state
            .version_of::<T>(&key)
            .map(|_| self.conflict(&key, ConflictKind::DuplicateKey))
    }

    fn tracked_conflict(&self, state: &DatabaseState, tracked: &Tracked<T>) -> Option<RowConflict> {
        let key = tracked.row.key();
        match state.version_of::<T>(&key) {
            None => Some(self.conflict(&key, ConflictKind::RowMissing)),
            Some(actual) if Some(actual) != tracked.base => Some(self.conflict(
                &key,
                ConflictKind::RowChanged {
                    expected: tracked.base,
                    actual,
                },
            )),
            Some(_) => None,
        }
    }
}

impl<T: Row> NativeCollection<T> for StagedCollection<T> {
    fn insert_on_submit(&mut self, row: T) -> StorageResult<()> {
        let key = row.key();
        if self.inserts.iter().any(|pending| pending.key() == key) {
            return Err(StorageError::duplicate_pending(
                std::any::type_name::<T>(),
                key,
            ));
        }

        // Deleting a row and adding it back is a replacement
        if let Some(index) = self.deletes.iter().position(|t| t.row.key() == key) {
            let base = self.deletes.remove(index).base;
            self.updates.push(Tracked { row, base });
            return Ok(());
        }

        self.inserts.push(row);
        Ok(())
    }

    fn attach_modified(&mut self, row: T) -> StorageResult<()> {
        let key = row.key();

        // Modifying a pending insert just changes what gets inserted
        if let Some(pending) = self.inserts.iter_mut().find(|p| p.key() == key) {
            *pending = row;
            return Ok(());
        }

        if let Some(tracked) = self.updates.iter_mut().find(|t| t.row.key() == key) {
            tracked.row = row;
            return Ok(());
        }

        let base = self.database.version::<T>(&key);
        self.updates.push(Tracked { row, base });
        Ok(())
    }

    fn delete_on_submit(&mut self, row: T) -> StorageResult<()> {
        let key = row.key();

        if let Some(index) = self.inserts.iter().position(|p| p.key() == key) {
            self.inserts.remove(index);
            return Ok(());
        }

        if self.deletes.iter().any(|t| t.row.key() == key) {
            return Ok(());
        }

        let base = match self.updates.iter().position(|t| t.row.key() == key) {
            Some(index) => self.updates.remove(index).base,
            None => self.database.version::<T>(&key),
        };
        self.deletes.push(Tracked { row, base });
        Ok(())
    }

    fn rows(&self) -> StorageResult<Vec<T>> {
        Ok(self.database.rows::<T>())
    }
}

/// Type-erased view of a [`StagedCollection`], used at submit time.
trait Staging: Send {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn export(&self, changes: &mut ChangeSet);
    fn check(&self, state: &DatabaseState, conflicts: &mut Vec<RowConflict>);
    fn apply(&mut self, state: &mut DatabaseState, report: &mut SubmitReport)
        -> StorageResult<()>;
}

impl<T: Row> Staging for StagedCollection<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn export(&self, changes: &mut ChangeSet) {
        changes
            .inserts
            .extend(self.inserts.iter().cloned().map(ChangedRow::new));
        changes
            .updates
            .extend(self.updates.iter().map(|t| ChangedRow::new(t.row.clone())));
        changes
            .deletes
            .extend(self.deletes.iter().map(|t| ChangedRow::new(t.row.clone())));
    }

    fn check(&self, state: &DatabaseState, conflicts: &mut Vec<RowConflict>) {
        conflicts.extend(self.inserts.iter().filter_map(|r| self.insert_conflict(state, r)));
        conflicts.extend(self.updates.iter().filter_map(|t| self.tracked_conflict(state, t)));
        conflicts.extend(self.deletes.iter().filter_map(|t| self.tracked_conflict(state, t)));
    }

    fn apply(
        &mut self,
        state: &mut DatabaseState,
        report: &mut SubmitReport,
    ) -> StorageResult<()> {
        report.changes += ChangeCounts {
            inserts: self.inserts.len(),
            updates: self.updates.len(),
            deletes: self.deletes.len(),
        };

        for row in std::mem::take(&mut self.inserts) {
            if let Some(conflict) = self.insert_conflict(state, &row) {
                report.conflicts.push(conflict);
                continue;
            }
            let version = state.next_version();
            state.committed_mut::<T>()?.push(Versioned { version, row });
            report.applied += 1;
        }

        for tracked in std::mem::take(&mut self.updates) {
            if let Some(conflict) = self.tracked_conflict(state, &tracked) {
                report.conflicts.push(conflict);
                continue;
            }
            let key = tracked.row.key();
            let version = state.next_version();
            if let Some(entry) = state
                .committed_mut::<T>()?
                .iter_mut()
                .find(|entry| entry.row.key() == key)
            {
                entry.version = version;
                entry.row = tracked.row;
                report.applied += 1;
            }
        }

        for tracked in std::mem::take(&mut self.deletes) {
            if let Some(conflict) = self.tracked_conflict(state, &tracked) {
                report.conflicts.push(conflict);
                continue;
            }
            let key = tracked.row.key();
            let committed = state.committed_mut::<T>()?;
            committed.retain(|entry| entry.row.key() != key);
            report.applied += 1;
        }

        Ok(())
    }
}

/// A connection to a [`MemoryDatabase`].
///
/// Mirrors how a relational driver behaves: each record type gets one
/// native collection per connection, changes stay staged until
/// [`submit_changes`](Driver::submit_changes), and queries only see
/// committed rows.
///
/// # Example
///
/// ```rust
/// use tabula_storage::{ConflictMode, Driver, MemoryDatabase, NativeCollection, Row};
///
/// #[derive(Clone)]
/// struct Account { id: u32, balance: i64 }
///
/// impl Row for Account {
///     type Key = u32;
///     fn key(&self) -> u32 { self.id }
/// }
///
/// let database = MemoryDatabase::created();
/// let mut driver = database.connect();
/// driver
///     .collection::<Account>()
///     .unwrap()
///     .insert_on_submit(Account { id: 1, balance: 10 })
///     .unwrap();
/// assert_eq!(driver.pending_changes().unwrap().counts().inserts, 1);
///
/// let report = driver.submit_changes(ConflictMode::ContinueOnConflict).unwrap();
/// assert_eq!(report.applied, 1);
/// assert_eq!(database.rows::<Account>().len(), 1);
/// ```
pub struct MemoryDriver {
    database: MemoryDatabase,
    collections: HashMap<TypeId, Box<dyn Staging>>,
}

impl MemoryDriver {
    /// Returns the database this connection writes to.
    #[must_use]
    pub fn database(&self) -> &MemoryDatabase {
        &self.database
    }
}

impl fmt::Debug for MemoryDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDriver")
            .field("database", &self.database)
            .field("collections", &self.collections.len())
            .finish()
    }
}

impl Driver for MemoryDriver {
    fn store_exists(&self) -> StorageResult<bool> {
        Ok(self.database.exists())
    }

    fn create_store(&mut self) -> StorageResult<()> {
        let mut state = self.database.state.write();
        if state.created {
            return Err(StorageError::StoreExists);
        }
        state.created = true;
        Ok(())
    }

    fn pending_changes(&self) -> StorageResult<ChangeSet> {
        let mut changes = ChangeSet::new();
        for collection in self.collections.values() {
            collection.export(&mut changes);
        }
        Ok(changes)
    }

    fn submit_changes(&mut self, mode: ConflictMode) -> StorageResult<SubmitReport> {
        let mut state = self.database.state.write();
        if !state.created {
            return Err(StorageError::StoreMissing);
        }

        if mode == ConflictMode::FailOnFirstConflict {
            let mut conflicts = Vec::new();
            for collection in self.collections.values() {
                collection.check(&state, &mut conflicts);
            }
            if let Some(conflict) = conflicts.into_iter().next() {
                return Err(StorageError::Conflict(conflict));
            }
        }

        let mut report = SubmitReport::default();
        for collection in self.collections.values_mut() {
            collection.apply(&mut state, &mut report)?;
        }
        Ok(report)
    }

    fn collection<T: Row>(&mut self) -> StorageResult<&mut dyn NativeCollection<T>> {
        let database = self.database.clone();
        self.collections
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(StagedCollection::<T>::new(database)))
            .as_any_mut()
            .downcast_mut::<StagedCollection<T>>()
            .map(|collection| collection as &mut dyn NativeCollection<T>)
            .ok_or_else(|| {
                StorageError::Corrupted(format!(
                    "collection slot for {} holds another type",
                    std::any::type_name::<T>()
                ))
            })
    }
}
