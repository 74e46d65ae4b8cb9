//! Process-wide in-memory record store.

use crate::row::Row;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

type Slots = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

/// Committed records, one immutable sequence per record type.
///
/// Cloning a `MemoryStore` shares the underlying records. A store for a
/// type is created empty on first access, and [`replace`](Self::replace)
/// swaps the whole sequence at once.
///
/// # Thread Safety
///
/// The store is internally synchronized, but two writers replacing the same
/// type race: the last `replace` wins.
///
/// # Example
///
/// ```rust
/// use tabula_storage::{MemoryStore, Row};
///
/// #[derive(Clone)]
/// struct Tag(&'static str);
///
/// impl Row for Tag {
///     type Key = &'static str;
///     fn key(&self) -> &'static str { self.0 }
/// }
///
/// let store = MemoryStore::new();
/// let shared = store.clone();
/// store.replace(vec![Tag("a"), Tag("b")]);
/// assert_eq!(shared.len::<Tag>(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    slots: Arc<RwLock<Slots>>,
}

impl MemoryStore {
    /// Creates a new private store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide store.
    #[must_use]
    pub fn global() -> Self {
        static GLOBAL: OnceLock<MemoryStore> = OnceLock::new();
        GLOBAL.get_or_init(MemoryStore::new).clone()
    }

    /// Returns the committed records for `T`.
    ///
    /// The first access for a type registers an empty sequence.
    pub fn load<T: Row>(&self) -> Arc<[T]> {
        if let Some(records) = self.read::<T>() {
            return records;
        }

        let mut slots = self.slots.write();
        let slot = slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Arc::<[T]>::from(Vec::new())));
        match slot.downcast_ref::<Arc<[T]>>() {
            Some(records) => Arc::clone(records),
            None => {
                // Keyed by the record type, so this only happens if a slot
                // was overwritten with a foreign value.
                let empty = Arc::<[T]>::from(Vec::new());
                *slot = Box::new(Arc::clone(&empty));
                empty
            }
        }
    }

    /// Replaces the committed records for `T`.
    pub fn replace<T: Row>(&self, records: Vec<T>) {
        self.replace_shared(Arc::<[T]>::from(records));
    }

    /// Replaces the committed records for `T` with an existing sequence.
    pub fn replace_shared<T: Row>(&self, records: Arc<[T]>) {
        self.slots
            .write()
            .insert(TypeId::of::<T>(), Box::new(records));
    }

    /// Returns the number of committed records for `T`.
    #[must_use]
    pub fn len<T: Row>(&self) -> usize {
        self.read::<T>().map_or(0, |records| records.len())
    }

    /// Returns true if no records of `T` are committed.
    #[must_use]
    pub fn is_empty<T: Row>(&self) -> bool {
        self.len::<T>() == 0
    }

    /// Checks whether a sequence for `T` has been registered.
    #[must_use]
    pub fn contains<T: Row>(&self) -> bool {
        self.slots.read().contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered record types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.slots.read().len()
    }

    /// Drops every registered sequence.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    fn read<T: Row>(&self) -> Option<Arc<[T]>> {
        self.slots
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<Arc<[T]>>())
            .map(Arc::clone)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("types", &self.type_count())
            .finish()
    }
}
