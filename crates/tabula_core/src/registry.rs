//! Type-keyed registry of per-record-type slots.

use crate::error::{CoreError, CoreResult};
use std::any::{Any, TypeId};
use std::collections::hash_map::ValuesMut;
use std::collections::HashMap;
use tabula_storage::{ChangeCounts, ChangeSet, MemoryStore};

/// Uniform view of a per-type slot.
///
/// Everything a unit of work does across all types at once goes through
/// this trait; typed access happens only in [`SlotRegistry::slot_mut`].
pub(crate) trait ErasedSlot: Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Writes the live table, if any, to `store` and drops it.
    fn commit(&mut self, store: &MemoryStore) -> Option<ChangeCounts>;

    /// Appends the live table's staged changes.
    fn export_changes(&self, changes: &mut ChangeSet);
}

/// Slots keyed by their own concrete type.
pub(crate) struct SlotRegistry {
    slots: HashMap<TypeId, Box<dyn ErasedSlot>>,
}

impl SlotRegistry {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the slot of type `S`, if one was registered.
    pub(crate) fn slot<S: ErasedSlot + 'static>(&self) -> Option<&S> {
        self.slots
            .get(&TypeId::of::<S>())
            .and_then(|slot| slot.as_any().downcast_ref::<S>())
    }

    /// Returns the slot of type `S`, registering `make()` on first use.
    pub(crate) fn slot_mut<S, F>(&mut self, make: F) -> CoreResult<&mut S>
    where
        S: ErasedSlot + 'static,
        F: FnOnce() -> S,
    {
        self.slots
            .entry(TypeId::of::<S>())
            .or_insert_with(|| Box::new(make()))
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(CoreError::registry_corrupted::<S>)
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = &dyn ErasedSlot> {
        self.slots.values().map(|slot| slot.as_ref())
    }

    pub(crate) fn slots_mut(&mut self) -> ValuesMut<'_, TypeId, Box<dyn ErasedSlot>> {
        self.slots.values_mut()
    }
}
