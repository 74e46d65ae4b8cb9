//! Row identity.

use std::fmt::Debug;
use std::hash::Hash;

/// A record that can be held by a store or driver.
///
/// The key is the record's identity. Two rows with equal keys are the same
/// logical record, whatever their other fields say. Stores and drivers use
/// it to locate rows for update and delete.
pub trait Row: Clone + Send + Sync + 'static {
    /// The identity type.
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Returns the row's stable identity.
    fn key(&self) -> Self::Key;
}
