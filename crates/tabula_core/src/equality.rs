//! Per-type equality policies.

use std::fmt;
use std::sync::Arc;
use tabula_storage::Row;

/// Decides whether two records are the same record.
///
/// The in-memory backend uses it to locate the stored copy an update or
/// removal refers to. The default compares [`Row::key`].
pub struct EqualityPolicy<T> {
    eq: Arc<dyn Fn(&T, &T) -> bool + Send + Sync>,
}

impl<T> EqualityPolicy<T> {
    /// Creates a policy from a comparison function.
    pub fn new<F>(eq: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self { eq: Arc::new(eq) }
    }

    /// Compares two records.
    #[must_use]
    pub fn equals(&self, a: &T, b: &T) -> bool {
        (self.eq)(a, b)
    }

    /// Returns the index of the first element equal to `item`.
    #[must_use]
    pub fn position(&self, items: &[T], item: &T) -> Option<usize> {
        items.iter().position(|candidate| self.equals(candidate, item))
    }
}

impl<T: Row> EqualityPolicy<T> {
    /// Two records are equal when their keys are.
    #[must_use]
    pub fn by_key() -> Self {
        Self::new(|a: &T, b: &T| a.key() == b.key())
    }
}

impl<T: PartialEq + 'static> EqualityPolicy<T> {
    /// Two records are equal when every field is.
    #[must_use]
    pub fn by_value() -> Self {
        Self::new(|a: &T, b: &T| a == b)
    }
}

impl<T: Row> Default for EqualityPolicy<T> {
    fn default() -> Self {
        Self::by_key()
    }
}

impl<T> Clone for EqualityPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            eq: Arc::clone(&self.eq),
        }
    }
}

impl<T> fmt::Debug for EqualityPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityPolicy").finish_non_exhaustive()
    }
}
