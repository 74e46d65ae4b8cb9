//! Deferred, composable queries.

use std::cmp::Ordering;
use std::fmt;

/// A lazy query over a table's current view.
///
/// `Query` is an [`Iterator`], so every standard adapter works on it. The
/// inherent combinators keep the result a `Query`, which lets callers build
/// a pipeline and hand it around before anything is evaluated.
///
/// ```rust
/// use tabula_core::Query;
///
/// let names: Vec<&str> = Query::new(vec![(3, "c"), (1, "a"), (2, "b")])
///     .filter_by(|(n, _)| *n > 1)
///     .order_by(|(n, _)| *n)
///     .select(|(_, name)| name)
///     .collect();
/// assert_eq!(names, vec!["b", "c"]);
/// ```
pub struct Query<'a, T> {
    source: Box<dyn Iterator<Item = T> + 'a>,
}

impl<'a, T: 'a> Query<'a, T> {
    /// Creates a query over `source`.
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self {
            source: Box::new(source.into_iter()),
        }
    }

    /// Creates a query whose rows are only loaded when first polled.
    pub fn deferred<F>(load: F) -> Self
    where
        F: FnOnce() -> Vec<T> + 'a,
    {
        let mut load = Some(load);
        Self::new(
            std::iter::once(()).flat_map(move |()| load.take().map_or_else(Vec::new, |f| f())),
        )
    }

    /// Keeps the rows matching `predicate`.
    #[must_use]
    pub fn filter_by<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + 'a,
    {
        Self::new(self.source.filter(predicate))
    }

    /// Orders rows by ascending key. Ties keep their original order.
    #[must_use]
    pub fn order_by<K, F>(self, mut key: F) -> Self
    where
        K: Ord,
        F: FnMut(&T) -> K + 'a,
    {
        self.sorted(move |a, b| key(a).cmp(&key(b)))
    }

    /// Orders rows by descending key. Ties keep their original order.
    #[must_use]
    pub fn order_by_desc<K, F>(self, mut key: F) -> Self
    where
        K: Ord,
        F: FnMut(&T) -> K + 'a,
    {
        self.sorted(move |a, b| key(b).cmp(&key(a)))
    }

    /// Projects every row through `f`.
    pub fn select<U: 'a, F>(self, f: F) -> Query<'a, U>
    where
        F: FnMut(T) -> U + 'a,
    {
        Query::new(self.source.map(f))
    }

    fn sorted<C>(self, mut compare: C) -> Self
    where
        C: FnMut(&T, &T) -> Ordering + 'a,
    {
        let source = self.source;
        Self::deferred(move || {
            let mut rows: Vec<T> = source.collect();
            rows.sort_by(|a, b| compare(a, b));
            rows
        })
    }
}

impl<T> Iterator for Query<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.source.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.source.size_hint()
    }
}

impl<T> fmt::Debug for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").finish_non_exhaustive()
    }
}
