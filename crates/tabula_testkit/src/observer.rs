//! Recording commit observer calls.

use parking_lot::Mutex;
use std::sync::Arc;
use tabula_core::{ChangeCounts, MemoryDriver, RelationalUnitOfWork, Row};

/// One observer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedCommit {
    /// Pending changes handed to the observer.
    pub counts: ChangeCounts,
    /// Committed rows of the watched type at the time of the call.
    pub committed: usize,
}

/// Records every call made to a commit observer.
///
/// Clones share the same log, so a test keeps one clone and hands the
/// other to [`attach`](Self::attach).
#[derive(Debug, Clone, Default)]
pub struct CommitRecorder {
    commits: Arc<Mutex<Vec<ObservedCommit>>>,
}

impl CommitRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer on `uow` that records each call.
    ///
    /// `T` is the record type whose committed row count is captured, which
    /// shows whether the observer ran before or after submission.
    pub fn attach<T: Row>(&self, uow: &mut RelationalUnitOfWork<MemoryDriver>) {
        let commits = Arc::clone(&self.commits);
        uow.on_commit(move |uow, changes| {
            let observed = ObservedCommit {
                counts: changes.counts(),
                committed: uow.driver().database().rows::<T>().len(),
            };
            tracing::trace!(?observed, "observer called");
            commits.lock().push(observed);
        });
    }

    /// Returns the number of observer calls.
    pub fn calls(&self) -> usize {
        self.commits.lock().len()
    }

    /// Returns every recorded call.
    pub fn commits(&self) -> Vec<ObservedCommit> {
        self.commits.lock().clone()
    }

    /// Returns the most recent call.
    pub fn last(&self) -> Option<ObservedCommit> {
        self.commits.lock().last().copied()
    }
}
