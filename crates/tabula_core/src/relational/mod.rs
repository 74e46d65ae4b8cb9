//! Relational backend.
//!
//! [`RelationalUnitOfWork`] adapts any [`Driver`] to the [`UnitOfWork`]
//! contract. The driver keeps one native collection per record type and
//! owns change tracking; this layer only chooses the table variant, runs
//! the commit observer and submits.

mod table;

pub use table::DriverTable;

use crate::config::Config;
use crate::entity::{DeletionPolicy, Entity};
use crate::error::CoreResult;
use crate::table::TableHandle;
use crate::unit_of_work::{SaveReport, UnitOfWork};
use std::fmt;
use std::sync::Arc;
use tabula_storage::{ChangeSet, Driver};
use tracing::{debug, info, warn};

/// Callback run before a non-empty change set is submitted.
///
/// Observers get read-only access to the unit of work and cannot veto the
/// save. The observer stays registered while it runs, so a panicking
/// observer is still in place for the next save.
pub type CommitObserver<D> = Arc<dyn Fn(&RelationalUnitOfWork<D>, &ChangeSet) + Send + Sync>;

/// A unit of work over a relational driver.
///
/// # Example
///
/// ```rust
/// use tabula_core::{Entity, HardDelete, MemoryDatabase, RelationalUnitOfWork, Row, UnitOfWork};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Widget { id: u32, name: String }
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
/// let database = MemoryDatabase::new();
/// let mut uow = RelationalUnitOfWork::new(database.connect());
/// if !uow.can_connect().unwrap() {
///     uow.initialize_database().unwrap();
/// }
///
/// uow.on_commit(|_, changes| println!("committing {} rows", changes.counts().total()));
/// uow.table::<Widget>().unwrap().add(Widget { id: 1, name: "a".into() }).unwrap();
/// let report = uow.save().unwrap();
///
/// assert!(report.is_clean());
/// assert_eq!(database.rows::<Widget>().len(), 1);
/// ```
pub struct RelationalUnitOfWork<D: Driver> {
    driver: D,
    config: Config,
    observer: Option<CommitObserver<D>>,
}

impl<D: Driver> RelationalUnitOfWork<D> {
    /// Creates a unit of work over `driver` with default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, Config::default())
    }

    /// Creates a unit of work over `driver`.
    pub fn with_config(driver: D, config: Config) -> Self {
        Self {
            driver,
            config,
            observer: None,
        }
    }

    /// Returns the driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns the driver mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Consumes the unit of work and returns its driver.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Checks whether the target store exists.
    pub fn can_connect(&self) -> CoreResult<bool> {
        Ok(self.driver.store_exists()?)
    }

    /// Creates the target store.
    ///
    /// # Errors
    ///
    /// Driver failures, including an already existing store, are returned
    /// as [`crate::CoreError::Storage`].
    pub fn initialize_database(&mut self) -> CoreResult<()> {
        self.driver.create_store()?;
        info!("initialized relational store");
        Ok(())
    }

    /// Registers the commit observer, replacing any previous one.
    ///
    /// The change set is only enumerated when an observer is registered.
    pub fn on_commit<F>(&mut self, observer: F)
    where
        F: Fn(&RelationalUnitOfWork<D>, &ChangeSet) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
    }

    /// Removes the commit observer.
    pub fn clear_on_commit(&mut self) {
        self.observer = None;
    }

    /// Checks whether a commit observer is registered.
    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Returns every change staged in the driver.
    pub fn pending_changes(&self) -> CoreResult<ChangeSet> {
        Ok(self.driver.pending_changes()?)
    }

    fn notify(&self) -> CoreResult<()> {
        let Some(observer) = &self.observer else {
            return Ok(());
        };
        let changes = self.driver.pending_changes()?;
        if changes.is_empty() {
            return Ok(());
        }

        let counts = changes.counts();
        debug!(
            inserts = counts.inserts,
            updates = counts.updates,
            deletes = counts.deletes,
            "notifying commit observer"
        );
        (**observer)(self, &changes);
        Ok(())
    }
}

impl<D: Driver> UnitOfWork for RelationalUnitOfWork<D> {
    fn table<T: Entity>(&mut self) -> CoreResult<TableHandle<'_, T>> {
        let native = self.driver.collection::<T>()?;
        debug!(
            record_type = std::any::type_name::<T>(),
            soft_delete = <T::Deletion as DeletionPolicy<T>>::SOFT,
            "opened driver table"
        );
        Ok(<T::Deletion as DeletionPolicy<T>>::wrap(DriverTable::new(native)))
    }

    /// Notifies the observer, if any, then submits.
    ///
    /// # Errors
    ///
    /// With an observer registered, a failure to enumerate the change set
    /// aborts the save before anything is submitted.
    fn save(&mut self) -> CoreResult<SaveReport> {
        self.notify()?;

        let submitted = self.driver.submit_changes(self.config.conflict_mode)?;
        for conflict in &submitted.conflicts {
            warn!(%conflict, "row skipped on submit");
        }

        let report = SaveReport {
            changes: submitted.changes,
            applied: submitted.applied,
            conflicts: submitted.conflicts,
        };
        info!(
            applied = report.applied,
            conflicts = report.conflicts.len(),
            "saved relational unit of work"
        );
        Ok(report)
    }
}

impl<D: Driver + fmt::Debug> fmt::Debug for RelationalUnitOfWork<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalUnitOfWork")
            .field("driver", &self.driver)
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
