//! # Tabula Core
//!
//! Storage-agnostic tables and units of work.
//!
//! This crate provides:
//! - The [`Table`] contract: add, update, remove, remove-where and query
//! - [`SoftDeleteTable`], which turns removal into a flag flip
//! - [`MemoryUnitOfWork`], backed by a process-wide [`MemoryStore`]
//! - [`RelationalUnitOfWork`], an adapter over any [`Driver`]
//!
//! Client code is written against [`UnitOfWork`] and never learns which
//! backend it runs on:
//!
//! ```rust
//! use tabula_core::{Entity, HardDelete, MemoryUnitOfWork, Row, UnitOfWork};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Widget { id: u32, name: String }
//!
//! impl Row for Widget {
//!     type Key = u32;
//!     fn key(&self) -> u32 { self.id }
//! }
//!
//! impl Entity for Widget {
//!     type Deletion = HardDelete;
//! }
//!
//! fn rename<U: UnitOfWork>(uow: &mut U, id: u32, name: &str) -> tabula_core::CoreResult<()> {
//!     let mut widgets = uow.table::<Widget>()?;
//!     let found = widgets.query()?.find(|w| w.id == id);
//!     if let Some(mut widget) = found {
//!         widget.name = name.to_string();
//!         widgets.update(widget)?;
//!     }
//!     drop(widgets);
//!     uow.save()?;
//!     Ok(())
//! }
//!
//! let mut uow = MemoryUnitOfWork::with_store(tabula_core::MemoryStore::new());
//! uow.populate_table(vec![Widget { id: 1, name: "a".into() }]).unwrap();
//! rename(&mut uow, 1, "b").unwrap();
//! assert_eq!(uow.table::<Widget>().unwrap().query().unwrap().next().unwrap().name, "b");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entity;
mod equality;
mod error;
pub mod memory;
pub mod relational;
mod registry;
pub mod table;
mod unit_of_work;

pub use config::Config;
pub use entity::{DeletionPolicy, Entity, HardDelete, SoftDelete, SoftDeletion};
pub use equality::EqualityPolicy;
pub use error::{CoreError, CoreResult};
pub use memory::{MemoryTable, MemoryUnitOfWork};
pub use relational::{DriverTable, RelationalUnitOfWork};
pub use table::{Query, SoftDeleteTable, Table, TableHandle};
pub use unit_of_work::{SaveReport, UnitOfWork};

pub use tabula_storage::{
    ChangeCounts, ChangeSet, ChangedRow, ConflictKind, ConflictMode, Driver, MemoryDatabase,
    MemoryDriver, MemoryStore, NativeCollection, Row, RowConflict, StorageError, SubmitReport,
};
