//! # Tabula Storage
//!
//! Backing store layer for Tabula.
//!
//! This crate provides the lowest-level persistence abstraction for Tabula.
//! It knows nothing about tables or units of work; it only holds committed
//! rows and tracks the changes a driver has been asked to apply.
//!
//! ## Design Principles
//!
//! - Rows carry their own identity through [`Row::key`]
//! - Drivers own change tracking and conflict detection
//! - Change sets are type-erased so observers can inspect every table at once
//! - Stores are internally synchronized and cheap to clone
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - Process-lifetime committed records per type
//! - [`MemoryDriver`] - In-process [`Driver`] with relational semantics
//!
//! ## Example
//!
//! ```rust
//! use tabula_storage::{MemoryStore, Row};
//!
//! #[derive(Clone)]
//! struct Note { id: u32 }
//!
//! impl Row for Note {
//!     type Key = u32;
//!     fn key(&self) -> u32 { self.id }
//! }
//!
//! let store = MemoryStore::new();
//! assert!(store.load::<Note>().is_empty());
//! store.replace(vec![Note { id: 1 }]);
//! assert_eq!(store.len::<Note>(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod changes;
mod error;
mod memory;
mod memory_driver;
mod row;

pub use backend::{ConflictMode, Driver, NativeCollection};
pub use changes::{
    ChangeCounts, ChangeSet, ChangedRow, ConflictKind, RowConflict, SubmitReport,
};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use memory_driver::{MemoryDatabase, MemoryDriver};
pub use row::Row;
