//! In-memory backend.
//!
//! Committed records live in a [`MemoryStore`](tabula_storage::MemoryStore)
//! that outlives any single unit of work. Each unit of work works on
//! private copies and writes them back on save.

mod table;
mod unit_of_work;

pub use table::MemoryTable;
pub use unit_of_work::MemoryUnitOfWork;
