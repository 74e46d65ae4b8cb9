//! # Tabula Testkit
//!
//! Test utilities for Tabula.
//!
//! This crate provides:
//! - Sample record types and unit-of-work fixtures
//! - Property-based test generators using proptest
//! - A recorder for commit observer calls
//! - Tracing setup for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tabula_testkit::prelude::*;
//!
//! #[test]
//! fn saves_widgets() {
//!     let mut uow = memory_uow();
//!     uow.table::<Widget>()?.add(widget(1, "a"))?;
//!     uow.save()?;
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod observer;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::observer::*;
    pub use tabula_core::{Table, UnitOfWork};
}

pub use fixtures::*;
pub use generators::*;
pub use observer::*;
