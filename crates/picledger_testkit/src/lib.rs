//! # picledger Testkit
//!
//! Test utilities for picledger.
//!
//! This crate provides:
//! - A ledger fixture over an in-memory state store
//! - Seeded scenarios
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use picledger_testkit::prelude::*;
//!
//! with_test_ledger(|ledger| {
//!     ledger.create("p1", "blue", "35", "tom").unwrap();
//!     assert!(ledger.read("p1").is_ok());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
