//! # picledger Core
//!
//! Records, a derived category index, and queries over an ordered
//! key/value state store.
//!
//! This crate provides:
//! - Record CRUD keyed by id
//! - A `(category, id)` secondary index maintained on every create and delete
//! - Batch owner transfer driven by the index
//! - Range, prefix and predicate queries, with pagination
//! - Per-record version history
//! - JSON rendering of every result type
//! - Name-based dispatch over the operation set
//!
//! The store itself is a [`picledger_state::StateStore`]. All isolation and
//! conflict detection belongs to the store; nothing here locks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatch;
mod error;
mod history;
mod index;
mod ledger;
mod predicate;
mod query;
mod record;
pub mod response;
mod store;

pub use config::{Config, DEFAULT_INDEX_NAME, DEFAULT_KIND};
pub use dispatch::{Operation, Response, ERROR, OK};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use history::{HistoryEntry, HistoryReader};
pub use index::{SecondaryIndex, TransferSummary};
pub use ledger::Ledger;
pub use predicate::PredicateQueries;
pub use query::{Page, PageSize, RangeQueries};
pub use record::{normalize, parse_quantity, Record};
pub use store::RecordStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
