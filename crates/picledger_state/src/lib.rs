//! # picledger State
//!
//! The boundary between picledger and the ordered key/value state store it
//! runs on.
//!
//! The store itself is external. This crate defines what picledger needs
//! from it and nothing more:
//!
//! - point reads, writes and deletes
//! - ordered range scans, optionally paginated
//! - partial-composite-key scans over derived indexes
//! - rich (predicate) queries, when the store supports them
//! - per-key version history
//!
//! ## Available Stores
//!
//! - [`InMemoryStateStore`] - reference store for tests and local runs
//!
//! ## Example
//!
//! ```rust
//! use picledger_state::{InMemoryStateStore, StateStore};
//!
//! let store = InMemoryStateStore::new();
//! store.put_state("p1", br#"{"owner":"tom"}"#).unwrap();
//! let keys: Vec<String> = store
//!     .get_state_by_range("", "")
//!     .unwrap()
//!     .map(|kv| kv.unwrap().key)
//!     .collect();
//! assert_eq!(keys, vec!["p1"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod composite;
mod error;
mod iterator;
mod memory;
mod selector;
mod types;

pub use backend::{PagedResults, StateStore};
pub use composite::{
    composite_key_range, create_composite_key, is_composite_key, split_composite_key,
    CompositeKey, COMPOSITE_KEY_NAMESPACE, MAX_UNICODE_RUNE, MIN_UNICODE_RUNE,
};
pub use error::{StateError, StateResult};
pub use iterator::ResultsIterator;
pub use memory::InMemoryStateStore;
pub use types::{KeyModification, KeyValue, QueryResponseMetadata, TxId, SENTINEL_VALUE};
