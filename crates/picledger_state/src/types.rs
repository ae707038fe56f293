//! Values produced by state store iterators.

use chrono::{DateTime, Utc};
use std::fmt;

/// Value written for key-only entries such as secondary index markers.
///
/// A nil value would delete the key, so markers store a single null byte.
pub const SENTINEL_VALUE: &[u8] = &[0x00];

/// One `(key, value)` pair returned by a range or rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// State key.
    pub key: String,
    /// Stored value, verbatim.
    pub value: Vec<u8>,
}

impl KeyValue {
    /// Creates a new key/value pair.
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Identifier of the transaction that wrote a key version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxId(pub String);

impl TxId {
    /// Creates a transaction ID from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One historical version of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    /// Transaction that produced this version.
    pub tx_id: TxId,
    /// Value at this version. Empty for deletions.
    pub value: Vec<u8>,
    /// Commit timestamp of the transaction.
    pub timestamp: DateTime<Utc>,
    /// Whether this version is a deletion.
    pub is_delete: bool,
}

/// Pagination info returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResponseMetadata {
    /// Number of records in this page.
    pub fetched_records_count: i32,
    /// Token to pass back to fetch the next page.
    pub bookmark: String,
}
