//! The primary record entity.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// A picture record, stored as JSON under its `id`.
///
/// `category` and `owner` are lower-cased on construction and on every owner
/// change so index keys and query selectors compare stably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Entity kind, serialized as `docType`.
    #[serde(rename = "docType")]
    pub kind: String,
    /// Unique identifier and primary key.
    pub id: String,
    /// Indexed attribute.
    pub category: String,
    /// Non-negative size.
    pub quantity: u64,
    /// Current holder.
    pub owner: String,
}

impl Record {
    /// Creates a record, normalizing `category` and `owner`.
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<String>,
        category: &str,
        quantity: u64,
        owner: &str,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            category: normalize(category),
            quantity,
            owner: normalize(owner),
        }
    }

    /// Replaces the owner, normalizing it.
    pub fn set_owner(&mut self, owner: &str) {
        self.owner = normalize(owner);
    }

    /// Encodes the record as JSON.
    pub fn to_json(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a record stored under `id`.
    pub fn from_json(id: &str, bytes: &[u8]) -> CoreResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| CoreError::serialization(format!("failed to decode record {id}: {e}")))
    }
}

/// Canonical case for `category` and `owner` values.
pub fn normalize(value: &str) -> String {
    value.to_lowercase()
}

/// Parses a caller-supplied quantity.
pub fn parse_quantity(raw: &str) -> CoreResult<u64> {
    raw.parse::<u64>().map_err(|_| {
        CoreError::invalid_argument(format!(
            "quantity must be a non-negative integer, got {raw:?}"
        ))
    })
}
