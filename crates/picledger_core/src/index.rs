//! Secondary index over the record `category`.
//!
//! The index is a set of key-only entries in the same state store as the
//! records:
//!
//! ```text
//! key   = composite(index_name, [category, id])
//! value = SENTINEL_VALUE
//! ```
//!
//! An entry exists exactly when a record with that `(category, id)` exists.
//! [`SecondaryIndex`] is the only code path that creates or deletes records,
//! so the pair is always written and removed together.
//!
//! Scans over the index are partial-composite-key range scans. Stores with
//! an endorse/commit pipeline re-run those scans at commit time, which is
//! what makes [`SecondaryIndex::transfer_by_category`] safe to base writes
//! on; nothing here re-implements that check.

use crate::error::{CoreError, CoreResult};
use crate::record::{normalize, Record};
use crate::store::RecordStore;
use picledger_state::{
    create_composite_key, split_composite_key, KeyValue, ResultsIterator, SENTINEL_VALUE,
};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Outcome of a successful [`SecondaryIndex::transfer_by_category`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    /// Entity kind of the transferred records.
    pub kind: String,
    /// Category that was transferred (normalized).
    pub category: String,
    /// New owner (normalized).
    pub new_owner: String,
    /// Number of records transferred.
    pub transferred: usize,
}

impl fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transferred {} {} {}s to {}",
            self.transferred, self.category, self.kind, self.new_owner
        )
    }
}

/// Maintains the `(category, id)` index alongside the record store.
#[derive(Debug, Clone)]
pub struct SecondaryIndex {
    records: RecordStore,
    name: String,
}

impl SecondaryIndex {
    /// Creates an index named `name` over `records`.
    pub fn new(records: RecordStore, name: impl Into<String>) -> Self {
        Self {
            records,
            name: name.into(),
        }
    }

    /// Returns the index name (composite key object type).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the record store this index wraps.
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Builds the index key for a `(category, id)` pair.
    pub fn entry_key(&self, category: &str, id: &str) -> CoreResult<String> {
        Ok(create_composite_key(&self.name, &[category, id])?)
    }

    /// Creates a record and its index entry.
    ///
    /// The store offers no transaction spanning both writes. If the index
    /// write fails, the just-created record is deleted again and the index
    /// failure is returned.
    pub fn create(&self, record: &Record) -> CoreResult<()> {
        let key = self.entry_key(&record.category, &record.id)?;
        self.records.create(record)?;

        if let Err(err) = self.records.state().put_state(&key, SENTINEL_VALUE) {
            warn!(id = %record.id, error = %err, "index write failed, removing record");
            if let Err(undo) = self.records.state().del_state(&record.id) {
                error!(id = %record.id, error = %undo, "failed to remove unindexed record");
            }
            return Err(err.into());
        }

        info!(id = %record.id, category = %record.category, "record created and indexed");
        Ok(())
    }

    /// Deletes a record and its index entry.
    ///
    /// The record is read first to recover its category; if it cannot be
    /// read, nothing is mutated. Returns the deleted record.
    pub fn delete(&self, id: &str) -> CoreResult<Record> {
        let record = self.records.read(id)?;
        let key = self.entry_key(&record.category, &record.id)?;

        self.records.delete(id)?;
        self.records.state().del_state(&key)?;

        info!(id = %id, category = %record.category, "record deleted and unindexed");
        Ok(record)
    }

    /// Scans every index entry for `category`, in id order.
    ///
    /// `category` is normalized before the scan, like every stored category.
    pub fn scan(&self, category: &str) -> CoreResult<ResultsIterator<KeyValue>> {
        let category = normalize(category);
        Ok(self
            .records
            .state()
            .get_state_by_partial_composite_key(&self.name, &[&category])?)
    }

    /// Returns the ids of every record in `category`, in index order.
    pub fn ids(&self, category: &str) -> CoreResult<Vec<String>> {
        self.scan(category)?
            .map(|entry| self.id_from_entry(&entry?))
            .collect()
    }

    /// Transfers every record of `category` to `new_owner`.
    ///
    /// Records are processed one at a time in index order. The first failed
    /// transfer stops the batch with [`CoreError::TransferAborted`];
    /// records transferred before it keep their new owner.
    pub fn transfer_by_category(
        &self,
        category: &str,
        new_owner: &str,
    ) -> CoreResult<TransferSummary> {
        let category = normalize(category);
        let new_owner = normalize(new_owner);
        debug!(category = %category, owner = %new_owner, "starting category transfer");

        let mut transferred = 0;
        for entry in self.scan(&category)? {
            let outcome = entry
                .map_err(CoreError::from)
                .and_then(|kv| self.id_from_entry(&kv))
                .and_then(|id| self.records.transfer(&id, &new_owner));

            if let Err(source) = outcome {
                warn!(
                    category = %category,
                    transferred,
                    error = %source,
                    "category transfer aborted"
                );
                return Err(CoreError::TransferAborted {
                    transferred,
                    source: Box::new(source),
                });
            }
            transferred += 1;
        }

        let summary = TransferSummary {
            kind: self.records.kind().to_string(),
            category,
            new_owner,
            transferred,
        };
        info!(%summary, "category transfer finished");
        Ok(summary)
    }

    fn id_from_entry(&self, entry: &KeyValue) -> CoreResult<String> {
        let (object_type, mut attributes) = split_composite_key(&entry.key)?;
        if object_type != self.name || attributes.len() != 2 {
            return Err(CoreError::serialization(format!(
                "malformed index entry {:?}",
                entry.key
            )));
        }
        Ok(attributes.swap_remove(1))
    }
}
