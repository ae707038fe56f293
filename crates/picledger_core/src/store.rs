//! Record store for CRUD operations on primary records.

use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use picledger_state::StateStore;
use std::sync::Arc;
use tracing::{debug, info};

/// CRUD over primary records keyed by id.
///
/// The `RecordStore` only touches the primary keyspace. Index maintenance
/// belongs to [`SecondaryIndex`](crate::SecondaryIndex), which wraps this
/// store; code that creates or deletes records should go through it.
#[derive(Clone)]
pub struct RecordStore {
    state: Arc<dyn StateStore>,
    kind: String,
}

impl RecordStore {
    /// Creates a record store over `state` for entities of `kind`.
    pub fn new(state: Arc<dyn StateStore>, kind: impl Into<String>) -> Self {
        Self {
            state,
            kind: kind.into(),
        }
    }

    /// Returns the entity kind written into new records.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the underlying state store.
    pub(crate) fn state(&self) -> &Arc<dyn StateStore> {
        &self.state
    }

    /// Checks whether a record exists.
    pub fn exists(&self, id: &str) -> CoreResult<bool> {
        Ok(self.state.get_state(id)?.is_some())
    }

    /// Persists a new record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyExists`] if `record.id` is taken; the
    /// existing record is left untouched.
    pub fn create(&self, record: &Record) -> CoreResult<()> {
        if self.exists(&record.id)? {
            debug!(id = %record.id, "record already exists");
            return Err(CoreError::already_exists(&record.id));
        }
        self.state.put_state(&record.id, &record.to_json()?)?;
        Ok(())
    }

    /// Returns the stored bytes of a record, verbatim.
    pub fn read_raw(&self, id: &str) -> CoreResult<Vec<u8>> {
        self.state
            .get_state(id)?
            .ok_or_else(|| CoreError::not_found(id))
    }

    /// Reads and decodes a record.
    pub fn read(&self, id: &str) -> CoreResult<Record> {
        let bytes = self.read_raw(id)?;
        Record::from_json(id, &bytes)
    }

    /// Overwrites a record by id without an existence check.
    pub fn update(&self, record: &Record) -> CoreResult<()> {
        self.state.put_state(&record.id, &record.to_json()?)?;
        Ok(())
    }

    /// Removes a primary record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] without touching the store if the
    /// record is absent.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        if !self.exists(id)? {
            return Err(CoreError::not_found(id));
        }
        self.state.del_state(id)?;
        Ok(())
    }

    /// Sets a new owner on one record (read, modify, write back).
    pub fn transfer(&self, id: &str, new_owner: &str) -> CoreResult<Record> {
        let mut record = self.read(id)?;
        record.set_owner(new_owner);
        self.update(&record)?;
        info!(id = %id, owner = %record.owner, "record transferred");
        Ok(record)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use picledger_state::InMemoryStateStore;

    fn create_store() -> (Arc<InMemoryStateStore>, RecordStore) {
        let state = Arc::new(InMemoryStateStore::new());
        let store = RecordStore::new(state.clone(), "picture");
        (state, store)
    }

    fn picture(id: &str, category: &str, owner: &str) -> Record {
        Record::new("picture", id, category, 35, owner)
    }

    #[test]
    fn create_then_read() {
        let (_, store) = create_store();
        let record = picture("p1", "blue", "tom");
        store.create(&record).unwrap();
        assert_eq!(store.read("p1").unwrap(), record);
    }

    #[test]
    fn create_collision_leaves_existing_record() {
        let (_, store) = create_store();
        store.create(&picture("p1", "blue", "tom")).unwrap();

        let err = store.create(&picture("p1", "red", "jerry")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(store.read("p1").unwrap().category, "blue");
    }

    #[test]
    fn read_missing_is_not_found() {
        let (_, store) = create_store();
        assert_eq!(store.read("nope").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(
            store.read_raw("nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn delete_missing_performs_no_mutation() {
        let (state, store) = create_store();
        let before = state.mutation_count();
        assert_eq!(store.delete("nope").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(state.mutation_count(), before);
    }

    #[test]
    fn update_overwrites_without_existence_check() {
        let (_, store) = create_store();
        store.update(&picture("p9", "green", "tom")).unwrap();
        assert_eq!(store.read("p9").unwrap().category, "green");
    }

    #[test]
    fn transfer_changes_only_owner() {
        let (_, store) = create_store();
        store.create(&picture("p1", "blue", "tom")).unwrap();

        let updated = store.transfer("p1", "Jerry").unwrap();
        assert_eq!(updated.owner, "jerry");

        let stored = store.read("p1").unwrap();
        assert_eq!(stored.owner, "jerry");
        assert_eq!(stored.category, "blue");
        assert_eq!(stored.quantity, 35);
    }

    #[test]
    fn read_raw_returns_stored_bytes() {
        let (state, store) = create_store();
        state.put_state("raw", b"{\"odd\": true}").unwrap();
        assert_eq!(store.read_raw("raw").unwrap(), b"{\"odd\": true}");
        assert_eq!(
            store.read("raw").unwrap_err().kind(),
            ErrorKind::SerializationError
        );
    }
}
