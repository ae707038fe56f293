//! In-memory state store for testing and local runs.

use crate::backend::{PagedResults, StateStore};
use crate::composite::{composite_key_range, is_composite_key};
use crate::error::{StateError, StateResult};
use crate::iterator::ResultsIterator;
use crate::selector::Selector;
use crate::types::{KeyModification, KeyValue, QueryResponseMetadata, TxId};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    state: BTreeMap<String, Vec<u8>>,
    /// Versions per key, oldest first.
    history: HashMap<String, Vec<KeyModification>>,
    mutations: u64,
}

/// An in-memory state store.
///
/// This store keeps all state in memory and is suitable for:
/// - Unit and integration tests
/// - Local runs of the CLI
///
/// Every put and delete is its own transaction: it gets a fresh transaction
/// ID and timestamp and is appended to the key's history. History is served
/// newest first.
///
/// Rich queries accept a small Mango-style selector (see the `selector`
/// module). Use [`InMemoryStateStore::without_rich_query`] to behave like a
/// store that has no rich query support.
///
/// # Example
///
/// ```rust
/// use picledger_state::{InMemoryStateStore, StateStore};
///
/// let store = InMemoryStateStore::new();
/// store.put_state("p1", b"{}").unwrap();
/// assert_eq!(store.get_state("p1").unwrap(), Some(b"{}".to_vec()));
/// ```
#[derive(Debug)]
pub struct InMemoryStateStore {
    inner: RwLock<Inner>,
    rich_query: bool,
    open_cursors: Arc<AtomicUsize>,
    write_fault: RwLock<Option<String>>,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStateStore {
    /// Creates an empty store with rich queries enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            rich_query: true,
            open_cursors: Arc::new(AtomicUsize::new(0)),
            write_fault: RwLock::new(None),
        }
    }

    /// Creates an empty store that rejects rich queries.
    #[must_use]
    pub fn without_rich_query() -> Self {
        Self {
            rich_query: false,
            ..Self::new()
        }
    }

    /// Returns whether rich queries are supported.
    #[must_use]
    pub fn supports_rich_query(&self) -> bool {
        self.rich_query
    }

    /// Makes every put/delete on a key starting with `prefix` fail.
    ///
    /// Used to test partial-failure handling.
    pub fn fail_writes_with_prefix(&self, prefix: impl Into<String>) {
        *self.write_fault.write() = Some(prefix.into());
    }

    /// Clears any injected write failure.
    pub fn clear_write_faults(&self) {
        *self.write_fault.write() = None;
    }

    /// Returns the number of iterators that have not been closed yet.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Returns the number of successful puts and deletes so far.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.inner.read().mutations
    }

    /// Returns a copy of every live entry, composite keys included.
    #[must_use]
    pub fn snapshot(&self) -> Vec<KeyValue> {
        self.inner
            .read()
            .state
            .iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }

    fn check_write(&self, key: &str) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::invalid_key("key must not be empty"));
        }
        if let Some(prefix) = self.write_fault.read().as_deref() {
            if key.starts_with(prefix) {
                return Err(StateError::unavailable(format!(
                    "injected write failure for key {key:?}"
                )));
            }
        }
        Ok(())
    }

    fn record(inner: &mut Inner, key: &str, value: Vec<u8>, is_delete: bool) {
        let modification = KeyModification {
            tx_id: TxId::new(Uuid::new_v4().simple().to_string()),
            value,
            timestamp: Utc::now(),
            is_delete,
        };
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(modification);
        inner.mutations += 1;
    }

    fn cursor<T: Send + 'static>(&self, items: Vec<T>) -> ResultsIterator<T> {
        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let open = Arc::clone(&self.open_cursors);
        ResultsIterator::with_release(items.into_iter().map(Ok), move || {
            open.fetch_sub(1, Ordering::SeqCst);
        })
    }

    fn collect_range(
        &self,
        start: Bound<&str>,
        end: Bound<&str>,
        include_composite: bool,
    ) -> Vec<KeyValue> {
        if let (Bound::Included(s) | Bound::Excluded(s), Bound::Included(e) | Bound::Excluded(e)) =
            (start, end)
        {
            if s >= e {
                return Vec::new();
            }
        }

        let inner = self.inner.read();
        inner
            .state
            .range::<str, _>((start, end))
            .filter(|(k, _)| include_composite || !is_composite_key(k))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }

    fn simple_range(&self, start_key: &str, end_key: &str) -> StateResult<Vec<KeyValue>> {
        for key in [start_key, end_key] {
            if is_composite_key(key) {
                return Err(StateError::invalid_key(format!(
                    "range bound {key:?} lies in the composite key namespace"
                )));
            }
        }
        let start = bound(start_key, Bound::Included);
        let end = bound(end_key, Bound::Excluded);
        Ok(self.collect_range(start, end, false))
    }

    fn composite_range(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> StateResult<Vec<KeyValue>> {
        let (start, end) = composite_key_range(object_type, attributes)?;
        Ok(self.collect_range(Bound::Included(&start), Bound::Excluded(&end), true))
    }

    fn query(&self, query: &str) -> StateResult<Vec<KeyValue>> {
        if !self.rich_query {
            return Err(StateError::RichQueryUnsupported);
        }
        let selector = Selector::parse(query)?;
        let inner = self.inner.read();
        Ok(inner
            .state
            .iter()
            .filter(|(k, _)| !is_composite_key(k))
            .filter(|(_, v)| {
                serde_json::from_slice::<serde_json::Value>(v)
                    .map(|doc| selector.matches(&doc))
                    .unwrap_or(false)
            })
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect())
    }

    fn paginate(
        &self,
        entries: Vec<KeyValue>,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults> {
        if page_size <= 0 {
            return Err(StateError::InvalidPagination(format!(
                "page size must be positive, got {page_size}"
            )));
        }
        let page: Vec<KeyValue> = entries
            .into_iter()
            .filter(|kv| bookmark.is_empty() || kv.key.as_str() > bookmark)
            .take(page_size as usize)
            .collect();

        let metadata = QueryResponseMetadata {
            fetched_records_count: page.len() as i32,
            bookmark: page
                .last()
                .map_or_else(|| bookmark.to_string(), |kv| kv.key.clone()),
        };
        Ok((self.cursor(page), metadata))
    }
}

fn bound<'a>(key: &'a str, make: fn(&'a str) -> Bound<&'a str>) -> Bound<&'a str> {
    if key.is_empty() {
        Bound::Unbounded
    } else {
        make(key)
    }
}

impl StateStore for InMemoryStateStore {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.inner.read().state.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StateResult<()> {
        self.check_write(key)?;
        let mut inner = self.inner.write();
        inner.state.insert(key.to_string(), value.to_vec());
        Self::record(&mut inner, key, value.to_vec(), false);
        Ok(())
    }

    fn del_state(&self, key: &str) -> StateResult<()> {
        self.check_write(key)?;
        let mut inner = self.inner.write();
        inner.state.remove(key);
        Self::record(&mut inner, key, Vec::new(), true);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> StateResult<ResultsIterator<KeyValue>> {
        let entries = self.simple_range(start_key, end_key)?;
        Ok(self.cursor(entries))
    }

    fn get_state_by_range_with_pagination(
        &self,
        start_key: &str,
        end_key: &str,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults> {
        let entries = self.simple_range(start_key, end_key)?;
        self.paginate(entries, page_size, bookmark)
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> StateResult<ResultsIterator<KeyValue>> {
        let entries = self.composite_range(object_type, attributes)?;
        Ok(self.cursor(entries))
    }

    fn get_state_by_partial_composite_key_with_pagination(
        &self,
        object_type: &str,
        attributes: &[&str],
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults> {
        let entries = self.composite_range(object_type, attributes)?;
        self.paginate(entries, page_size, bookmark)
    }

    fn get_query_result(&self, query: &str) -> StateResult<ResultsIterator<KeyValue>> {
        let entries = self.query(query)?;
        Ok(self.cursor(entries))
    }

    fn get_query_result_with_pagination(
        &self,
        query: &str,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults> {
        let entries = self.query(query)?;
        self.paginate(entries, page_size, bookmark)
    }

    fn get_history_for_key(&self, key: &str) -> StateResult<ResultsIterator<KeyModification>> {
        let versions: Vec<KeyModification> = self
            .inner
            .read()
            .history
            .get(key)
            .map(|versions| versions.iter().rev().cloned().collect())
            .unwrap_or_default();
        Ok(self.cursor(versions))
    }
}
