//! State store trait definition.

use crate::error::StateResult;
use crate::iterator::ResultsIterator;
use crate::types::{KeyModification, KeyValue, QueryResponseMetadata};

/// A page of key/value results plus its continuation metadata.
pub type PagedResults = (ResultsIterator<KeyValue>, QueryResponseMetadata);

/// An ordered key/value state store.
///
/// The store is **external** to picledger: it owns key and value encoding,
/// consistency, and the rich-query language. picledger only consumes the
/// operations below.
///
/// # Invariants
///
/// - Range scans return keys in ascending lexicographic (byte) order.
/// - Range scans never return composite keys; composite keys are reached
///   through the partial-composite-key scans.
/// - Every returned [`ResultsIterator`] holds a cursor until it is closed or
///   dropped.
///
/// # Consistency
///
/// Stores backing an endorsement/commit pipeline re-execute range and
/// partial-composite-key scans at commit time and invalidate the
/// transaction if the result set changed. Writes based on those scans are
/// therefore safe. Rich queries carry no such guarantee and must not drive
/// writes.
///
/// # Implementors
///
/// - [`super::InMemoryStateStore`] - reference store for tests and local runs
pub trait StateStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the write fails.
    fn put_state(&self, key: &str, value: &[u8]) -> StateResult<()>;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn del_state(&self, key: &str) -> StateResult<()>;

    /// Scans simple keys in `[start_key, end_key)`.
    ///
    /// An empty `start_key` starts at the first key; an empty `end_key`
    /// runs to the last key.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is a composite key.
    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> StateResult<ResultsIterator<KeyValue>>;

    /// Paginated form of [`StateStore::get_state_by_range`].
    ///
    /// Returns at most `page_size` results starting after `bookmark`
    /// (an empty bookmark starts at `start_key`).
    fn get_state_by_range_with_pagination(
        &self,
        start_key: &str,
        end_key: &str,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults>;

    /// Scans every composite key of `object_type` whose leading attributes
    /// equal `attributes`.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> StateResult<ResultsIterator<KeyValue>>;

    /// Paginated form of [`StateStore::get_state_by_partial_composite_key`].
    fn get_state_by_partial_composite_key_with_pagination(
        &self,
        object_type: &str,
        attributes: &[&str],
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults>;

    /// Runs a rich query in the store's native syntax.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::RichQueryUnsupported`](crate::StateError::RichQueryUnsupported)
    /// if the store has no rich query capability.
    fn get_query_result(&self, query: &str) -> StateResult<ResultsIterator<KeyValue>>;

    /// Paginated form of [`StateStore::get_query_result`].
    fn get_query_result_with_pagination(
        &self,
        query: &str,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<PagedResults>;

    /// Returns every recorded version of `key`, in the store's log order.
    fn get_history_for_key(&self, key: &str) -> StateResult<ResultsIterator<KeyModification>>;
}
