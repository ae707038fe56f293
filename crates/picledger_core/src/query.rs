//! Range and prefix scans over the state store.
//!
//! `RangeQueries` supports:
//! - Half-open key range scans over primary records
//! - Prefix scans over composite index keys
//! - Paginated forms of both, continued through a bookmark
//!
//! # Pagination
//!
//! A page holds at most [`PageSize`] entries. Its bookmark is the key of the
//! last entry returned, and the next call starts strictly after it. Once the
//! scan is exhausted, a call returns no entries and echoes the bookmark it
//! was given, so callers stop when the bookmark stops advancing.
//!
//! # Consistency
//!
//! Range and prefix scan results are re-validated by stores that run an
//! endorse/commit pipeline: a transaction that writes based on a scan is
//! rejected at commit if the scanned range changed. That guarantee lives in
//! the store. Predicate queries have no such guarantee.

use crate::error::{CoreError, CoreResult};
use picledger_state::{KeyValue, QueryResponseMetadata, ResultsIterator, StateStore};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A validated page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageSize(i32);

impl PageSize {
    /// Validates a numeric page size against `max`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] unless `0 < size <= max`.
    pub fn new(size: i32, max: i32) -> CoreResult<Self> {
        if size <= 0 {
            return Err(CoreError::invalid_argument(format!(
                "page size must be positive, got {size}"
            )));
        }
        if size > max {
            return Err(CoreError::invalid_argument(format!(
                "page size {size} exceeds the maximum of {max}"
            )));
        }
        Ok(Self(size))
    }

    /// Parses a caller-supplied decimal page size.
    pub fn parse(raw: &str, max: i32) -> CoreResult<Self> {
        let size = raw.parse::<i32>().map_err(|_| {
            CoreError::invalid_argument(format!(
                "page size must be a 32-bit integer, got {raw:?}"
            ))
        })?;
        Self::new(size, max)
    }

    /// Returns the size.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of scan or query results.
#[derive(Debug)]
pub struct Page {
    /// Entries of this page, in key order.
    pub results: ResultsIterator<KeyValue>,
    /// Entry count and continuation bookmark.
    pub metadata: QueryResponseMetadata,
}

impl Page {
    pub(crate) fn from_paged(
        (results, metadata): (ResultsIterator<KeyValue>, QueryResponseMetadata),
    ) -> Self {
        Self { results, metadata }
    }
}

/// Ordered scans over primary keys and composite index keys.
#[derive(Clone)]
pub struct RangeQueries {
    state: Arc<dyn StateStore>,
}

impl RangeQueries {
    /// Creates a query engine over `state`.
    pub fn new(state: Arc<dyn StateStore>) -> Self {
        Self { state }
    }

    /// Scans primary records with `start_key <= key < end_key`.
    ///
    /// An empty bound is open on that side. Index entries are never
    /// returned.
    pub fn range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> CoreResult<ResultsIterator<KeyValue>> {
        debug!(start = %start_key, end = %end_key, "range scan");
        Ok(self.state.get_state_by_range(start_key, end_key)?)
    }

    /// Paginated form of [`RangeQueries::range`].
    pub fn range_paginated(
        &self,
        start_key: &str,
        end_key: &str,
        page_size: PageSize,
        bookmark: &str,
    ) -> CoreResult<Page> {
        debug!(
            start = %start_key,
            end = %end_key,
            page_size = page_size.get(),
            bookmark = %bookmark,
            "paginated range scan"
        );
        let paged = self.state.get_state_by_range_with_pagination(
            start_key,
            end_key,
            page_size.get(),
            bookmark,
        )?;
        Ok(Page::from_paged(paged))
    }

    /// Scans every entry of index `index_name` whose leading attributes
    /// equal `parts`.
    pub fn prefix(
        &self,
        index_name: &str,
        parts: &[&str],
    ) -> CoreResult<ResultsIterator<KeyValue>> {
        debug!(index = %index_name, parts = ?parts, "prefix scan");
        Ok(self
            .state
            .get_state_by_partial_composite_key(index_name, parts)?)
    }

    /// Paginated form of [`RangeQueries::prefix`].
    pub fn prefix_paginated(
        &self,
        index_name: &str,
        parts: &[&str],
        page_size: PageSize,
        bookmark: &str,
    ) -> CoreResult<Page> {
        debug!(
            index = %index_name,
            parts = ?parts,
            page_size = page_size.get(),
            bookmark = %bookmark,
            "paginated prefix scan"
        );
        let paged = self.state.get_state_by_partial_composite_key_with_pagination(
            index_name,
            parts,
            page_size.get(),
            bookmark,
        )?;
        Ok(Page::from_paged(paged))
    }
}

impl fmt::Debug for RangeQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeQueries").finish_non_exhaustive()
    }
}
