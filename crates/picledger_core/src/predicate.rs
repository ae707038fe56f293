//! Predicate (rich) queries.
//!
//! Query text is handed to the store unmodified, in the store's own query
//! syntax. Stores without a rich query capability fail every call with
//! [`CoreError::UnsupportedOperation`](crate::CoreError::UnsupportedOperation).
//!
//! Predicate query results are not re-validated at commit time. Do not
//! base writes on them; use [`RangeQueries`](crate::RangeQueries) for that.

use crate::error::CoreResult;
use crate::query::{Page, PageSize};
use crate::record::normalize;
use picledger_state::{KeyValue, ResultsIterator, StateStore};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Pass-through predicate queries, plus the built-in owner query.
#[derive(Clone)]
pub struct PredicateQueries {
    state: Arc<dyn StateStore>,
    kind: String,
}

impl PredicateQueries {
    /// Creates a query engine over `state` for records of `kind`.
    pub fn new(state: Arc<dyn StateStore>, kind: impl Into<String>) -> Self {
        Self {
            state,
            kind: kind.into(),
        }
    }

    /// Runs `expression` against the store.
    pub fn query(&self, expression: &str) -> CoreResult<ResultsIterator<KeyValue>> {
        debug!(query = %expression, "predicate query");
        Ok(self.state.get_query_result(expression)?)
    }

    /// Paginated form of [`PredicateQueries::query`].
    pub fn query_paginated(
        &self,
        expression: &str,
        page_size: PageSize,
        bookmark: &str,
    ) -> CoreResult<Page> {
        debug!(
            query = %expression,
            page_size = page_size.get(),
            bookmark = %bookmark,
            "paginated predicate query"
        );
        let paged = self
            .state
            .get_query_result_with_pagination(expression, page_size.get(), bookmark)?;
        Ok(Page::from_paged(paged))
    }

    /// Returns every record held by `owner`.
    ///
    /// The selector is built here, so `owner` is matched as a value and can
    /// never alter the query itself.
    pub fn query_by_owner(&self, owner: &str) -> CoreResult<ResultsIterator<KeyValue>> {
        self.query(&self.owner_selector(owner))
    }

    /// Builds the selector used by [`PredicateQueries::query_by_owner`].
    pub fn owner_selector(&self, owner: &str) -> String {
        json!({
            "selector": {
                "docType": self.kind,
                "owner": normalize(owner),
            }
        })
        .to_string()
    }
}

impl fmt::Debug for PredicateQueries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateQueries")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
