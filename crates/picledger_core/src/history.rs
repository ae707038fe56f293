//! Per-record version history.

use crate::error::CoreResult;
use picledger_state::{KeyModification, ResultsIterator, StateStore};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One version of a record, as reported by the store's version log.
pub type HistoryEntry = KeyModification;

/// Reads the version log of a record.
///
/// Entries come back in the store's log order, which is newest first for
/// the stores picledger ships with. The order is passed through as is.
#[derive(Clone)]
pub struct HistoryReader {
    state: Arc<dyn StateStore>,
}

impl HistoryReader {
    /// Creates a reader over `state`.
    pub fn new(state: Arc<dyn StateStore>) -> Self {
        Self { state }
    }

    /// Returns every version of `id`, including deletions.
    ///
    /// An id that was never written has an empty history.
    pub fn history(&self, id: &str) -> CoreResult<ResultsIterator<HistoryEntry>> {
        debug!(id = %id, "reading history");
        Ok(self.state.get_history_for_key(id)?)
    }
}

impl fmt::Debug for HistoryReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryReader").finish_non_exhaustive()
    }
}
