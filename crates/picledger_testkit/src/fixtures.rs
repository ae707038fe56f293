//! Test fixtures and ledger helpers.
//!
//! Provides convenience functions for setting up test ledgers
//! and common test scenarios.

use picledger_core::{Config, Ledger, Record};
use picledger_state::{InMemoryStateStore, KeyValue, ResultsIterator};
use std::sync::Arc;

/// A ledger over its own in-memory state store.
///
/// The store stays reachable through [`TestLedger::state`] so tests can
/// inspect raw keys, inject faults and count open cursors.
pub struct TestLedger {
    /// The ledger instance.
    pub ledger: Ledger,
    state: Arc<InMemoryStateStore>,
}

impl TestLedger {
    /// Creates a test ledger with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a test ledger with `config`.
    pub fn with_config(config: Config) -> Self {
        Self::over(InMemoryStateStore::new(), config)
    }

    /// Creates a test ledger whose store has no predicate query support.
    pub fn without_rich_query() -> Self {
        Self::over(InMemoryStateStore::without_rich_query(), Config::default())
    }

    fn over(store: InMemoryStateStore, config: Config) -> Self {
        let state = Arc::new(store);
        Self {
            ledger: Ledger::new(state.clone(), config),
            state,
        }
    }

    /// Returns the underlying store.
    pub fn state(&self) -> &InMemoryStateStore {
        &self.state
    }

    /// Reads and decodes a record, panicking if it is missing or malformed.
    pub fn record(&self, id: &str) -> Record {
        self.ledger
            .records()
            .read(id)
            .unwrap_or_else(|e| panic!("failed to read record {id}: {e}"))
    }

    /// Returns the ids indexed under `category`.
    pub fn category_ids(&self, category: &str) -> Vec<String> {
        self.ledger
            .index()
            .ids(category)
            .unwrap_or_else(|e| panic!("failed to scan category {category}: {e}"))
    }
}

impl Default for TestLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestLedger {
    type Target = Ledger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

/// Runs a test with a fresh ledger.
///
/// # Example
///
/// ```rust
/// use picledger_testkit::with_test_ledger;
///
/// with_test_ledger(|ledger| {
///     ledger.create("p1", "blue", "35", "tom").unwrap();
/// });
/// ```
pub fn with_test_ledger<F, R>(f: F) -> R
where
    F: FnOnce(&TestLedger) -> R,
{
    let ledger = TestLedger::new();
    f(&ledger)
}

/// Drains a result iterator into its keys, panicking on any error.
pub fn collect_keys(results: ResultsIterator<KeyValue>) -> Vec<String> {
    results
        .map(|kv| kv.unwrap_or_else(|e| panic!("scan failed: {e}")).key)
        .collect()
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// The three pictures used throughout the tests.
    ///
    /// `(id, category, quantity, owner)`
    pub const PICTURES: [(&str, &str, &str, &str); 3] = [
        ("p1", "blue", "35", "tom"),
        ("p2", "red", "50", "tom"),
        ("p3", "blue", "70", "tom"),
    ];

    /// Creates a ledger holding [`PICTURES`].
    pub fn seeded_ledger() -> TestLedger {
        let ledger = TestLedger::new();
        for (id, category, quantity, owner) in PICTURES {
            ledger
                .create(id, category, quantity, owner)
                .unwrap_or_else(|e| panic!("failed to seed {id}: {e}"));
        }
        ledger
    }

    /// Creates a ledger holding `count` pictures spread over `categories`.
    ///
    /// Ids are zero-padded (`p0000`, `p0001`, ...) so key order equals
    /// creation order.
    pub fn populated_ledger(count: usize, categories: &[&str]) -> TestLedger {
        let ledger = TestLedger::new();
        for i in 0..count {
            let category = categories[i % categories.len()];
            ledger
                .create(&format!("p{i:04}"), category, &i.to_string(), "tom")
                .unwrap_or_else(|e| panic!("failed to create picture {i}: {e}"));
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_test_ledger() {
        with_test_ledger(|ledger| {
            ledger.create("p1", "blue", "35", "tom").unwrap();
            assert_eq!(ledger.record("p1").owner, "tom");
        });
    }

    #[test]
    fn test_seeded_scenario() {
        let ledger = scenarios::seeded_ledger();
        assert_eq!(ledger.category_ids("blue"), vec!["p1", "p3"]);
        assert_eq!(ledger.category_ids("red"), vec!["p2"]);
    }

    #[test]
    fn test_populated_scenario() {
        let ledger = scenarios::populated_ledger(10, &["blue", "red"]);
        assert_eq!(ledger.category_ids("blue").len(), 5);
        assert_eq!(collect_keys(ledger.ranges().range("", "").unwrap()).len(), 10);
        assert_eq!(ledger.state().open_cursors(), 0);
    }
}
