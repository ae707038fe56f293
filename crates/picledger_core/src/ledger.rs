//! The ledger facade: one entry point per operation.

use crate::config::Config;
use crate::dispatch::{Operation, Response};
use crate::error::{CoreError, CoreResult};
use crate::history::HistoryReader;
use crate::index::{SecondaryIndex, TransferSummary};
use crate::predicate::PredicateQueries;
use crate::query::{PageSize, RangeQueries};
use crate::record::{parse_quantity, Record};
use crate::response;
use crate::store::RecordStore;
use picledger_state::StateStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Records, their category index and the queries over them.
///
/// Every operation takes caller-supplied strings, validates them, and runs
/// to completion against the state store before returning. There is no
/// internal concurrency; isolation between concurrent callers is the
/// store's business.
///
/// # Example
///
/// ```rust
/// use picledger_core::{Config, Ledger};
/// use picledger_state::InMemoryStateStore;
/// use std::sync::Arc;
///
/// let ledger = Ledger::new(Arc::new(InMemoryStateStore::new()), Config::default());
/// ledger.create("p1", "blue", "35", "tom").unwrap();
///
/// let response = ledger.invoke("read", &["p1"]);
/// assert!(response.is_ok());
/// ```
pub struct Ledger {
    config: Config,
    index: SecondaryIndex,
    ranges: RangeQueries,
    predicates: PredicateQueries,
    history: HistoryReader,
}

impl Ledger {
    /// Creates a ledger over `state`.
    pub fn new(state: Arc<dyn StateStore>, config: Config) -> Self {
        let records = RecordStore::new(Arc::clone(&state), config.kind.clone());
        Self {
            index: SecondaryIndex::new(records, config.index_name.clone()),
            ranges: RangeQueries::new(Arc::clone(&state)),
            predicates: PredicateQueries::new(Arc::clone(&state), config.kind.clone()),
            history: HistoryReader::new(state),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the record store.
    pub fn records(&self) -> &RecordStore {
        self.index.records()
    }

    /// Returns the category index.
    pub fn index(&self) -> &SecondaryIndex {
        &self.index
    }

    /// Returns the range and prefix query engine.
    pub fn ranges(&self) -> &RangeQueries {
        &self.ranges
    }

    /// Returns the predicate query engine.
    pub fn predicates(&self) -> &PredicateQueries {
        &self.predicates
    }

    /// Creates a record and indexes it by category.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty argument or a non-numeric quantity
    /// - `AlreadyExists` if `id` is taken
    pub fn create(&self, id: &str, category: &str, quantity: &str, owner: &str) -> CoreResult<()> {
        Operation::Create.check_args(&[id, category, quantity, owner])?;
        let quantity = parse_quantity(quantity)?;
        let record = Record::new(self.config.kind.clone(), id, category, quantity, owner);
        self.index.create(&record)
    }

    /// Returns the stored JSON of a record, verbatim.
    pub fn read(&self, id: &str) -> CoreResult<Vec<u8>> {
        Operation::Read.check_args(&[id])?;
        debug!(id = %id, "reading record");
        self.records().read_raw(id)
    }

    /// Sets a new owner on one record.
    pub fn update_owner(&self, id: &str, new_owner: &str) -> CoreResult<()> {
        Operation::UpdateOwner.check_args(&[id, new_owner])?;
        self.records().transfer(id, new_owner)?;
        Ok(())
    }

    /// Deletes a record and its index entry.
    pub fn delete(&self, id: &str) -> CoreResult<()> {
        Operation::Delete.check_args(&[id])?;
        self.index.delete(id)?;
        Ok(())
    }

    /// Transfers every record of `category` to `new_owner`.
    ///
    /// See [`SecondaryIndex::transfer_by_category`] for the partial
    /// failure behavior.
    pub fn transfer_by_category(
        &self,
        category: &str,
        new_owner: &str,
    ) -> CoreResult<TransferSummary> {
        Operation::TransferByCategory.check_args(&[category, new_owner])?;
        self.index.transfer_by_category(category, new_owner)
    }

    /// Renders the records with `start_key <= id < end_key`.
    pub fn range_query(&self, start_key: &str, end_key: &str) -> CoreResult<Vec<u8>> {
        Operation::RangeQuery.check_args(&[start_key, end_key])?;
        response::query_results(self.ranges.range(start_key, end_key)?)
    }

    /// Renders one page of a range query.
    pub fn range_query_paginated(
        &self,
        start_key: &str,
        end_key: &str,
        page_size: &str,
        bookmark: &str,
    ) -> CoreResult<Vec<u8>> {
        Operation::RangeQueryPaginated.check_args(&[start_key, end_key, page_size, bookmark])?;
        let page_size = self.page_size(page_size)?;
        let page = self
            .ranges
            .range_paginated(start_key, end_key, page_size, bookmark)?;
        response::paginated_results(page)
    }

    /// Renders the result of a store-native predicate query.
    pub fn predicate_query(&self, expression: &str) -> CoreResult<Vec<u8>> {
        Operation::PredicateQuery.check_args(&[expression])?;
        response::query_results(self.predicates.query(expression)?)
    }

    /// Renders one page of a predicate query.
    pub fn predicate_query_paginated(
        &self,
        expression: &str,
        page_size: &str,
        bookmark: &str,
    ) -> CoreResult<Vec<u8>> {
        Operation::PredicateQueryPaginated.check_args(&[expression, page_size, bookmark])?;
        let page_size = self.page_size(page_size)?;
        let page = self
            .predicates
            .query_paginated(expression, page_size, bookmark)?;
        response::paginated_results(page)
    }

    /// Renders the version history of a record.
    pub fn history(&self, id: &str) -> CoreResult<Vec<u8>> {
        Operation::History.check_args(&[id])?;
        response::history_results(self.history.history(id)?)
    }

    /// Renders every record held by `owner`.
    pub fn query_by_owner(&self, owner: &str) -> CoreResult<Vec<u8>> {
        Operation::QueryByOwner.check_args(&[owner])?;
        response::query_results(self.predicates.query_by_owner(owner)?)
    }

    /// Runs `function` with positional `args`.
    ///
    /// Never fails: errors become a [`Response`] with status 500 and the
    /// error message.
    pub fn invoke<S: AsRef<str>>(&self, function: &str, args: &[S]) -> Response {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        debug!(function = %function, args = ?args, "invoke");

        let response = Response::from(self.dispatch(function, &args));
        if response.is_ok() {
            debug!(function = %function, "invoke succeeded");
        } else {
            info!(function = %function, error = %response.message, "invoke failed");
        }
        response
    }

    fn dispatch(&self, function: &str, args: &[&str]) -> CoreResult<Vec<u8>> {
        let operation: Operation = function.parse()?;
        operation.check_args(args)?;

        match (operation, args) {
            (Operation::Create, [id, category, quantity, owner]) => {
                self.create(id, category, quantity, owner)?;
                Ok(Vec::new())
            }
            (Operation::Read, [id]) => self.read(id),
            (Operation::UpdateOwner, [id, owner]) => {
                self.update_owner(id, owner)?;
                Ok(Vec::new())
            }
            (Operation::Delete, [id]) => {
                self.delete(id)?;
                Ok(Vec::new())
            }
            (Operation::TransferByCategory, [category, owner]) => Ok(self
                .transfer_by_category(category, owner)?
                .to_string()
                .into_bytes()),
            (Operation::RangeQuery, [start, end]) => self.range_query(start, end),
            (Operation::RangeQueryPaginated, [start, end, size, bookmark]) => {
                self.range_query_paginated(start, end, size, bookmark)
            }
            (Operation::PredicateQuery, [expression]) => self.predicate_query(expression),
            (Operation::PredicateQueryPaginated, [expression, size, bookmark]) => {
                self.predicate_query_paginated(expression, size, bookmark)
            }
            (Operation::History, [id]) => self.history(id),
            (Operation::QueryByOwner, [owner]) => self.query_by_owner(owner),
            // check_args has already matched the arity of every operation.
            (operation, args) => Err(CoreError::invalid_argument(format!(
                "{operation} expects {} argument(s), got {}",
                operation.arity(),
                args.len()
            ))),
        }
    }

    fn page_size(&self, raw: &str) -> CoreResult<PageSize> {
        PageSize::parse(raw, self.config.max_page_size)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::ERROR;
    use crate::error::ErrorKind;
    use picledger_state::InMemoryStateStore;
    use serde_json::Value;

    fn create_ledger() -> (Arc<InMemoryStateStore>, Ledger) {
        let state = Arc::new(InMemoryStateStore::new());
        let ledger = Ledger::new(state.clone(), Config::default());
        (state, ledger)
    }

    fn json(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn create_and_read() {
        let (_, ledger) = create_ledger();
        ledger.create("p1", "Blue", "35", "Tom").unwrap();

        let record = json(&ledger.read("p1").unwrap());
        assert_eq!(record["docType"], "picture");
        assert_eq!(record["category"], "blue");
        assert_eq!(record["quantity"], 35);
        assert_eq!(record["owner"], "tom");
    }

    #[test]
    fn create_rejects_bad_input() {
        let (state, ledger) = create_ledger();
        let cases = [
            ("", "blue", "35", "tom"),
            ("p1", "", "35", "tom"),
            ("p1", "blue", "", "tom"),
            ("p1", "blue", "abc", "tom"),
            ("p1", "blue", "35", ""),
        ];
        for (id, category, quantity, owner) in cases {
            let err = ledger.create(id, category, quantity, owner).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert_eq!(state.mutation_count(), 0);
    }

    #[test]
    fn update_owner_of_missing_record() {
        let (_, ledger) = create_ledger();
        let err = ledger.update_owner("p9", "jerry").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn range_query_renders_records() {
        let (_, ledger) = create_ledger();
        ledger.create("p1", "blue", "35", "tom").unwrap();
        ledger.create("p2", "red", "50", "tom").unwrap();

        let results = json(&ledger.range_query("p1", "p3").unwrap());
        let results = results.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["key"], "p1");
        assert_eq!(results[1]["record"]["category"], "red");
    }

    #[test]
    fn paginated_range_query_rejects_bad_page_size() {
        let (_, ledger) = create_ledger();
        for size in ["0", "-3", "ten", "4294967296"] {
            let err = ledger.range_query_paginated("", "", size, "").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn max_page_size_is_enforced() {
        let state = Arc::new(InMemoryStateStore::new());
        let ledger = Ledger::new(state, Config::new().max_page_size(2));
        assert!(ledger.range_query_paginated("", "", "2", "").is_ok());
        let err = ledger.range_query_paginated("", "", "3", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn invoke_dispatches_by_name() {
        let (_, ledger) = create_ledger();
        assert!(ledger.invoke("create", &["p1", "blue", "35", "tom"]).is_ok());
        assert!(ledger.invoke("create", &["p3", "blue", "70", "tom"]).is_ok());

        let response = ledger.invoke("transfer-by-category", &["blue", "jerry"]);
        assert!(response.is_ok());
        assert_eq!(response.payload_text(), "Transferred 2 blue pictures to jerry");

        let response = ledger.invoke("query-by-owner", &["jerry"]);
        assert_eq!(json(&response.payload).as_array().unwrap().len(), 2);
    }

    #[test]
    fn invoke_reports_errors() {
        let (_, ledger) = create_ledger();

        let response = ledger.invoke("read", &["p1"]);
        assert_eq!(response.status, ERROR);
        assert_eq!(response.message, "record does not exist: p1");

        let response = ledger.invoke("nonsense", &["p1"]);
        assert_eq!(response.status, ERROR);

        let response = ledger.invoke("create", &["p1", "blue"]);
        assert_eq!(response.status, ERROR);
        assert!(response.message.contains("expects 4 argument(s)"));
    }

    #[test]
    fn predicate_query_without_capability() {
        let ledger = Ledger::new(
            Arc::new(InMemoryStateStore::without_rich_query()),
            Config::default(),
        );
        let err = ledger.predicate_query(r#"{"selector":{}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        let err = ledger.query_by_owner("tom").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn custom_kind_and_index_name() {
        let state = Arc::new(InMemoryStateStore::new());
        let config = Config::new().kind("marble").index_name("color~name");
        let ledger = Ledger::new(state, config);

        ledger.create("m1", "red", "5", "tom").unwrap();
        assert_eq!(json(&ledger.read("m1").unwrap())["docType"], "marble");
        assert_eq!(ledger.index().ids("red").unwrap(), vec!["m1"]);

        let summary = ledger.transfer_by_category("red", "jerry").unwrap();
        assert_eq!(summary.to_string(), "Transferred 1 red marbles to jerry");
    }
}
