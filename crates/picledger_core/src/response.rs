//! JSON rendering of query and history results.
//!
//! Three layouts:
//!
//! ```text
//! plain:     [{"key":"p1","record":{...}}, ...]
//! paginated: [[{"key":"p1","record":{...}}, ...],
//!             {"responseMetadata":{"recordsCount":1,"bookmark":"p1"}}]
//! history:   [{"txId":"..","value":{...},"timestamp":"..","isDelete":false}, ...]
//! ```
//!
//! Stored values are embedded as they are. A value that is valid JSON is
//! copied in without being re-encoded; any other value becomes a JSON
//! string. Deletions in a history carry `"value":null`.

use crate::error::CoreResult;
use crate::history::HistoryEntry;
use crate::query::Page;
use picledger_state::{KeyValue, QueryResponseMetadata, ResultsIterator};
use serde::Serialize;
use serde_json::value::RawValue;

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Embedded {
    Json(Box<RawValue>),
    Text(String),
}

impl Embedded {
    fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => match RawValue::from_string(text.to_owned()) {
                Ok(raw) => Self::Json(raw),
                Err(_) => Self::Text(text.to_owned()),
            },
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryRecord {
    key: String,
    record: Embedded,
}

impl From<KeyValue> for QueryRecord {
    fn from(kv: KeyValue) -> Self {
        Self {
            record: Embedded::from_bytes(&kv.value),
            key: kv.key,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    records_count: i32,
    bookmark: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataEnvelope {
    response_metadata: Metadata,
}

impl From<QueryResponseMetadata> for MetadataEnvelope {
    fn from(metadata: QueryResponseMetadata) -> Self {
        Self {
            response_metadata: Metadata {
                records_count: metadata.fetched_records_count,
                bookmark: metadata.bookmark,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRecord {
    tx_id: String,
    value: Option<Embedded>,
    timestamp: String,
    is_delete: bool,
}

impl From<HistoryEntry> for HistoryRecord {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            value: (!entry.is_delete).then(|| Embedded::from_bytes(&entry.value)),
            tx_id: entry.tx_id.0,
            timestamp: entry.timestamp.to_rfc3339(),
            is_delete: entry.is_delete,
        }
    }
}

fn collect_records(results: ResultsIterator<KeyValue>) -> CoreResult<Vec<QueryRecord>> {
    let mut records = Vec::new();
    for kv in results {
        records.push(QueryRecord::from(kv?));
    }
    Ok(records)
}

/// Renders a scan or query result as a JSON array of `{key, record}`.
///
/// The iterator is drained and released before returning.
pub fn query_results(results: ResultsIterator<KeyValue>) -> CoreResult<Vec<u8>> {
    let records = collect_records(results)?;
    Ok(serde_json::to_vec(&records)?)
}

/// Renders one page: the records, then the pagination metadata.
pub fn paginated_results(page: Page) -> CoreResult<Vec<u8>> {
    let records = collect_records(page.results)?;
    let metadata = MetadataEnvelope::from(page.metadata);
    Ok(serde_json::to_vec(&(records, metadata))?)
}

/// Renders a record history as a JSON array, in the order given.
pub fn history_results(entries: ResultsIterator<HistoryEntry>) -> CoreResult<Vec<u8>> {
    let mut records = Vec::new();
    for entry in entries {
        records.push(HistoryRecord::from(entry?));
    }
    Ok(serde_json::to_vec(&records)?)
}
