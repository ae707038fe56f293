//! Selector matching for the in-memory store's rich queries.
//!
//! Real state databases own their query language; the in-memory store only
//! needs enough of a Mango-style selector to serve tests and local runs:
//!
//! ```json
//! {"selector": {"docType": "picture", "owner": "tom", "quantity": {"$gt": 10}}}
//! ```
//!
//! Supported: implicit equality, `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
//! `$exists`, and dotted field paths. `use_index`, `fields` and `sort` are
//! accepted and ignored: results always come back whole and in key order,
//! since pagination bookmarks are keys.

use crate::error::{StateError, StateResult};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Top-level query fields that are accepted but have no effect.
const IGNORED_FIELDS: [&str; 3] = ["use_index", "fields", "sort"];

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Exists(bool),
}

impl Condition {
    fn parse(op: &str, operand: &Value) -> StateResult<Self> {
        Ok(match op {
            "$eq" => Self::Eq(operand.clone()),
            "$ne" => Self::Ne(operand.clone()),
            "$gt" => Self::Gt(operand.clone()),
            "$gte" => Self::Gte(operand.clone()),
            "$lt" => Self::Lt(operand.clone()),
            "$lte" => Self::Lte(operand.clone()),
            "$exists" => Self::Exists(operand.as_bool().ok_or_else(|| {
                StateError::invalid_query("$exists expects a boolean operand")
            })?),
            other => {
                return Err(StateError::invalid_query(format!(
                    "unsupported operator {other}"
                )))
            }
        })
    }

    fn matches(&self, field: Option<&Value>) -> bool {
        match (self, field) {
            (Self::Exists(expected), field) => field.is_some() == *expected,
            (_, None) => false,
            (Self::Eq(operand), Some(v)) => compare(v, operand) == Some(Ordering::Equal),
            (Self::Ne(operand), Some(v)) => compare(v, operand) != Some(Ordering::Equal),
            (Self::Gt(operand), Some(v)) => compare(v, operand) == Some(Ordering::Greater),
            (Self::Gte(operand), Some(v)) => matches!(
                compare(v, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Self::Lt(operand), Some(v)) => compare(v, operand) == Some(Ordering::Less),
            (Self::Lte(operand), Some(v)) => {
                matches!(compare(v, operand), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

/// A parsed rich-query selector.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Selector {
    conditions: Vec<(String, Condition)>,
}

impl Selector {
    /// Parses a query string of the form `{"selector": {...}}`.
    pub(crate) fn parse(query: &str) -> StateResult<Self> {
        let root: Value = serde_json::from_str(query)
            .map_err(|e| StateError::invalid_query(format!("query is not valid JSON: {e}")))?;
        let root = root
            .as_object()
            .ok_or_else(|| StateError::invalid_query("query must be a JSON object"))?;

        for key in root.keys() {
            if key != "selector" && !IGNORED_FIELDS.contains(&key.as_str()) {
                return Err(StateError::invalid_query(format!(
                    "unsupported query field {key}"
                )));
            }
        }

        let selector = root
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| StateError::invalid_query("query has no selector object"))?;

        let mut conditions = Vec::new();
        for (field, expected) in selector {
            if field.starts_with('$') {
                return Err(StateError::invalid_query(format!(
                    "unsupported combination operator {field}"
                )));
            }
            match expected {
                Value::Object(ops) if is_operator_map(ops) => {
                    for (op, operand) in ops {
                        conditions.push((field.clone(), Condition::parse(op, operand)?));
                    }
                }
                other => conditions.push((field.clone(), Condition::Eq(other.clone()))),
            }
        }

        Ok(Self { conditions })
    }

    /// Returns true if the document satisfies every condition.
    pub(crate) fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(path, condition)| condition.matches(lookup(document, path)))
    }
}

fn is_operator_map(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (x, y) if x == y => Some(Ordering::Equal),
        _ => None,
    }
}
