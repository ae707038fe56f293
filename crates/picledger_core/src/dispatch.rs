//! Operation names and invocation responses.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Status code of a successful invocation.
pub const OK: u16 = 200;

/// Status code of a failed invocation.
pub const ERROR: u16 = 500;

/// The closed set of operations a [`Ledger`](crate::Ledger) accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `create(id, category, quantity, owner)`
    Create,
    /// `read(id)`
    Read,
    /// `update-owner(id, newOwner)`
    UpdateOwner,
    /// `delete(id)`
    Delete,
    /// `transfer-by-category(category, newOwner)`
    TransferByCategory,
    /// `range-query(startKey, endKey)`
    RangeQuery,
    /// `range-query-paginated(startKey, endKey, pageSize, bookmark)`
    RangeQueryPaginated,
    /// `predicate-query(expression)`
    PredicateQuery,
    /// `predicate-query-paginated(expression, pageSize, bookmark)`
    PredicateQueryPaginated,
    /// `history(id)`
    History,
    /// `query-by-owner(owner)`
    QueryByOwner,
}

impl Operation {
    /// Every operation, in documentation order.
    pub const ALL: [Operation; 11] = [
        Self::Create,
        Self::Read,
        Self::UpdateOwner,
        Self::Delete,
        Self::TransferByCategory,
        Self::RangeQuery,
        Self::RangeQueryPaginated,
        Self::PredicateQuery,
        Self::PredicateQueryPaginated,
        Self::History,
        Self::QueryByOwner,
    ];

    /// Returns the invocation name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::UpdateOwner => "update-owner",
            Self::Delete => "delete",
            Self::TransferByCategory => "transfer-by-category",
            Self::RangeQuery => "range-query",
            Self::RangeQueryPaginated => "range-query-paginated",
            Self::PredicateQuery => "predicate-query",
            Self::PredicateQueryPaginated => "predicate-query-paginated",
            Self::History => "history",
            Self::QueryByOwner => "query-by-owner",
        }
    }

    /// Returns the argument names, in order.
    pub const fn parameters(self) -> &'static [&'static str] {
        match self {
            Self::Create => &["id", "category", "quantity", "owner"],
            Self::Read | Self::Delete | Self::History => &["id"],
            Self::UpdateOwner => &["id", "newOwner"],
            Self::TransferByCategory => &["category", "newOwner"],
            Self::RangeQuery => &["startKey", "endKey"],
            Self::RangeQueryPaginated => &["startKey", "endKey", "pageSize", "bookmark"],
            Self::PredicateQuery => &["expression"],
            Self::PredicateQueryPaginated => &["expression", "pageSize", "bookmark"],
            Self::QueryByOwner => &["owner"],
        }
    }

    /// Returns the number of arguments the operation takes.
    pub const fn arity(self) -> usize {
        self.parameters().len()
    }

    /// Checks argument count and required non-empty arguments.
    ///
    /// Only range bounds and bookmarks may be empty.
    pub fn check_args<S: AsRef<str>>(self, args: &[S]) -> CoreResult<()> {
        if args.len() != self.arity() {
            return Err(CoreError::invalid_argument(format!(
                "{} expects {} argument(s) ({}), got {}",
                self.name(),
                self.arity(),
                self.parameters().join(", "),
                args.len()
            )));
        }
        for (name, value) in self.parameters().iter().zip(args) {
            let optional = matches!(*name, "startKey" | "endKey" | "bookmark");
            if !optional && value.as_ref().is_empty() {
                return Err(CoreError::invalid_argument(format!(
                    "argument {name} of {} must be a non-empty string",
                    self.name()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown operation {s:?}")))
    }
}

/// Outcome of one [`Ledger::invoke`](crate::Ledger::invoke) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// [`OK`] or [`ERROR`].
    pub status: u16,
    /// Error message; empty on success.
    pub message: String,
    /// Operation output; empty for operations that return nothing.
    pub payload: Vec<u8>,
}

impl Response {
    /// A successful response carrying `payload`.
    pub fn success(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload: payload.into(),
        }
    }

    /// A failed response carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    /// Returns true for a successful response.
    pub fn is_ok(&self) -> bool {
        self.status == OK
    }

    /// Returns the payload as text, replacing invalid UTF-8.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

impl From<CoreResult<Vec<u8>>> for Response {
    fn from(result: CoreResult<Vec<u8>>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(err) => Self::error(err.to_string()),
        }
    }
}
