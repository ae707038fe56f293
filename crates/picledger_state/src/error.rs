//! Error types for state store operations.

use thiserror::Error;

/// Result type for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while talking to a state store.
#[derive(Debug, Error)]
pub enum StateError {
    /// A key was rejected by the store (empty, or inside the composite namespace).
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A composite key could not be built or split.
    #[error("invalid composite key: {0}")]
    InvalidCompositeKey(String),

    /// The store has no rich (predicate) query capability.
    #[error("rich queries are not supported by this state database")]
    RichQueryUnsupported,

    /// A rich query expression could not be evaluated.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A pagination request was malformed.
    #[error("invalid pagination request: {0}")]
    InvalidPagination(String),

    /// The store failed to serve the request.
    #[error("state database unavailable: {0}")]
    Unavailable(String),
}

impl StateError {
    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Creates an invalid composite key error.
    pub fn invalid_composite_key(message: impl Into<String>) -> Self {
        Self::InvalidCompositeKey(message.into())
    }

    /// Creates an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
