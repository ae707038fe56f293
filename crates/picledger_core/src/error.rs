//! Error types for picledger core.

use picledger_state::StateError;
use std::fmt;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input.
    InvalidArgument,
    /// Create with an id that is already taken.
    AlreadyExists,
    /// The requested record does not exist.
    NotFound,
    /// A stored value could not be decoded (or a record could not be encoded).
    SerializationError,
    /// The store lacks the requested capability.
    UnsupportedOperation,
    /// The store call itself failed.
    StoreFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::AlreadyExists => "AlreadyExists",
            Self::NotFound => "NotFound",
            Self::SerializationError => "SerializationError",
            Self::UnsupportedOperation => "UnsupportedOperation",
            Self::StoreFailure => "StoreFailure",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in picledger core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller input was rejected.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// A record with this id already exists.
    #[error("record already exists: {id}")]
    AlreadyExists {
        /// The colliding id.
        id: String,
    },

    /// No record with this id exists.
    #[error("record does not exist: {id}")]
    NotFound {
        /// The missing id.
        id: String,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },

    /// The store does not support the requested operation.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Description of the missing capability.
        message: String,
    },

    /// The state store failed.
    #[error("state store failure: {0}")]
    StoreFailure(StateError),

    /// A category transfer stopped part way through.
    ///
    /// Records transferred before the failure stay transferred.
    #[error("transfer failed after {transferred} record(s): {source}")]
    TransferAborted {
        /// Records transferred before the failure.
        transferred: usize,
        /// The failure of the individual transfer.
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Returns the kind of this error.
    ///
    /// A [`CoreError::TransferAborted`] reports the kind of the failure that
    /// stopped the batch.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Serialization { .. } => ErrorKind::SerializationError,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::StoreFailure(_) => ErrorKind::StoreFailure,
            Self::TransferAborted { source, .. } => source.kind(),
        }
    }
}

impl From<StateError> for CoreError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::RichQueryUnsupported => Self::unsupported(err.to_string()),
            StateError::InvalidKey(_)
            | StateError::InvalidCompositeKey(_)
            | StateError::InvalidQuery(_)
            | StateError::InvalidPagination(_) => Self::invalid_argument(err.to_string()),
            StateError::Unavailable(_) => Self::StoreFailure(err),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_map_to_kinds() {
        let cases = [
            (StateError::RichQueryUnsupported, ErrorKind::UnsupportedOperation),
            (StateError::invalid_key("x"), ErrorKind::InvalidArgument),
            (StateError::invalid_query("x"), ErrorKind::InvalidArgument),
            (StateError::unavailable("x"), ErrorKind::StoreFailure),
        ];
        for (state, kind) in cases {
            assert_eq!(CoreError::from(state).kind(), kind);
        }
    }

    #[test]
    fn transfer_aborted_reports_source_kind() {
        let err = CoreError::TransferAborted {
            transferred: 2,
            source: Box::new(CoreError::not_found("p3")),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "transfer failed after 2 record(s): record does not exist: p3"
        );
    }
}
