//! Ledger configuration.

/// Default entity kind written to every record's `docType`.
pub const DEFAULT_KIND: &str = "picture";

/// Default name of the category secondary index.
pub const DEFAULT_INDEX_NAME: &str = "category~id";

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Entity kind stored in each record, distinguishing it from other
    /// document types sharing the keyspace.
    pub kind: String,

    /// Object type of the `(category, id)` composite index keys.
    pub index_name: String,

    /// Largest page size accepted by paginated queries.
    pub max_page_size: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind: DEFAULT_KIND.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            max_page_size: i32::MAX,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity kind.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Sets the index name.
    #[must_use]
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Sets the largest accepted page size.
    #[must_use]
    pub const fn max_page_size(mut self, size: i32) -> Self {
        self.max_page_size = size;
        self
    }
}
