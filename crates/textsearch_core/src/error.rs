//! Error types for textsearch core.

use thiserror::Error;

/// Result type for core operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Boxed error returned by a record resolver.
pub type ResolverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in index maintenance and search.
///
/// `Configuration`, `UnknownField` and `BadQuery` are caused by the caller
/// and are never worth retrying. Store and resolver failures are passed
/// through unchanged.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search setup is unusable.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of what is missing or invalid.
        message: String,
    },

    /// A field was referenced that has no text index.
    #[error("no text index declared for field `{field}`")]
    UnknownField {
        /// The undeclared field name.
        field: String,
    },

    /// A search was issued without any search terms.
    #[error("bad query: {message}")]
    BadQuery {
        /// Description of the problem.
        message: String,
    },

    /// The index store failed.
    #[error("store error: {0}")]
    Store(#[from] textsearch_store::StoreError),

    /// The record resolver failed.
    #[error("record resolver error: {0}")]
    Resolver(#[source] ResolverError),
}

impl SearchError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Creates a bad query error.
    pub fn bad_query(message: impl Into<String>) -> Self {
        Self::BadQuery {
            message: message.into(),
        }
    }
}
