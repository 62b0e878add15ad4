//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A key was used with an operation for a different value type.
    #[error("wrong type for key {key}: expected {expected}")]
    WrongType {
        /// The offending key.
        key: String,
        /// The value type the operation required.
        expected: &'static str,
    },

    /// The connection to the store failed or was lost.
    #[error("connection error: {0}")]
    Connection(String),

    /// The store is closed.
    #[error("store is closed")]
    Closed,

    /// Any other failure reported by the store.
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a wrong-type error for a key that should hold a set.
    pub fn expected_set(key: impl Into<String>) -> Self {
        Self::WrongType {
            key: key.into(),
            expected: "set",
        }
    }

    /// Creates a wrong-type error for a key that should hold a string.
    pub fn expected_string(key: impl Into<String>) -> Self {
        Self::WrongType {
            key: key.into(),
            expected: "string",
        }
    }
}
