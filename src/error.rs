//! Error types for the cadfilter library

use crate::types::Handle;
use thiserror::Error;

/// Main error type for filtering and caching operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Key extractor produced the null sentinel and no fallback policy is installed
    #[error("missing referent key: {0}")]
    MissingKey(&'static str),

    /// A referent could not be located in the store
    #[error("object not found: handle {0:#X}")]
    NotFound(Handle),

    /// A resolved referent does not match the expected shape
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Structural mutation attempted after the compiled predicate was demanded
    #[error("filter is frozen: {0}")]
    FrozenState(&'static str),

    /// A structurally equivalent child node is already attached
    #[error("duplicate child filter: {0}")]
    DuplicateChild(String),

    /// Null/empty required argument
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for cadfilter operations
pub type Result<T> = std::result::Result<T, FilterError>;

impl From<String> for FilterError {
    fn from(s: String) -> Self {
        FilterError::Custom(s)
    }
}

impl From<&str> for FilterError {
    fn from(s: &str) -> Self {
        FilterError::Custom(s.to_string())
    }
}
