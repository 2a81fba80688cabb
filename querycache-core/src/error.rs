//! Error types for QueryCache.
//!
//! This module provides the error hierarchy using `thiserror`.
//! The cache layer never swallows or retries a failure: whatever a query
//! reports surfaces to the caller through these variants.

use thiserror::Error;

/// Result type alias using `QueryCacheError`.
pub type Result<T> = std::result::Result<T, QueryCacheError>;

/// Main error type for all QueryCache operations.
#[derive(Debug, Error)]
pub enum QueryCacheError {
    // ═══════════════════════════════════════════════════════════════════════════
    // QUERY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The query instance could not be constructed.
    #[error("Failed to construct query '{query}': {reason}")]
    ConstructionFailed { query: String, reason: String },

    /// The query's `execute` reported a failure.
    #[error("Query '{query}' failed: {reason}")]
    ExecutionFailed { query: String, reason: String },

    /// A cached entry holds a different query type than the one requested.
    #[error("Cache entry '{key}' does not hold a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    // ═══════════════════════════════════════════════════════════════════════════
    // ARGUMENT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A required positional argument was not supplied.
    #[error("Missing positional argument at index {index}")]
    MissingArgument { index: usize },

    /// A required named argument was not supplied.
    #[error("Missing named argument: {0}")]
    MissingNamedArgument(String),

    /// An argument could not be decoded into the type the query expects.
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl QueryCacheError {
    /// Builds an `ExecutionFailed` error for the named query.
    pub fn execution(query: impl Into<String>, reason: impl ToString) -> Self {
        QueryCacheError::ExecutionFailed {
            query: query.into(),
            reason: reason.to_string(),
        }
    }

    /// Builds a `ConstructionFailed` error for the named query.
    pub fn construction(query: impl Into<String>, reason: impl ToString) -> Self {
        QueryCacheError::ConstructionFailed {
            query: query.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error was raised by a query's own construction or execution.
    pub fn is_query_failure(&self) -> bool {
        matches!(
            self,
            QueryCacheError::ConstructionFailed { .. } | QueryCacheError::ExecutionFailed { .. }
        )
    }

    /// Returns true if this is an argument access error.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            QueryCacheError::MissingArgument { .. }
                | QueryCacheError::MissingNamedArgument(_)
                | QueryCacheError::InvalidArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryCacheError::execution("BarQuery", "backend unavailable");
        assert_eq!(err.to_string(), "Query 'BarQuery' failed: backend unavailable");

        let err = QueryCacheError::MissingArgument { index: 2 };
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_error_classification() {
        assert!(QueryCacheError::execution("q", "boom").is_query_failure());
        assert!(QueryCacheError::construction("q", "boom").is_query_failure());
        assert!(!QueryCacheError::ConfigError("bad".into()).is_query_failure());

        assert!(QueryCacheError::MissingArgument { index: 0 }.is_argument_error());
        assert!(QueryCacheError::MissingNamedArgument("limit".into()).is_argument_error());
        assert!(!QueryCacheError::execution("q", "boom").is_argument_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(QueryCacheError::from);
        assert!(matches!(result, Err(QueryCacheError::JsonError(_))));
    }
}
