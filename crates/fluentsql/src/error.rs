//! Error types for fluentsql

use crate::value::ValueError;
use thiserror::Error;

/// Result type alias for fluentsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for building and running statements.
///
/// Build errors (`InvalidFilter`, `UnsupportedProvider`, `Unsupported`,
/// `InvalidStatement`, `Internal`) are raised before anything reaches the
/// executor and are safe to retry once the input is corrected.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A filter combination the dialect cannot compile (e.g. `IN` between two columns)
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Unknown provider identifier in configuration
    #[error("Unsupported database provider: {0}")]
    UnsupportedProvider(String),

    /// Construct the selected dialect cannot express
    #[error("Unsupported by {dialect}: {message}")]
    Unsupported {
        dialect: &'static str,
        message: String,
    },

    /// Statement descriptor is not compilable (empty value map, empty column list, ...)
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// Internal invariant broken while compiling.
    ///
    /// Not produced by the bundled compilers, whose leaf and node matches are
    /// exhaustive. Reserved for custom [`SqlBuilder`](crate::SqlBuilder)
    /// implementations and classified as a build error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error raised by the executor, propagated verbatim
    #[error("Execution error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Single-row retrieval matched no rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: ValueError,
    },

    /// Configuration loading or lookup error
    #[error("Config error: {0}")]
    Config(String),

    /// A transactional unit of work panicked; the transaction was rolled back
    #[error("Transaction body panicked: {0}")]
    Panicked(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, source: ValueError) -> Self {
        Self::Decode {
            column: column.into(),
            source,
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// Create an invalid statement error
    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::InvalidStatement(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap any executor error without altering it
    pub fn execution<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Execution(Box::new(err))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error was raised while compiling, before any execution
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFilter(_)
                | Self::UnsupportedProvider(_)
                | Self::Unsupported { .. }
                | Self::InvalidStatement(_)
                | Self::Internal(_)
        )
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for SqlError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::execution(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_errors_are_classified() {
        assert!(SqlError::invalid_filter("IN between columns").is_build_error());
        assert!(SqlError::UnsupportedProvider("oracle".into()).is_build_error());
        assert!(SqlError::Internal("unknown leaf".into()).is_build_error());
        assert!(!SqlError::not_found("no rows").is_build_error());
        assert!(SqlError::not_found("no rows").is_not_found());
    }

    #[test]
    fn decode_message_names_column() {
        let err = SqlError::decode(
            "age",
            ValueError::Mismatch {
                expected: "i64",
                found: "text",
            },
        );
        assert_eq!(
            err.to_string(),
            "Decode error on column 'age': cannot convert text to i64"
        );
    }
}
