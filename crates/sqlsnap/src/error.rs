//! Error types for sqlsnap

use sqlsnap_check::{CheckError, Violation};
use thiserror::Error;

/// Result type alias for sqlsnap operations
pub type SnapResult<T> = Result<T, SnapError>;

/// Error types for statement generation
#[derive(Debug, Error)]
pub enum SnapError {
    /// A SELECT failed validation or extraction
    #[error("Invalid query: {0}")]
    InvalidQuery(Violation),

    /// The schema catalog has no such table
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The executor failed to run a SELECT
    #[error("Execution error: {0}")]
    Execution(String),

    /// Introspection or execution failed during INSERT synthesis.
    ///
    /// `detail` is meant for logs; it never appears in the message.
    #[error("database operation failed")]
    DatabaseOperationFailed { detail: String },

    /// A returned column is not part of the table definition
    #[error("Column '{column}' is not defined on table '{table}'")]
    ColumnMismatch { table: String, column: String },

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// A result column has a type no literal can be rendered for
    #[error("Unsupported type '{type_name}' for column '{column}'")]
    UnsupportedType { column: String, type_name: String },

    /// A value has no literal form in the configured dialect
    #[error("{kind} values cannot be rendered as {dialect} literals")]
    UnsupportedLiteral {
        dialect: &'static str,
        kind: &'static str,
    },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SnapError {
    /// Create an invalid-query error for a violated rule
    pub fn invalid(violation: Violation) -> Self {
        Self::InvalidQuery(violation)
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Wrap any failure as a generic database failure, keeping its text as detail
    pub fn database_failed(detail: impl Into<String>) -> Self {
        Self::DatabaseOperationFailed {
            detail: detail.into(),
        }
    }

    /// The violated rule, if this is a validation failure
    pub fn violation(&self) -> Option<Violation> {
        match self {
            Self::InvalidQuery(v) => Some(*v),
            _ => None,
        }
    }

    /// Check if this is caller input at fault rather than the database
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }

    /// Check if this is a hidden database failure
    pub fn is_database_failure(&self) -> bool {
        matches!(self, Self::DatabaseOperationFailed { .. })
    }

    /// Logged detail of a database failure
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::DatabaseOperationFailed { detail } => Some(detail),
            _ => None,
        }
    }
}

impl From<Violation> for SnapError {
    fn from(v: Violation) -> Self {
        Self::InvalidQuery(v)
    }
}

impl From<CheckError> for SnapError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::InvalidQuery(v) => Self::InvalidQuery(v),
            // Identifiers only reach parsing through extraction.
            CheckError::InvalidIdentifier(_) => Self::InvalidQuery(Violation::MissingTableName),
            CheckError::Database(e) => Self::Execution(e.to_string()),
            CheckError::Decode { column, message } => Self::Decode { column, message },
        }
    }
}

impl From<tokio_postgres::Error> for SnapError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Execution(err.to_string())
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SnapError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_failure_hides_detail() {
        let err = SnapError::database_failed("relation \"secret_table\" does not exist");
        assert_eq!(err.to_string(), "database operation failed");
        assert_eq!(err.detail(), Some("relation \"secret_table\" does not exist"));
        assert!(err.is_database_failure());
    }

    #[test]
    fn check_errors_keep_their_rule() {
        let err = SnapError::from(CheckError::from(Violation::UnsafePattern("union")));
        assert_eq!(err.violation(), Some(Violation::UnsafePattern("union")));
        assert_eq!(err.to_string(), "Invalid query: unsafe pattern: union");

        let err = SnapError::from(CheckError::identifier("Trailing '.' in identifier"));
        assert_eq!(err.violation(), Some(Violation::MissingTableName));
    }

    #[test]
    fn unsupported_literal_message() {
        let err = SnapError::UnsupportedLiteral {
            dialect: "oracle",
            kind: "array",
        };
        assert_eq!(err.to_string(), "array values cannot be rendered as oracle literals");
    }
}
