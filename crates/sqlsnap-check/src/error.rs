//! Error types for sqlsnap-check

use thiserror::Error;

/// Result type for sqlsnap-check operations.
pub type CheckResult<T> = Result<T, CheckError>;

/// The specific rule a rejected query violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    /// Query text does not begin with `SELECT`.
    #[error("missing SELECT")]
    MissingSelect,
    /// Query text never mentions `FROM`.
    #[error("missing FROM")]
    MissingFrom,
    /// A forbidden keyword appears as a whole word.
    #[error("unsafe pattern: {0}")]
    UnsafePattern(&'static str),
    /// A statement terminator or comment marker appears in hardened mode.
    #[error("suspicious sequence: {0}")]
    SuspiciousSequence(&'static str),
    /// No plain table identifier follows the top-level `FROM`.
    #[error("missing table name after FROM")]
    MissingTableName,
    /// The sanitized predicate has unmatched parentheses or quotes.
    #[error("unbalanced predicate: {0}")]
    UnbalancedPredicate(&'static str),
    /// The text could not be lexed as SQL (unterminated literal or comment).
    #[error("malformed SQL: {0}")]
    MalformedText(&'static str),
    /// DELETE without a predicate under a rejecting policy.
    #[error("missing WHERE predicate")]
    MissingPredicate,
}

/// Error type for sqlsnap-check operations.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The query failed validation.
    #[error("Invalid query: {0}")]
    InvalidQuery(Violation),
    /// An identifier could not be parsed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Database error from tokio-postgres.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),
    /// Decode error when reading a column.
    #[error("Decode error for column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl CheckError {
    /// Create a decode error.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an identifier error.
    pub fn identifier(message: impl Into<String>) -> Self {
        CheckError::InvalidIdentifier(message.into())
    }

    /// The violated rule, if this is a validation failure.
    pub fn violation(&self) -> Option<Violation> {
        match self {
            CheckError::InvalidQuery(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Violation> for CheckError {
    fn from(v: Violation) -> Self {
        CheckError::InvalidQuery(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_messages_name_the_rule() {
        assert_eq!(
            CheckError::from(Violation::MissingSelect).to_string(),
            "Invalid query: missing SELECT"
        );
        assert_eq!(
            Violation::UnsafePattern("drop").to_string(),
            "unsafe pattern: drop"
        );
    }
}
