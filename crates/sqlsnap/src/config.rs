use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlsnap_check::{Strictness, Violation};

use crate::dialect::Dialect;
use crate::error::SnapError;

/// Default cap on SQL text length in log events.
pub const DEFAULT_MAX_LOGGED_SQL_LENGTH: usize = 200;

/// Configuration for [`StatementGenerator`](crate::StatementGenerator).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Dialect INSERT literals are rendered in.
    pub dialect: Dialect,
    /// How strictly input SELECTs are validated.
    pub strictness: Strictness,
    /// What to do with a SELECT that has no WHERE when generating DELETEs.
    pub delete_without_where: DangerousDmlPolicy,
    /// Number of SELECTs run at once during INSERT generation.
    pub max_concurrency: usize,
    /// Deadline for introspecting and running one SELECT.
    pub query_timeout: Option<Duration>,
    /// SQL longer than this many bytes is cut in log events.
    pub max_logged_sql_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            strictness: Strictness::default(),
            delete_without_where: DangerousDmlPolicy::Allow,
            max_concurrency: 1,
            query_timeout: None,
            max_logged_sql_length: DEFAULT_MAX_LOGGED_SQL_LENGTH,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the literal dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the validation level.
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Reject `;` and `--` in input SELECTs.
    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Hardened;
        self
    }

    /// Configure how a SELECT without WHERE is handled for DELETE generation.
    pub fn delete_without_where(mut self, policy: DangerousDmlPolicy) -> Self {
        self.delete_without_where = policy;
        self
    }

    /// Run up to `n` SELECTs concurrently. Values below 1 are treated as 1.
    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    /// Set the per-query timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }

    /// Set the log truncation length for SQL text.
    pub fn max_logged_sql_length(mut self, len: usize) -> Self {
        self.max_logged_sql_length = len;
        self
    }
}

/// Policy for statements that would touch every row of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerousDmlPolicy {
    #[default]
    Allow,
    Warn,
    Error,
}

pub(crate) fn handle_unfiltered_delete(
    policy: DangerousDmlPolicy,
    index: usize,
    sql: &str,
) -> Result<(), SnapError> {
    match policy {
        DangerousDmlPolicy::Allow => Ok(()),
        DangerousDmlPolicy::Warn => {
            tracing::warn!(
                target: "sqlsnap.sql",
                index,
                sql,
                "DELETE generated without WHERE predicate"
            );
            Ok(())
        }
        DangerousDmlPolicy::Error => Err(SnapError::invalid(Violation::MissingPredicate)),
    }
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
