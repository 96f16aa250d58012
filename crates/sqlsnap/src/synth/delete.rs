use sqlsnap_check::{QueryValidator, check_predicate_balance, sanitize_where_clause};

use crate::config::{
    DangerousDmlPolicy, GeneratorConfig, handle_unfiltered_delete, truncate_sql_bytes,
};
use crate::error::SnapResult;

/// Builds `DELETE FROM <table> WHERE <predicate>` from a SELECT.
#[derive(Debug, Clone, Copy)]
pub struct DeleteSynthesizer {
    validator: QueryValidator,
    policy: DangerousDmlPolicy,
    max_logged_sql_length: usize,
}

impl DeleteSynthesizer {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            validator: QueryValidator::new(config.strictness),
            policy: config.delete_without_where,
            max_logged_sql_length: config.max_logged_sql_length,
        }
    }

    /// Validate `query` and derive its DELETE.
    ///
    /// The predicate is the sanitized text after the top-level WHERE. A
    /// SELECT without WHERE yields `DELETE FROM <table> WHERE ` unless the
    /// policy rejects it.
    pub fn synthesize(&self, index: usize, query: &str) -> SnapResult<String> {
        let parts = self.validator.analyze(query)?;
        let sanitized = sanitize_where_clause(&parts.predicate);
        let predicate = sanitized.trim();
        check_predicate_balance(predicate)?;

        let sql = format!("DELETE FROM {} WHERE {}", parts.table, predicate);
        if predicate.is_empty() {
            handle_unfiltered_delete(
                self.policy,
                index,
                truncate_sql_bytes(query, self.max_logged_sql_length),
            )?;
        }

        tracing::debug!(
            target: "sqlsnap.batch",
            index,
            table = %parts.table,
            "generated DELETE"
        );
        Ok(sql)
    }
}
