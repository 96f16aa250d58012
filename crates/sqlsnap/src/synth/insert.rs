use std::time::Duration;

use sqlsnap_check::{TableInfo, TableName};

use crate::catalog::SchemaCatalog;
use crate::config::{GeneratorConfig, truncate_sql_bytes};
use crate::dialect::Dialect;
use crate::error::{SnapError, SnapResult};
use crate::executor::QueryExecutor;
use crate::value::{Record, SqlValue};

/// Renders one INSERT per row a SELECT returns.
///
/// The table is described fresh for every query; nothing is cached between
/// calls.
pub struct InsertSynthesizer<'a> {
    catalog: &'a dyn SchemaCatalog,
    executor: &'a dyn QueryExecutor,
    dialect: Dialect,
    query_timeout: Option<Duration>,
    max_logged_sql_length: usize,
}

impl<'a> InsertSynthesizer<'a> {
    pub fn new(
        catalog: &'a dyn SchemaCatalog,
        executor: &'a dyn QueryExecutor,
        config: &GeneratorConfig,
    ) -> Self {
        Self {
            catalog,
            executor,
            dialect: config.dialect,
            query_timeout: config.query_timeout,
            max_logged_sql_length: config.max_logged_sql_length,
        }
    }

    /// Describe `table`, run `query` and render its rows.
    ///
    /// `query` must already be validated and `table` extracted from it.
    /// Database failures come back as [`SnapError::DatabaseOperationFailed`].
    pub async fn synthesize(
        &self,
        index: usize,
        table: &TableName,
        query: &str,
    ) -> SnapResult<Vec<String>> {
        let fetched = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch(table, query))
                .await
                .unwrap_or_else(|_| {
                    Err(SnapError::database_failed(format!(
                        "timed out after {limit:?}"
                    )))
                }),
            None => self.fetch(table, query).await,
        };
        let (info, rows) = fetched.map_err(|e| self.hide_database_error(index, query, e))?;

        tracing::debug!(
            target: "sqlsnap.batch",
            index,
            table = %table,
            rows = rows.len(),
            "fetched rows for INSERT"
        );

        rows.iter()
            .map(|row| self.render_row(table, &info, row))
            .collect()
    }

    async fn fetch(&self, table: &TableName, query: &str) -> SnapResult<(TableInfo, Vec<Record>)> {
        let info = self.catalog.describe(table).await?;
        let rows = self.executor.execute(query).await?;
        Ok((info, rows))
    }

    fn hide_database_error(&self, index: usize, query: &str, err: SnapError) -> SnapError {
        match err {
            SnapError::InvalidQuery(_) | SnapError::UnknownTable(_) => err,
            SnapError::DatabaseOperationFailed { detail } => {
                self.log_failure(index, query, &detail);
                SnapError::DatabaseOperationFailed { detail }
            }
            other => {
                let detail = other.to_string();
                self.log_failure(index, query, &detail);
                SnapError::DatabaseOperationFailed { detail }
            }
        }
    }

    fn log_failure(&self, index: usize, query: &str, detail: &str) {
        tracing::error!(
            target: "sqlsnap.db",
            index,
            sql = truncate_sql_bytes(query, self.max_logged_sql_length),
            detail,
            "database operation failed"
        );
    }

    /// Columns follow table definition order, limited to those the row has.
    fn render_row(&self, table: &TableName, info: &TableInfo, row: &Record) -> SnapResult<String> {
        if let Some(column) = row.columns().find(|c| info.find_column(c).is_none()) {
            return Err(SnapError::ColumnMismatch {
                table: table.to_string(),
                column: column.to_string(),
            });
        }

        let values: Vec<(&str, &SqlValue)> = info
            .column_names()
            .filter_map(|name| row.get(name).map(|value| (name, value)))
            .collect();

        self.dialect.render_insert(table, &values)
    }
}
