//! Batch entry points.
//!
//! A batch is all-or-nothing: the first failing query aborts it and no
//! statements are returned. INSERT batches validate every query before the
//! first database call.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt, TryStreamExt, stream};
use sqlsnap_check::{QueryValidator, TableName};

use crate::catalog::SchemaCatalog;
use crate::config::{GeneratorConfig, truncate_sql_bytes};
use crate::error::{SnapError, SnapResult};
use crate::executor::QueryExecutor;
use crate::response::{GenerateResponse, Operation};
use crate::synth::{DeleteSynthesizer, InsertSynthesizer};

/// Generate DELETE statements with the default configuration.
///
/// # Example
/// ```
/// let sql = sqlsnap::generate_delete_statements(&["SELECT * FROM Users WHERE id = 1"])?;
/// assert_eq!(sql, ["DELETE FROM users WHERE id = 1"]);
/// # Ok::<(), sqlsnap::SnapError>(())
/// ```
pub fn generate_delete_statements<S: AsRef<str>>(queries: &[S]) -> SnapResult<Vec<String>> {
    generate_delete_statements_with_config(&GeneratorConfig::default(), queries)
}

/// [`generate_delete_statements`] with an explicit strictness and policy.
pub fn generate_delete_statements_with_config<S: AsRef<str>>(
    config: &GeneratorConfig,
    queries: &[S],
) -> SnapResult<Vec<String>> {
    tracing::debug!(target: "sqlsnap.batch", queries = queries.len(), "generating DELETE batch");
    let synth = DeleteSynthesizer::new(config);
    queries
        .iter()
        .enumerate()
        .map(|(index, query)| {
            synth
                .synthesize(index, query.as_ref())
                .inspect_err(|e| log_rejected(config, index, query.as_ref(), e))
        })
        .collect()
}

fn log_rejected(config: &GeneratorConfig, index: usize, query: &str, err: &SnapError) {
    tracing::debug!(
        target: "sqlsnap.batch",
        index,
        sql = truncate_sql_bytes(query, config.max_logged_sql_length),
        error = %err,
        "query rejected"
    );
}

/// Generates DELETE and INSERT statements for batches of SELECTs.
#[derive(Clone)]
pub struct StatementGenerator {
    catalog: Arc<dyn SchemaCatalog>,
    executor: Arc<dyn QueryExecutor>,
    config: GeneratorConfig,
}

impl StatementGenerator {
    pub fn new(catalog: Arc<dyn SchemaCatalog>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            catalog,
            executor,
            config: GeneratorConfig::default(),
        }
    }

    /// A generator whose catalog and executor share one pool.
    #[cfg(feature = "pool")]
    pub fn from_pool(pool: deadpool_postgres::Pool) -> Self {
        let db = Arc::new(crate::database::PgDatabase::new(pool));
        Self::new(db.clone(), db)
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One DELETE per query, in input order. No database access.
    pub fn generate_delete_statements<S: AsRef<str>>(
        &self,
        queries: &[S],
    ) -> SnapResult<Vec<String>> {
        generate_delete_statements_with_config(&self.config, queries)
    }

    /// One list of INSERTs per query, in input order.
    ///
    /// Every query is validated and its table extracted before the first
    /// database call, so an invalid query anywhere in the batch means no
    /// database access at all.
    pub async fn generate_insert_statements<S: AsRef<str> + Sync>(
        &self,
        queries: &[S],
    ) -> SnapResult<Vec<Vec<String>>> {
        let tables = self.extract_tables(queries)?;
        let synth = InsertSynthesizer::new(&*self.catalog, &*self.executor, &self.config);
        let concurrency = self.config.max_concurrency.max(1);

        tracing::debug!(
            target: "sqlsnap.batch",
            queries = queries.len(),
            concurrency,
            "generating INSERT batch"
        );

        if concurrency == 1 {
            let mut out = Vec::with_capacity(queries.len());
            for (index, (query, table)) in queries.iter().zip(&tables).enumerate() {
                out.push(synth.synthesize(index, table, query.as_ref()).await?);
            }
            return Ok(out);
        }

        // Boxed so the stream's item type is a plain `Send` future.
        let pending: Vec<BoxFuture<'_, SnapResult<Vec<String>>>> = queries
            .iter()
            .zip(&tables)
            .enumerate()
            .map(|(index, (query, table))| synth.synthesize(index, table, query.as_ref()).boxed())
            .collect();
        stream::iter(pending)
            .buffered(concurrency)
            .try_collect()
            .await
    }

    fn extract_tables<S: AsRef<str>>(&self, queries: &[S]) -> SnapResult<Vec<TableName>> {
        let validator = QueryValidator::new(self.config.strictness);
        queries
            .iter()
            .enumerate()
            .map(|(index, query)| {
                validator
                    .extract_table_name(query.as_ref())
                    .map_err(SnapError::from)
                    .inspect_err(|e| log_rejected(&self.config, index, query.as_ref(), e))
            })
            .collect()
    }

    /// Run `operation` over `queries`.
    ///
    /// For [`Operation::Both`] the DELETEs are generated first, so a query
    /// that fails validation never reaches the database.
    pub async fn generate<S: AsRef<str> + Sync>(
        &self,
        operation: Operation,
        queries: &[S],
    ) -> SnapResult<GenerateResponse> {
        let mut response = GenerateResponse::default();
        if operation.includes_delete() {
            response.delete_queries = self.generate_delete_statements(queries)?;
        }
        if operation.includes_insert() {
            response.insert_queries = self.generate_insert_statements(queries).await?;
        }
        Ok(response)
    }

    pub async fn generate_delete<S: AsRef<str> + Sync>(
        &self,
        queries: &[S],
    ) -> SnapResult<GenerateResponse> {
        self.generate(Operation::Delete, queries).await
    }

    pub async fn generate_insert<S: AsRef<str> + Sync>(
        &self,
        queries: &[S],
    ) -> SnapResult<GenerateResponse> {
        self.generate(Operation::Insert, queries).await
    }

    pub async fn generate_both<S: AsRef<str> + Sync>(
        &self,
        queries: &[S],
    ) -> SnapResult<GenerateResponse> {
        self.generate(Operation::Both, queries).await
    }
}

impl std::fmt::Debug for StatementGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
