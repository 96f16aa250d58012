//! Pool-backed implementation of both collaborators.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use sqlsnap_check::{TableInfo, TableName, describe_table};

use crate::catalog::SchemaCatalog;
use crate::error::{SnapError, SnapResult};
use crate::executor::QueryExecutor;
use crate::value::Record;

/// Schema catalog and query executor over a `deadpool_postgres::Pool`.
///
/// Every call checks a client out of the pool and returns it when the call
/// ends. SELECTs run inside a read-only transaction that is rolled back after
/// the rows are fetched.
#[derive(Clone)]
pub struct PgDatabase {
    pool: Pool,
}

impl PgDatabase {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl std::fmt::Debug for PgDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("PgDatabase")
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .finish()
    }
}

#[async_trait]
impl SchemaCatalog for PgDatabase {
    async fn describe(&self, table: &TableName) -> SnapResult<TableInfo> {
        let client = self.pool.get().await?;
        let info = describe_table(&**client, table).await?;
        info.ok_or_else(|| SnapError::UnknownTable(table.to_string()))
    }
}

#[async_trait]
impl QueryExecutor for PgDatabase {
    async fn execute(&self, query: &str) -> SnapResult<Vec<Record>> {
        let mut client = self.pool.get().await?;
        let pg: &mut tokio_postgres::Client = &mut client;

        let tx = pg.build_transaction().read_only(true).start().await?;
        let rows = tx.query(query, &[]).await?;
        tx.rollback().await?;

        tracing::debug!(target: "sqlsnap.db", rows = rows.len(), "fetched source rows");
        rows.iter().map(Record::from_row).collect()
    }
}
