//! Minimal database access for introspection.
//!
//! sqlsnap-check only ever reads catalog rows, so the trait carries a single
//! `query` method. It is implemented for `tokio_postgres::Client` and
//! `tokio_postgres::Transaction`; pooled clients deref to the former.

use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

use crate::error::{CheckError, CheckResult};

/// A type that can run a PostgreSQL query.
#[async_trait::async_trait]
pub trait CheckClient: Sync {
    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Vec<Row>>;
}

#[async_trait::async_trait]
impl CheckClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(CheckError::from)
    }
}

#[async_trait::async_trait]
impl CheckClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(CheckError::from)
    }
}

/// Column access that reports the column name on failure.
pub trait RowExt {
    fn try_get_column<'a, T>(&'a self, column: &str) -> CheckResult<T>
    where
        T: FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<'a, T>(&'a self, column: &str) -> CheckResult<T>
    where
        T: FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| CheckError::decode(column, e.to_string()))
    }
}
