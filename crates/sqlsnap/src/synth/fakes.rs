//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sqlsnap_check::{ColumnInfo, RelationKind, TableInfo, TableName};

use crate::catalog::SchemaCatalog;
use crate::error::{SnapError, SnapResult};
use crate::executor::QueryExecutor;
use crate::value::Record;

#[derive(Default)]
pub(crate) struct FakeCatalog {
    tables: HashMap<String, TableInfo>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `name` with text columns in the given order.
    pub(crate) fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
        let info = TableInfo {
            schema: "public".to_string(),
            name: name.to_string(),
            kind: RelationKind::Table,
            columns: columns
                .iter()
                .enumerate()
                .map(|(i, c)| ColumnInfo {
                    name: c.to_string(),
                    data_type: "text".to_string(),
                    not_null: false,
                    default_expr: None,
                    ordinal: i as i32 + 1,
                })
                .collect(),
        };
        self.tables.insert(name.to_string(), info);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaCatalog for FakeCatalog {
    async fn describe(&self, table: &TableName) -> SnapResult<TableInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(&table.to_string())
            .cloned()
            .ok_or_else(|| SnapError::UnknownTable(table.to_string()))
    }
}

#[derive(Default)]
pub(crate) struct FakeExecutor {
    results: HashMap<String, Vec<Record>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FakeExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(mut self, query: &str, rows: Vec<Record>) -> Self {
        self.results.insert(query.to_string(), rows);
        self
    }

    /// Make `query` take `delay` before answering.
    pub(crate) fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn execute(&self, query: &str) -> SnapResult<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        self.results
            .get(query)
            .cloned()
            .ok_or_else(|| SnapError::Execution(format!("relation for {query:?} does not exist")))
    }
}
