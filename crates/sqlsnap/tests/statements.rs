//! Public-API tests with in-memory collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sqlsnap::{
    ColumnInfo, Dialect, GeneratorConfig, QueryExecutor, Record, RelationKind, SchemaCatalog,
    SnapError, SnapResult, SqlValue, StatementGenerator, TableInfo, TableName, Violation,
    generate_delete_statements,
};

#[derive(Default)]
struct MemoryDb {
    tables: HashMap<String, Vec<&'static str>>,
    rows: HashMap<String, Vec<Record>>,
    hits: AtomicUsize,
}

impl MemoryDb {
    fn table(mut self, name: &str, columns: &[&'static str]) -> Self {
        self.tables.insert(name.to_string(), columns.to_vec());
        self
    }

    fn rows(mut self, query: &str, rows: Vec<Record>) -> Self {
        self.rows.insert(query.to_string(), rows);
        self
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaCatalog for MemoryDb {
    async fn describe(&self, table: &TableName) -> SnapResult<TableInfo> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let columns = self
            .tables
            .get(table.name())
            .ok_or_else(|| SnapError::UnknownTable(table.to_string()))?;
        Ok(TableInfo {
            schema: table.schema().unwrap_or("public").to_string(),
            name: table.name().to_string(),
            kind: RelationKind::Table,
            columns: columns
                .iter()
                .zip(1..)
                .map(|(name, ordinal)| ColumnInfo {
                    name: name.to_string(),
                    data_type: "text".to_string(),
                    not_null: false,
                    default_expr: None,
                    ordinal,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl QueryExecutor for MemoryDb {
    async fn execute(&self, query: &str) -> SnapResult<Vec<Record>> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.rows
            .get(query)
            .cloned()
            .ok_or_else(|| SnapError::Execution("connection reset by peer".to_string()))
    }
}

fn generator(db: &Arc<MemoryDb>) -> StatementGenerator {
    StatementGenerator::new(db.clone(), db.clone())
}

#[test]
fn delete_keeps_predicate() {
    assert_eq!(
        generate_delete_statements(&["SELECT * FROM Users WHERE id = 1"]).unwrap(),
        ["DELETE FROM users WHERE id = 1"]
    );
}

#[test]
fn delete_without_where_has_empty_predicate() {
    assert_eq!(
        generate_delete_statements(&["SELECT * FROM Orders"]).unwrap(),
        ["DELETE FROM orders WHERE "]
    );
}

#[test]
fn chained_drop_is_rejected() {
    let err = generate_delete_statements(&["; DROP TABLE users"]).unwrap_err();
    assert_eq!(err.violation(), Some(Violation::MissingSelect));
}

#[tokio::test]
async fn inserts_for_items() {
    let db = Arc::new(
        MemoryDb::default().table("items", &["id", "name"]).rows(
            "SELECT id, name FROM items",
            vec![
                Record::new().with("id", 1).with("name", "a"),
                Record::new().with("id", 2).with("name", "b"),
            ],
        ),
    );

    let out = generator(&db)
        .generate_insert_statements(&["SELECT id, name FROM items"])
        .await
        .unwrap();
    assert_eq!(
        out,
        [[
            "INSERT INTO items (id, name) VALUES (1, 'a')",
            "INSERT INTO items (id, name) VALUES (2, 'b')",
        ]]
    );
}

#[tokio::test]
async fn second_query_invalid_means_nothing_runs() {
    let db = Arc::new(
        MemoryDb::default()
            .table("items", &["id"])
            .rows("SELECT id FROM items", vec![Record::new().with("id", 1)]),
    );

    let queries = [
        "SELECT id FROM items",
        "SELECT id FROM items; TRUNCATE items",
        "SELECT id FROM items",
    ];
    let err = generator(&db)
        .generate_insert_statements(&queries)
        .await
        .unwrap_err();
    assert_eq!(err.violation(), Some(Violation::UnsafePattern("truncate")));
    assert_eq!(db.hits(), 0);

    let err = generator(&db).generate_delete_statements(&queries).unwrap_err();
    assert!(err.is_invalid_query());
}

#[tokio::test]
async fn driver_errors_are_not_leaked() {
    let db = Arc::new(MemoryDb::default().table("items", &["id"]));
    let err = generator(&db)
        .generate_insert_statements(&["SELECT id FROM items WHERE id = 9"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "database operation failed");
    assert!(!err.to_string().contains("connection reset"));
    assert_eq!(err.detail(), Some("Execution error: connection reset by peer"));
}

#[tokio::test]
async fn oracle_literals() {
    let db = Arc::new(
        MemoryDb::default().table("flags", &["name", "on", "blob"]).rows(
            "SELECT * FROM flags",
            vec![
                Record::new()
                    .with("name", "it's")
                    .with("on", false)
                    .with("blob", SqlValue::Bytes(vec![0x0a, 0xff])),
            ],
        ),
    );

    let resp = generator(&db)
        .with_config(GeneratorConfig::new().dialect(Dialect::Oracle))
        .generate_insert(&["SELECT * FROM flags"])
        .await
        .unwrap();
    assert!(resp.delete_queries.is_empty());
    assert_eq!(
        resp.insert_queries,
        [[r#"INSERT INTO flags (name, "on", blob) VALUES ('it''s', 0, HEXTORAW('0AFF'))"#]]
    );
}
