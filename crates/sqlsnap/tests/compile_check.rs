//! Compile-only checks for the pool-backed API.
//!
//! These do NOT connect to a database; they only check types and signatures.

#![allow(dead_code)]

use std::sync::Arc;

use sqlsnap::{
    GeneratorConfig, PgDatabase, QueryExecutor, SchemaCatalog, SnapResult, StatementGenerator,
    TableName,
};

async fn _describe_and_execute_compiles(db: &PgDatabase) -> SnapResult<usize> {
    let table = TableName::parse("public.items")?;
    let info = db.describe(&table).await?;
    let rows = db.execute("SELECT * FROM public.items").await?;
    Ok(info.columns.len() + rows.len())
}

async fn _generator_from_pool_compiles(url: &str) -> SnapResult<String> {
    let pool = sqlsnap::create_pool_with_config(url, 4)?;
    let generator = StatementGenerator::from_pool(pool)
        .with_config(GeneratorConfig::new().max_concurrency(4));
    let resp = generator.generate_both(&["SELECT * FROM items"]).await?;
    Ok(resp.to_sql_script())
}

fn _generator_is_send_sync(db: PgDatabase) {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}
    let db = Arc::new(db);
    let generator = StatementGenerator::new(db.clone(), db);
    assert_send_sync(&generator);
}

async fn _insert_future_is_send(generator: StatementGenerator) {
    fn assert_send<T: Send>(t: T) -> T {
        t
    }
    let queries = vec!["SELECT * FROM items".to_string()];
    let _ = assert_send(generator.generate_insert_statements(&queries)).await;
}
