//! DELETE generation without a database
//!
//! Run with: cargo run --example delete_only -p sqlsnap

use sqlsnap::{
    DangerousDmlPolicy, GeneratorConfig, SnapError, generate_delete_statements_with_config,
};

fn main() -> Result<(), SnapError> {
    let queries = [
        "SELECT * FROM Users WHERE id = 42",
        "SELECT o.id FROM sales.orders o WHERE o.status = 'open' ORDER BY o.id",
        "SELECT * FROM audit_log",
    ];

    let deletes = sqlsnap::generate_delete_statements(&queries)?;
    for sql in &deletes {
        println!("{sql};");
    }

    // Same batch, but a SELECT without WHERE is now an error.
    let strict = GeneratorConfig::new().delete_without_where(DangerousDmlPolicy::Error);
    match generate_delete_statements_with_config(&strict, &queries) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("rejected: {e}"),
    }

    // Injection attempts never produce SQL.
    let err = sqlsnap::generate_delete_statements(&["SELECT * FROM t; DROP TABLE t"]).unwrap_err();
    println!("rejected: {err}");

    Ok(())
}
