//! # sqlsnap
//!
//! Turn read-only SELECT statements into the DELETE and INSERT statements that
//! would remove or recreate the rows they return.
//!
//! ## Features
//!
//! - **DELETE synthesis**: same table and (sanitized) WHERE predicate as the SELECT
//! - **INSERT synthesis**: one statement per returned row, literals inline,
//!   columns in table definition order
//! - **Dialects**: literals rendered for Postgres or Oracle
//! - **All-or-nothing batches**: every query is validated before any database access
//! - **Pluggable collaborators**: `SchemaCatalog` and `QueryExecutor` traits,
//!   with `PgDatabase` over a deadpool pool
//!
//! ## Example
//!
//! ```ignore
//! use sqlsnap::{Dialect, GeneratorConfig, StatementGenerator};
//!
//! let pool = sqlsnap::create_pool("postgres://localhost/app")?;
//! let generator = StatementGenerator::from_pool(pool)
//!     .with_config(GeneratorConfig::new().dialect(Dialect::Oracle).strict());
//!
//! let resp = generator
//!     .generate_both(&["SELECT * FROM items WHERE id < 10"])
//!     .await?;
//! print!("{}", resp.to_sql_script());
//! ```

pub mod catalog;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod generator;
pub mod response;
pub mod synth;
pub mod value;

pub use catalog::SchemaCatalog;
pub use config::{DEFAULT_MAX_LOGGED_SQL_LENGTH, DangerousDmlPolicy, GeneratorConfig};
pub use dialect::Dialect;
pub use error::{SnapError, SnapResult};
pub use executor::QueryExecutor;
pub use generator::{
    StatementGenerator, generate_delete_statements, generate_delete_statements_with_config,
};
pub use response::{GenerateRequest, GenerateResponse, Operation};
pub use synth::{DeleteSynthesizer, InsertSynthesizer};
pub use value::{Record, SqlValue};

pub use sqlsnap_check::{
    ColumnInfo, QueryValidator, RelationKind, Strictness, TableInfo, TableName, Violation,
    extract_table_name, sanitize_where_clause, validate_query_for_sql_injection,
    validate_select_query,
};

#[cfg(feature = "pool")]
pub mod database;
#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use database::PgDatabase;
#[cfg(feature = "pool")]
pub use pool::{DEFAULT_POOL_SIZE, create_pool, create_pool_with_config};
