//! sqlsnap-check
//!
//! Static checks for the SELECT statements sqlsnap turns into DELETE and
//! INSERT scripts.
//!
//! # Features
//!
//! - **Validation**: SELECT/FROM structure, forbidden keywords, and an optional
//!   hardened mode rejecting `;` and `--`
//! - **Extraction**: the primary FROM target and WHERE predicate, found on the
//!   PostgreSQL scanner's token stream so literals, comments and subqueries
//!   are skipped
//! - **Sanitizing**: whitelist filtering and balance checks for predicates
//! - **Introspection**: column metadata for one table from `pg_catalog`
//!
//! # Example
//!
//! ```
//! use sqlsnap_check::{QueryValidator, sanitize_where_clause};
//!
//! let parts = QueryValidator::hardened().analyze("SELECT * FROM Users WHERE id = 1")?;
//! assert_eq!(parts.table.to_string(), "users");
//! assert_eq!(sanitize_where_clause(&parts.predicate), "id = 1");
//! # Ok::<(), sqlsnap_check::CheckError>(())
//! ```

pub mod client;
pub mod error;
pub mod extract;
pub mod ident;
pub mod lexer;
pub mod schema_introspect;
pub mod validator;

pub use client::{CheckClient, RowExt};
pub use error::{CheckError, CheckResult, Violation};
pub use extract::{SelectParts, analyze_select, extract_table_name, extract_where_clause};
pub use ident::{IdentPart, TableName};
pub use lexer::is_bare_column_name;
pub use schema_introspect::{ColumnInfo, RelationKind, TableInfo, describe_table};
pub use validator::{
    FORBIDDEN_KEYWORDS, QueryValidator, SUSPICIOUS_SEQUENCES, Strictness, check_predicate_balance,
    is_predicate_char, sanitize_where_clause, validate_query_for_sql_injection,
    validate_select_query,
};
