//! Literal and identifier rendering for the target database.
//!
//! | value        | postgres                     | oracle                        |
//! |--------------|------------------------------|-------------------------------|
//! | boolean      | `true` / `false`             | `1` / `0`                     |
//! | bytes        | `'\xdead'::bytea`            | `HEXTORAW('DEAD')`            |
//! | uuid         | `'…'::uuid`                  | `'…'`                         |
//! | time         | `TIME '…'`                   | `'…'`                         |
//! | timestamptz  | `TIMESTAMPTZ '… +00:00'`     | `TIMESTAMP '… +00:00'`        |
//! | json         | `'…'::jsonb`                 | `'…'`                         |
//! | array        | `ARRAY[…]`                   | unsupported                   |
//! | float NaN/inf| `'NaN'::float8`, …           | `BINARY_DOUBLE_NAN`, …        |
//! | non-finite   | `'infinity'::date`, …        | unsupported                   |

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlsnap_check::{TableName, is_bare_column_name};

use crate::error::{SnapError, SnapResult};
use crate::value::SqlValue;

/// Oracle reserved words; none of these can be a bare column name.
const ORACLE_RESERVED_WORDS: &[&str] = &[
    "access", "add", "all", "alter", "and", "any", "as", "asc", "audit", "between", "by", "char",
    "check", "cluster", "column", "column_value", "comment", "compress", "connect", "create",
    "current", "date", "decimal", "default", "delete", "desc", "distinct", "drop", "else",
    "exclusive", "exists", "file", "float", "for", "from", "grant", "group", "having",
    "identified", "immediate", "in", "increment", "index", "initial", "insert", "integer",
    "intersect", "into", "is", "level", "like", "lock", "long", "maxextents", "minus",
    "mlslabel", "mode", "modify", "nested_table_id", "noaudit", "nocompress", "not", "nowait",
    "null", "number", "of", "offline", "on", "online", "option", "or", "order", "pctfree",
    "prior", "public", "raw", "rename", "resource", "revoke", "row", "rowid", "rownum", "rows",
    "select", "session", "set", "share", "size", "smallint", "start", "successful", "synonym",
    "sysdate", "table", "then", "to", "trigger", "uid", "union", "unique", "update", "user",
    "validate", "values", "varchar", "varchar2", "view", "whenever", "where", "with",
];

/// The SQL flavour generated statements are written in.
///
/// Defaults to [`Dialect::Postgres`], the database rows are read from, so a
/// snapshot replays into the same server without configuration. Scripts
/// meant for an Oracle target must select [`Dialect::Oracle`] explicitly
/// (`dialect = "oracle"` in `sqlsnap.toml`, or `--dialect oracle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Postgres,
    Oracle,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Oracle => "oracle",
        }
    }

    fn unsupported(self, kind: &'static str) -> SnapError {
        SnapError::UnsupportedLiteral {
            dialect: self.name(),
            kind,
        }
    }

    /// Render a column name, quoting it unless it is a plain lower-case word
    /// the dialect does not reserve.
    ///
    /// ```
    /// use sqlsnap::Dialect;
    ///
    /// assert_eq!(Dialect::Postgres.quote_ident("created_at"), "created_at");
    /// assert_eq!(Dialect::Postgres.quote_ident("userId"), "\"userId\"");
    /// assert_eq!(Dialect::Postgres.quote_ident("window"), "\"window\"");
    /// assert_eq!(Dialect::Oracle.quote_ident("order"), "\"order\"");
    /// ```
    pub fn quote_ident(self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        self.write_ident(&mut out, ident);
        out
    }

    fn is_bare_ident(self, ident: &str) -> bool {
        match self {
            Dialect::Postgres => is_bare_column_name(ident),
            Dialect::Oracle => {
                let mut chars = ident.chars();
                chars
                    .next()
                    .is_some_and(|c| c == '_' || c.is_ascii_lowercase())
                    && chars.all(|c| {
                        c == '_' || c == '$' || c.is_ascii_lowercase() || c.is_ascii_digit()
                    })
                    && !ORACLE_RESERVED_WORDS.contains(&ident)
            }
        }
    }

    fn write_ident(self, out: &mut String, ident: &str) {
        if self.is_bare_ident(ident) {
            out.push_str(ident);
            return;
        }
        out.push('"');
        for ch in ident.chars() {
            if ch == '"' {
                out.push_str("\"\"");
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }

    /// Render one value as an inline literal.
    pub fn render_literal(self, value: &SqlValue) -> SnapResult<String> {
        let mut out = String::new();
        self.write_literal(&mut out, value)?;
        Ok(out)
    }

    /// Render `INSERT INTO table (cols) VALUES (literals)` for already-ordered columns.
    pub fn render_insert(
        self,
        table: &TableName,
        values: &[(&str, &SqlValue)],
    ) -> SnapResult<String> {
        let mut sql = String::from("INSERT INTO ");
        sql.push_str(&table.to_sql());

        if values.is_empty() {
            return match self {
                Dialect::Postgres => {
                    sql.push_str(" DEFAULT VALUES");
                    Ok(sql)
                }
                Dialect::Oracle => Err(self.unsupported("empty row")),
            };
        }

        sql.push_str(" (");
        for (i, (column, _)) in values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.write_ident(&mut sql, column);
        }
        sql.push_str(") VALUES (");
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.write_literal(&mut sql, value)?;
        }
        sql.push(')');
        Ok(sql)
    }

    fn write_literal(self, out: &mut String, value: &SqlValue) -> SnapResult<()> {
        match value {
            SqlValue::Null => out.push_str("NULL"),
            SqlValue::Bool(b) => out.push_str(match (self, *b) {
                (Dialect::Postgres, true) => "true",
                (Dialect::Postgres, false) => "false",
                (Dialect::Oracle, true) => "1",
                (Dialect::Oracle, false) => "0",
            }),
            SqlValue::Int(v) => push_fmt(out, format_args!("{v}")),
            SqlValue::Float(v) => self.write_float(out, *v),
            SqlValue::Numeric(v) => push_fmt(out, format_args!("{v}")),
            SqlValue::BigNumeric(text) => out.push_str(text),
            SqlValue::NonFinite { type_name, text } => match self {
                Dialect::Postgres => push_fmt(out, format_args!("'{text}'::{type_name}")),
                Dialect::Oracle => return Err(self.unsupported("non-finite value")),
            },
            SqlValue::Text(s) => write_quoted(out, s),
            SqlValue::Bytes(bytes) => match self {
                Dialect::Postgres => {
                    out.push_str("'\\x");
                    for b in bytes {
                        push_fmt(out, format_args!("{b:02x}"));
                    }
                    out.push_str("'::bytea");
                }
                Dialect::Oracle => {
                    out.push_str("HEXTORAW('");
                    for b in bytes {
                        push_fmt(out, format_args!("{b:02X}"));
                    }
                    out.push_str("')");
                }
            },
            SqlValue::Uuid(u) => {
                push_fmt(out, format_args!("'{u}'"));
                if self == Dialect::Postgres {
                    out.push_str("::uuid");
                }
            }
            SqlValue::Date(d) => push_fmt(out, format_args!("DATE '{}'", d.format("%Y-%m-%d"))),
            SqlValue::Time(t) => {
                if self == Dialect::Postgres {
                    out.push_str("TIME ");
                }
                push_fmt(out, format_args!("'{}'", t.format("%H:%M:%S%.f")));
            }
            SqlValue::Timestamp(ts) => push_fmt(
                out,
                format_args!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            ),
            SqlValue::TimestampTz(ts) => {
                let keyword = match self {
                    Dialect::Postgres => "TIMESTAMPTZ",
                    Dialect::Oracle => "TIMESTAMP",
                };
                push_fmt(
                    out,
                    format_args!("{keyword} '{}'", ts.format("%Y-%m-%d %H:%M:%S%.f %:z")),
                );
            }
            SqlValue::Json(json) => {
                write_quoted(out, &json.to_string());
                if self == Dialect::Postgres {
                    out.push_str("::jsonb");
                }
            }
            SqlValue::Array(items) => match self {
                Dialect::Postgres if items.is_empty() => out.push_str("'{}'"),
                Dialect::Postgres => {
                    out.push_str("ARRAY[");
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.write_literal(out, item)?;
                    }
                    out.push(']');
                }
                Dialect::Oracle => return Err(self.unsupported("array")),
            },
        }
        Ok(())
    }

    fn write_float(self, out: &mut String, v: f64) {
        if v.is_finite() {
            push_fmt(out, format_args!("{v}"));
            return;
        }
        let text = match (self, v.is_nan(), v > 0.0) {
            (Dialect::Postgres, true, _) => "'NaN'::float8",
            (Dialect::Postgres, false, true) => "'Infinity'::float8",
            (Dialect::Postgres, false, false) => "'-Infinity'::float8",
            (Dialect::Oracle, true, _) => "BINARY_DOUBLE_NAN",
            (Dialect::Oracle, false, true) => "BINARY_DOUBLE_INFINITY",
            (Dialect::Oracle, false, false) => "-BINARY_DOUBLE_INFINITY",
        };
        out.push_str(text);
    }
}

fn push_fmt(out: &mut String, args: fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = out.write_fmt(args);
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = SnapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "oracle" => Ok(Dialect::Oracle),
            other => Err(SnapError::Config(format!(
                "unknown dialect '{other}' (expected postgres or oracle)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
