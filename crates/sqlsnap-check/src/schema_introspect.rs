//! Column metadata for a single relation, read from `pg_catalog`.

use serde::{Deserialize, Serialize};

use crate::client::{CheckClient, RowExt};
use crate::error::CheckResult;
use crate::ident::TableName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Table,
    PartitionedTable,
    View,
    MaterializedView,
    ForeignTable,
    Other,
}

impl RelationKind {
    /// `relkind` is a Postgres `"char"`, which tokio-postgres exposes as i8.
    pub fn from_relkind(relkind: i8) -> Self {
        match relkind as u8 as char {
            'r' => Self::Table,
            'p' => Self::PartitionedTable,
            'v' => Self::View,
            'm' => Self::MaterializedView,
            'f' => Self::ForeignTable,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_expr: Option<String>,
    /// 1-based position in the table definition.
    pub ordinal: i32,
}

/// A relation and its live columns in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub kind: RelationKind,
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Column names in definition order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const DESCRIBE_TABLE_SQL: &str = r#"
SELECT
  n.nspname AS schema_name,
  c.relname AS table_name,
  c.relkind AS relkind,
  a.attname AS column_name,
  a.attnum::int4 AS ordinal,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
  a.attnotnull AS not_null,
  pg_get_expr(ad.adbin, ad.adrelid) AS default_expr
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
WHERE c.relkind IN ('r', 'p', 'v', 'm', 'f')
  AND a.attnum > 0
  AND NOT a.attisdropped
  AND c.relname = $1
  AND (
    ($2::text IS NULL AND pg_catalog.pg_table_is_visible(c.oid))
    OR n.nspname = $2::text
  )
ORDER BY a.attnum
"#;

/// Describe one table. An unqualified name resolves through `search_path`.
///
/// Returns `Ok(None)` when no visible relation matches.
pub async fn describe_table<C: CheckClient + ?Sized>(
    client: &C,
    table: &TableName,
) -> CheckResult<Option<TableInfo>> {
    let name = table.name();
    let schema = table.schema();
    let rows = client.query(DESCRIBE_TABLE_SQL, &[&name, &schema]).await?;

    let mut info: Option<TableInfo> = None;
    for row in rows {
        let column = ColumnInfo {
            name: row.try_get_column("column_name")?,
            data_type: row.try_get_column("data_type")?,
            not_null: row.try_get_column("not_null")?,
            default_expr: row.try_get_column("default_expr")?,
            ordinal: row.try_get_column("ordinal")?,
        };

        if info.is_none() {
            let relkind: i8 = row.try_get_column("relkind")?;
            info = Some(TableInfo {
                schema: row.try_get_column("schema_name")?,
                name: row.try_get_column("table_name")?,
                kind: RelationKind::from_relkind(relkind),
                columns: Vec::new(),
            });
        }
        if let Some(table) = info.as_mut() {
            table.columns.push(column);
        }
    }

    Ok(info)
}
