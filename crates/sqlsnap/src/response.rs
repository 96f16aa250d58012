//! Request and response shapes for a generation batch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SnapError;

/// Which statements to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Delete,
    Insert,
    Both,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Delete => "delete",
            Operation::Insert => "insert",
            Operation::Both => "both",
        }
    }

    pub fn includes_delete(self) -> bool {
        matches!(self, Operation::Delete | Operation::Both)
    }

    pub fn includes_insert(self) -> bool {
        matches!(self, Operation::Insert | Operation::Both)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = SnapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(Operation::Delete),
            "insert" => Ok(Operation::Insert),
            "both" => Ok(Operation::Both),
            other => Err(SnapError::Config(format!("unknown operation '{other}'"))),
        }
    }
}

/// A batch of SELECT statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub queries: Vec<String>,
}

/// Generated statements, index-aligned with the request's queries.
///
/// A field the operation did not ask for stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub delete_queries: Vec<String>,
    pub insert_queries: Vec<Vec<String>>,
}

impl GenerateResponse {
    /// All statements as a script: DELETEs first, then INSERTs in query order.
    pub fn to_sql_script(&self) -> String {
        let mut script = String::new();
        let inserts = self.insert_queries.iter().flatten();
        for stmt in self.delete_queries.iter().chain(inserts) {
            script.push_str(stmt);
            script.push_str(";\n");
        }
        script
    }

    pub fn is_empty(&self) -> bool {
        self.delete_queries.is_empty() && self.insert_queries.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let resp = GenerateResponse {
            delete_queries: vec!["DELETE FROM t WHERE id = 1".into()],
            insert_queries: vec![],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "delete_queries": ["DELETE FROM t WHERE id = 1"],
                "insert_queries": []
            })
        );
    }

    #[test]
    fn request_from_json() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"queries": ["SELECT * FROM t"]}"#).unwrap();
        assert_eq!(req.queries, ["SELECT * FROM t"]);
    }

    #[test]
    fn script_orders_deletes_before_inserts() {
        let resp = GenerateResponse {
            delete_queries: vec!["DELETE FROM t WHERE a = 1".into()],
            insert_queries: vec![
                vec!["INSERT INTO t (a) VALUES (1)".into()],
                vec![],
                vec!["INSERT INTO u (b) VALUES (2)".into()],
            ],
        };
        assert_eq!(
            resp.to_sql_script(),
            "DELETE FROM t WHERE a = 1;\nINSERT INTO t (a) VALUES (1);\nINSERT INTO u (b) VALUES (2);\n"
        );
        assert!(!resp.is_empty());
        assert!(GenerateResponse::default().is_empty());
    }

    #[test]
    fn operation_parsing() {
        assert_eq!("both".parse::<Operation>().unwrap(), Operation::Both);
        assert!("upsert".parse::<Operation>().is_err());
        assert!(Operation::Both.includes_delete() && Operation::Both.includes_insert());
        assert!(!Operation::Delete.includes_insert());
    }
}
