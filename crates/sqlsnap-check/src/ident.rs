//! Table identifiers extracted from SELECT statements.
//!
//! [`TableName`] supports dotted notation and quoted parts:
//!
//! - Unquoted parts match `[A-Za-z_][A-Za-z0-9_$]*` and are folded to lower case
//! - Quoted parts keep their case, allow anything but NUL, and escape `"` as `""`
//!
//! # Example
//! ```
//! use sqlsnap_check::TableName;
//!
//! let t = TableName::parse("Public.Users")?;
//! assert_eq!(t.to_sql(), "public.users");
//! assert_eq!(t.schema(), Some("public"));
//!
//! let q = TableName::parse(r#""Audit"."LogEntry""#)?;
//! assert_eq!(q.to_sql(), r#""Audit"."LogEntry""#);
//! # Ok::<(), sqlsnap_check::CheckError>(())
//! ```

use std::fmt;

use crate::error::{CheckError, CheckResult};

/// A part of a table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentPart {
    /// Unquoted part, already lower-cased.
    Unquoted(String),
    /// Quoted part, verbatim.
    Quoted(String),
}

impl IdentPart {
    /// The name as the catalog stores it.
    pub fn name(&self) -> &str {
        match self {
            IdentPart::Unquoted(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// A table identifier, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    parts: Vec<IdentPart>,
}

impl TableName {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Mixed: `public."UserTable"`
    pub fn parse(s: &str) -> CheckResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CheckError::identifier("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(CheckError::identifier(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(CheckError::identifier("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(CheckError::identifier(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(CheckError::identifier("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(CheckError::identifier("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let ok = if name.is_empty() {
                    c == '_' || c.is_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_alphanumeric()
                };
                if !ok {
                    return Err(CheckError::identifier(format!(
                        "Invalid character in identifier: '{c}'"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(CheckError::identifier("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name.to_lowercase()));
        }

        if parts.len() > 2 {
            return Err(CheckError::identifier(
                "Table identifiers take at most a schema and a name",
            ));
        }

        Ok(Self { parts })
    }

    /// The table name without schema.
    pub fn name(&self) -> &str {
        self.parts.last().map(IdentPart::name).unwrap_or_default()
    }

    /// The schema qualifier, if one was given.
    pub fn schema(&self) -> Option<&str> {
        (self.parts.len() == 2).then(|| self.parts[0].name())
    }

    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    for ch in s.chars() {
                        if ch == '"' {
                            out.push_str("\"\"");
                        } else {
                            out.push(ch);
                        }
                    }
                    out.push('"');
                }
            }
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
