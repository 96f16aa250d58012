//! Rule checks and sanitizing for untrusted SELECT text.
//!
//! Two validation paths exist:
//!
//! - [`validate_select_query`]: structural rules (SELECT prefix, FROM present)
//!   plus the forbidden-keyword scan.
//! - [`validate_query_for_sql_injection`]: the keyword scan plus rejection of
//!   `;` and `--` anywhere in the text.
//!
//! [`QueryValidator`] unifies them behind a [`Strictness`] level so callers
//! pick one policy instead of remembering to compose both.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CheckResult, Violation};

/// Keywords rejected as whole words, checked in this order.
pub const FORBIDDEN_KEYWORDS: [&str; 5] = ["union", "drop", "truncate", "delete", "alter"];

/// Sequences rejected by the injection check, checked in this order.
pub const SUSPICIOUS_SEQUENCES: [&str; 2] = ["--", ";"];

fn forbidden_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FORBIDDEN_KEYWORDS
            .iter()
            .map(|kw| {
                let re = Regex::new(&format!(r"(?i)\b{kw}\b"))
                    .expect("invalid built-in keyword regex");
                (*kw, re)
            })
            .collect()
    })
}

/// How much the validator rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// SELECT/FROM structure and forbidden keywords.
    #[default]
    Structural,
    /// Structural rules, then `;` and `--` rejection.
    Hardened,
}

/// Validates SELECT text at a fixed [`Strictness`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryValidator {
    strictness: Strictness,
}

impl QueryValidator {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    pub fn structural() -> Self {
        Self::new(Strictness::Structural)
    }

    pub fn hardened() -> Self {
        Self::new(Strictness::Hardened)
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Run every rule of this validator's level, stopping at the first violation.
    pub fn validate(&self, query: &str) -> CheckResult<()> {
        validate_select_query(query)?;
        if self.strictness == Strictness::Hardened {
            check_suspicious_sequences(query)?;
        }
        Ok(())
    }
}

/// Validate the structure of a SELECT query.
///
/// Rules, in order:
/// 1. starts with `select` (case-insensitive)
/// 2. contains `from` (case-insensitive)
/// 3. none of [`FORBIDDEN_KEYWORDS`] as a whole word
///
/// # Example
/// ```
/// use sqlsnap_check::{validate_select_query, Violation};
///
/// assert!(validate_select_query("SELECT * FROM users").is_ok());
/// let err = validate_select_query("SELECT * FROM users UNION SELECT * FROM admins").unwrap_err();
/// assert_eq!(err.violation(), Some(Violation::UnsafePattern("union")));
/// ```
pub fn validate_select_query(query: &str) -> CheckResult<()> {
    let starts_with_select = query
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("select"));
    if !starts_with_select {
        return Err(Violation::MissingSelect.into());
    }

    if !query.to_lowercase().contains("from") {
        return Err(Violation::MissingFrom.into());
    }

    check_forbidden_keywords(query)
}

/// Keyword scan plus `;`/`--` rejection, independent of SELECT structure.
pub fn validate_query_for_sql_injection(query: &str) -> CheckResult<()> {
    check_forbidden_keywords(query)?;
    check_suspicious_sequences(query)
}

fn check_forbidden_keywords(query: &str) -> CheckResult<()> {
    for (kw, re) in forbidden_patterns() {
        if re.is_match(query) {
            return Err(Violation::UnsafePattern(*kw).into());
        }
    }
    Ok(())
}

fn check_suspicious_sequences(query: &str) -> CheckResult<()> {
    for seq in SUSPICIOUS_SEQUENCES {
        if query.contains(seq) {
            return Err(Violation::SuspiciousSequence(seq).into());
        }
    }
    Ok(())
}

/// Characters allowed to survive [`sanitize_where_clause`].
pub fn is_predicate_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c, '=' | '>' | '<' | '(' | ')' | '\'' | '"')
}

/// Drop every character outside the predicate whitelist.
///
/// Total and idempotent; never emits `;` or `-`.
///
/// # Example
/// ```
/// use sqlsnap_check::sanitize_where_clause;
///
/// assert_eq!(sanitize_where_clause("id = 1; DROP TABLE x --"), "id = 1 DROP TABLE x ");
/// ```
pub fn sanitize_where_clause(clause: &str) -> String {
    clause.chars().filter(|c| is_predicate_char(*c)).collect()
}

/// Require balanced parentheses and closed quotes in a predicate.
pub fn check_predicate_balance(predicate: &str) -> CheckResult<()> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in predicate.chars() {
        match quote {
            // A doubled quote closes and reopens, which nets out.
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    if depth == 0 {
                        return Err(Violation::UnbalancedPredicate("unexpected ')'").into());
                    }
                    depth -= 1;
                }
                _ => {}
            },
        }
    }

    if quote.is_some() {
        return Err(Violation::UnbalancedPredicate("unclosed quote").into());
    }
    if depth > 0 {
        return Err(Violation::UnbalancedPredicate("unclosed '('").into());
    }
    Ok(())
}
