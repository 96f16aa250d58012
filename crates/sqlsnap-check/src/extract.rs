//! Locating the FROM target and WHERE predicate of a SELECT statement.
//!
//! Both are found on the token stream at parenthesis depth 0, so keywords
//! inside string literals, quoted identifiers or subqueries are ignored.
//! Comments inside the predicate are replaced by a single space.

use std::borrow::Cow;

use crate::error::{CheckResult, Violation};
use crate::ident::TableName;
use crate::lexer::{Token, TokenKind, tokenize, with_depth};
use crate::validator::QueryValidator;

/// Keywords that end a WHERE predicate.
const PREDICATE_TERMINATORS: [&str; 8] = [
    "group", "order", "limit", "offset", "having", "fetch", "for", "window",
];

/// Keywords that can never be a FROM target.
const CLAUSE_KEYWORDS: [&str; 12] = [
    "select", "where", "group", "order", "limit", "offset", "having", "fetch", "for", "window",
    "join", "lateral",
];

/// The parts of a SELECT statement the synthesizers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectParts<'a> {
    /// The primary FROM target.
    pub table: TableName,
    /// Raw (unsanitized) predicate, trimmed. Empty when there is no WHERE.
    pub predicate: Cow<'a, str>,
}

impl SelectParts<'_> {
    pub fn has_predicate(&self) -> bool {
        !self.predicate.is_empty()
    }
}

/// Split a SELECT into table and predicate without validating it first.
pub fn analyze_select(query: &str) -> CheckResult<SelectParts<'_>> {
    let tokens = tokenize(query)?;

    let from_idx = with_depth(&tokens)
        .find(|(_, depth, tok)| *depth == 0 && tok.is_keyword("from"))
        .map(|(idx, _, _)| idx)
        .ok_or(Violation::MissingTableName)?;

    let table = read_table(query, &tokens[from_idx + 1..])?;
    let predicate = predicate_span(query, &tokens, from_idx);

    Ok(SelectParts { table, predicate })
}

fn read_table(query: &str, tokens: &[Token<'_>]) -> CheckResult<TableName> {
    let is_part = |tok: &Token<'_>| match tok.kind {
        TokenKind::QuotedIdent => true,
        TokenKind::Word => !CLAUSE_KEYWORDS
            .iter()
            .any(|kw| tok.text.eq_ignore_ascii_case(kw)),
        _ => false,
    };

    let Some(first) = tokens.first().filter(|t| is_part(t)) else {
        return Err(Violation::MissingTableName.into());
    };

    let start = first.start;
    let mut end = first.end;
    let mut rest = &tokens[1..];

    // `schema.table`, written without spaces around the dot.
    while let [dot, part, tail @ ..] = rest {
        if dot.is_punct('.') && dot.start == end && part.start == dot.end && is_part(part) {
            end = part.end;
            rest = tail;
        } else {
            break;
        }
    }

    TableName::parse(&query[start..end]).map_err(|_| Violation::MissingTableName.into())
}

fn predicate_span<'a>(query: &'a str, tokens: &[Token<'a>], from_idx: usize) -> Cow<'a, str> {
    let mut begin: Option<usize> = None;
    let mut end = query.len();

    for (idx, depth, tok) in with_depth(tokens) {
        if idx <= from_idx || depth != 0 {
            continue;
        }
        match begin {
            None if tok.is_keyword("where") => begin = Some(tok.end),
            None => {}
            Some(_) => {
                let terminates = tok.is_punct(';')
                    || PREDICATE_TERMINATORS.iter().any(|kw| tok.is_keyword(kw));
                if terminates {
                    end = tok.start;
                    break;
                }
            }
        }
    }

    match begin {
        Some(begin) => strip_comments(query, tokens, begin, end),
        None => Cow::Borrowed(""),
    }
}

fn strip_comments<'a>(
    query: &'a str,
    tokens: &[Token<'a>],
    begin: usize,
    end: usize,
) -> Cow<'a, str> {
    let mut comments = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Comment && t.start >= begin && t.start < end)
        .peekable();

    if comments.peek().is_none() {
        return Cow::Borrowed(query[begin..end].trim());
    }

    let mut out = String::with_capacity(end - begin);
    let mut pos = begin;
    for comment in comments {
        out.push_str(&query[pos..comment.start]);
        out.push(' ');
        pos = comment.end.min(end);
    }
    out.push_str(&query[pos..end]);
    Cow::Owned(out.trim().to_string())
}

/// Extract the table name of a SELECT query, validating it first.
///
/// # Example
/// ```
/// use sqlsnap_check::extract_table_name;
///
/// let table = extract_table_name("SELECT * FROM Users WHERE id = 1")?;
/// assert_eq!(table.to_string(), "users");
/// # Ok::<(), sqlsnap_check::CheckError>(())
/// ```
pub fn extract_table_name(query: &str) -> CheckResult<TableName> {
    QueryValidator::default().extract_table_name(query)
}

/// The raw predicate after the first top-level `WHERE`, or `""`.
pub fn extract_where_clause(query: &str) -> CheckResult<Cow<'_, str>> {
    let tokens = tokenize(query)?;
    let predicate =
        match with_depth(&tokens).find(|(_, depth, tok)| *depth == 0 && tok.is_keyword("from")) {
            Some((from_idx, _, _)) => predicate_span(query, &tokens, from_idx),
            None => Cow::Borrowed(""),
        };
    Ok(predicate)
}

impl QueryValidator {
    /// Validate, then split into table and predicate.
    pub fn analyze<'a>(&self, query: &'a str) -> CheckResult<SelectParts<'a>> {
        self.validate(query)?;
        analyze_select(query)
    }

    /// Validate, then extract the FROM target.
    pub fn extract_table_name(&self, query: &str) -> CheckResult<TableName> {
        self.analyze(query).map(|parts| parts.table)
    }
}
