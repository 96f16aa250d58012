//! Token stream for clause lookups, backed by the PostgreSQL scanner.
//!
//! `pg_query::scan` runs the server's own lexer, so nested block comments,
//! dollar-quoted bodies and `E'..'` escapes are split exactly as the
//! database would split them. Every token carries its byte span in the
//! source text so callers can slice the original query (e.g. the WHERE
//! predicate).
//!
//! Input the server could not lex (an unterminated literal, identifier or
//! comment) is rejected with [`Violation::MalformedText`].

use pg_query::protobuf::{KeywordKind, ScanToken, Token as PgToken};

use crate::error::{CheckResult, Violation};

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Keyword or bare identifier.
    Word,
    /// Double-quoted identifier, quotes included.
    QuotedIdent,
    /// String literal of any form (`'..'`, `E'..'`, `$$..$$`, bit strings).
    String,
    /// Numeric literal.
    Number,
    /// `-- ...` or `/* ... */`, nested comments included.
    Comment,
    /// Operators, parameters and punctuation.
    Punct,
}

/// A token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    /// Case-insensitive keyword match (words only).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    /// Exact single-character punctuation match.
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.len() == c.len_utf8() && self.text.starts_with(c)
    }
}

fn classify(tok: &ScanToken, text: &str) -> TokenKind {
    match tok.token() {
        PgToken::SqlComment | PgToken::CComment => TokenKind::Comment,
        PgToken::Sconst | PgToken::Usconst | PgToken::Bconst | PgToken::Xconst => {
            TokenKind::String
        }
        PgToken::Iconst | PgToken::Fconst => TokenKind::Number,
        PgToken::Ident | PgToken::Uident => {
            if text.starts_with('"') || text.starts_with("U&") || text.starts_with("u&") {
                TokenKind::QuotedIdent
            } else {
                TokenKind::Word
            }
        }
        _ if tok.keyword_kind() != KeywordKind::NoKeyword => TokenKind::Word,
        _ => TokenKind::Punct,
    }
}

/// Map a scanner failure to the construct left open.
fn scan_failure(err: &pg_query::Error) -> Violation {
    let message = err.to_string();
    let what = if message.contains("comment") {
        "unterminated comment"
    } else if message.contains("quoted identifier") {
        "unterminated quoted identifier"
    } else if message.contains("string") {
        "unterminated string literal"
    } else {
        "unrecognized input"
    };
    Violation::MalformedText(what)
}

/// Tokenize `sql` with the PostgreSQL scanner.
pub fn tokenize(sql: &str) -> CheckResult<Vec<Token<'_>>> {
    let scanned = pg_query::scan(sql).map_err(|e| scan_failure(&e))?;

    scanned
        .tokens
        .iter()
        .map(|tok| {
            let (Ok(start), Ok(end)) = (usize::try_from(tok.start), usize::try_from(tok.end))
            else {
                return Err(Violation::MalformedText("unrecognized input").into());
            };
            let text = sql
                .get(start..end)
                .ok_or(Violation::MalformedText("unrecognized input"))?;
            Ok(Token {
                kind: classify(tok, text),
                text,
                start,
                end,
            })
        })
        .collect()
}

/// Whether `ident` can be written unquoted as a PostgreSQL column name.
///
/// Only lower-case words qualify, and only when the server reads them back
/// as the same name: plain identifiers, or keywords the grammar accepts in
/// column position (unreserved and column-name keywords).
pub fn is_bare_column_name(ident: &str) -> bool {
    let mut chars = ident.chars();
    let shape_ok = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_lowercase())
        && chars.all(|c| c == '_' || c == '$' || c.is_ascii_lowercase() || c.is_ascii_digit());
    if !shape_ok {
        return false;
    }

    let Ok(scanned) = pg_query::scan(ident) else {
        return false;
    };
    match scanned.tokens.as_slice() {
        [tok] => {
            tok.token() == PgToken::Ident
                || matches!(
                    tok.keyword_kind(),
                    KeywordKind::UnreservedKeyword | KeywordKind::ColNameKeyword
                )
        }
        _ => false,
    }
}

/// Tokens annotated with their parenthesis depth (depth of the token itself;
/// an opening paren sits at the outer depth).
pub fn with_depth<'t, 'a>(
    tokens: &'t [Token<'a>],
) -> impl Iterator<Item = (usize, usize, &'t Token<'a>)> {
    let mut depth = 0usize;
    tokens.iter().enumerate().map(move |(idx, tok)| {
        let at = if tok.is_punct(')') {
            depth = depth.saturating_sub(1);
            depth
        } else {
            depth
        };
        if tok.is_punct('(') {
            depth += 1;
        }
        (idx, at, tok)
    })
}
