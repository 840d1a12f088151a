//! Tokens of the query language.
//!
//! Whitespace and `;` comments are dropped here; the parser only sees
//! significant tokens.

use std::ops::Range;

use logos::Logos;

use crate::error::{QueryError, QueryErrorKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    /// Anchor between, before or after child patterns.
    #[token(".")]
    Dot,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,

    /// `@name`; dots and hyphens are allowed after the first character.
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Capture,

    /// `#eq?`, `#not-match?`, ...
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    Predicate,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Id,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    Comment,
}

impl TokenKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// How the token is named in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::ParenOpen => "`(`",
            TokenKind::ParenClose => "`)`",
            TokenKind::BracketOpen => "`[`",
            TokenKind::BracketClose => "`]`",
            TokenKind::Colon => "`:`",
            TokenKind::Negation => "`!`",
            TokenKind::Dot => "`.`",
            TokenKind::Question => "`?`",
            TokenKind::Star => "`*`",
            TokenKind::Plus => "`+`",
            TokenKind::Str => "string",
            TokenKind::Capture => "capture",
            TokenKind::Predicate => "predicate",
            TokenKind::Id => "identifier",
            TokenKind::Whitespace | TokenKind::Comment => "trivia",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Significant tokens of `source`. The first unrecognized character is an
/// error.
pub fn lex(source: &str) -> Result<Vec<Token>, QueryError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) if kind.is_trivia() => {}
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                let rest = &source[span.start..];
                if rest.starts_with('"') {
                    return Err(QueryError::new(
                        QueryErrorKind::Syntax,
                        span,
                        "unterminated string",
                    ));
                }
                let ch = rest.chars().next().unwrap_or_default();
                return Err(QueryError::new(
                    QueryErrorKind::Syntax,
                    span.start..span.start + ch.len_utf8(),
                    format!("unexpected character `{ch}`"),
                ));
            }
        }
    }

    Ok(tokens)
}
