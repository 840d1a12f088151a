//! Tokens of the grammar DSL.
//!
//! Logos recognizes the well-formed tokens. Whatever it rejects is sorted
//! here: a quote or a lone `/` that never closes on its line becomes one
//! `Unterminated` token running to the end of that line, so a broken literal
//! cannot swallow the rules after it. Any other run of rejected characters
//! becomes a single `Garbage` token.

use std::ops::Range;

use logos::Logos;
use rowan::TextRange;

use super::cst::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    fn new(kind: SyntaxKind, span: Range<usize>) -> Self {
        let span = TextRange::new((span.start as u32).into(), (span.end as u32).into());
        Self { kind, span }
    }
}

pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = SyntaxKind::lexer(source);
    let mut garbage: Option<usize> = None;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                let Some(end) = unterminated_literal(source, span.start) else {
                    garbage.get_or_insert(span.start);
                    continue;
                };
                // Resume after the line; the error span never crosses it.
                lexer.bump(end.saturating_sub(span.end));
                SyntaxKind::Unterminated
            }
        };
        if let Some(start) = garbage.take() {
            tokens.push(Token::new(SyntaxKind::Garbage, start..span.start));
        }
        let end = if kind == SyntaxKind::Unterminated {
            lexer.span().end
        } else {
            span.end
        };
        tokens.push(Token::new(kind, span.start..end));
    }

    if let Some(start) = garbage {
        tokens.push(Token::new(SyntaxKind::Garbage, start..source.len()));
    }
    tokens
}

/// End of the line when a rejected token at `start` opens a string or regex
/// literal. `//` never gets here: it always lexes as a comment.
fn unterminated_literal(source: &str, start: usize) -> Option<usize> {
    let rest = &source[start..];
    if !rest.starts_with(['"', '\'', '/']) {
        return None;
    }
    Some(start + rest.find('\n').unwrap_or(rest.len()))
}

#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[Range::<usize>::from(token.span)]
}
