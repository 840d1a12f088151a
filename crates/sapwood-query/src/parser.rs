//! Recursive-descent parser for query source.
//!
//! ```text
//! query   := step*
//! step    := (Id ":")? expr ("?" | "*" | "+")? Capture*
//! expr    := "(" node ")" | "(" item+ ")" | "[" step+ "]" | Str | "_"
//! node    := (Id | "_" | "ERROR" | "MISSING" (Id | Str)?) item*
//! item    := step | "." | "!" Id | "(" Predicate (Capture | Str)* ")"
//! ```
//!
//! Parsing stops at the first error.

use std::ops::Range;

use crate::ast::{
    Expr, Item, Name, NodeExpr, NodeKind, Pattern, PredicateArg, PredicateCall, Quantifier, Step,
};
use crate::error::{QueryError, QueryErrorKind};
use crate::lexer::{Token, TokenKind, lex};

type Result<T> = std::result::Result<T, QueryError>;

/// Nesting bound for patterns.
const MAX_DEPTH: u32 = 256;

pub fn parse(source: &str) -> Result<Vec<Pattern>> {
    let mut parser = Parser {
        source,
        tokens: lex(source)?,
        pos: 0,
        depth: 0,
        predicates: Vec::new(),
    };

    let mut patterns = Vec::new();
    while parser.current().is_some() {
        patterns.push(parser.pattern()?);
    }
    Ok(patterns)
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    depth: u32,
    /// Predicates of the pattern being parsed, wherever they appear in it.
    predicates: Vec<PredicateCall>,
}

impl Parser<'_> {
    fn pattern(&mut self) -> Result<Pattern> {
        let start = self.current_span().start;
        match self.current() {
            Some(TokenKind::Dot) => {
                return Err(self.error_here(
                    QueryErrorKind::Structure,
                    "anchors only apply inside a node or group",
                ));
            }
            Some(TokenKind::Negation) => {
                return Err(self.error_here(
                    QueryErrorKind::Structure,
                    "negated fields only apply inside a node",
                ));
            }
            _ => {}
        }

        let root = self.step()?;
        Ok(Pattern {
            root,
            predicates: std::mem::take(&mut self.predicates),
            range: start..self.prev_end(),
        })
    }

    fn step(&mut self) -> Result<Step> {
        let start = self.current_span().start;

        let field = if self.at(TokenKind::Id) && self.nth(1) == Some(TokenKind::Colon) {
            let token = self.bump();
            self.bump();
            Some(self.name(&token, 0))
        } else {
            None
        };

        let expr = self.expr()?;

        let quantifier = match self.current() {
            Some(TokenKind::Question) => Quantifier::ZeroOrOne,
            Some(TokenKind::Star) => Quantifier::ZeroOrMore,
            Some(TokenKind::Plus) => Quantifier::OneOrMore,
            _ => Quantifier::One,
        };
        if quantifier != Quantifier::One {
            self.bump();
        }

        let mut captures = Vec::new();
        while self.at(TokenKind::Capture) {
            let token = self.bump();
            captures.push(self.name(&token, 1));
        }

        Ok(Step {
            field,
            expr,
            quantifier,
            captures,
            range: start..self.prev_end(),
        })
    }

    fn expr(&mut self) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error_here(QueryErrorKind::Syntax, "pattern is nested too deeply"));
        }
        self.depth += 1;
        let expr = self.expr_inner();
        self.depth -= 1;
        expr
    }

    fn expr_inner(&mut self) -> Result<Expr> {
        match self.current() {
            Some(TokenKind::ParenOpen) => self.parenthesized(),
            Some(TokenKind::BracketOpen) => self.alternation(),
            Some(TokenKind::Str) => {
                let token = self.bump();
                Ok(Expr::Anonymous(self.string(&token)))
            }
            Some(TokenKind::Id) if self.current_text() == "_" => {
                self.bump();
                Ok(Expr::Wildcard)
            }
            Some(TokenKind::Id) => {
                let message = format!(
                    "node kinds are written in parentheses: `({})`",
                    self.current_text()
                );
                Err(self.error_here(QueryErrorKind::Syntax, message))
            }
            Some(TokenKind::Capture) => {
                Err(self.error_here(QueryErrorKind::Syntax, "capture without a pattern"))
            }
            Some(kind) => {
                let message = format!("expected a pattern, found {}", kind.describe());
                Err(self.error_here(QueryErrorKind::Syntax, message))
            }
            None => Err(self.error_here(
                QueryErrorKind::Syntax,
                "expected a pattern at end of query",
            )),
        }
    }

    /// `(kind ...)` or a sibling group `((a) (b))`.
    fn parenthesized(&mut self) -> Result<Expr> {
        let open = self.bump();

        let expr = match self.current() {
            Some(TokenKind::Id) => Expr::Node(self.node()?),
            Some(
                TokenKind::ParenOpen | TokenKind::BracketOpen | TokenKind::Str | TokenKind::Dot,
            ) => {
                let mut items = Vec::new();
                self.items(&mut items, None)?;
                if !items.iter().any(|item| matches!(item, Item::Step(_))) {
                    return Err(QueryError::new(
                        QueryErrorKind::Structure,
                        open.span.start..self.current_span().end,
                        "a group needs at least one pattern",
                    ));
                }
                Expr::Group(items)
            }
            Some(TokenKind::Predicate) => {
                let example = r#"((identifier) @name (#eq? @name "x"))"#;
                return Err(self.error_here(
                    QueryErrorKind::Structure,
                    format!("predicates go inside a pattern, e.g. `{example}`"),
                ));
            }
            Some(TokenKind::ParenClose) => {
                return Err(QueryError::new(
                    QueryErrorKind::Syntax,
                    open.span.start..self.current_span().end,
                    "empty pattern `()`",
                ));
            }
            Some(kind) => {
                let message = format!("expected a node kind, found {}", kind.describe());
                return Err(self.error_here(QueryErrorKind::Syntax, message));
            }
            None => return Err(self.unclosed(&open)),
        };

        self.close(TokenKind::ParenClose, &open)?;
        Ok(expr)
    }

    fn node(&mut self) -> Result<NodeExpr> {
        let token = self.bump();
        let text = self.text(&token).to_string();
        let kind = match text.as_str() {
            "_" => NodeKind::AnyNamed,
            "ERROR" => NodeKind::Error,
            "MISSING" => {
                let target = match self.current() {
                    Some(TokenKind::Id) => {
                        let target = self.bump();
                        Some((self.name(&target, 0), true))
                    }
                    Some(TokenKind::Str) => {
                        let target = self.bump();
                        Some((self.string(&target), false))
                    }
                    _ => None,
                };
                return Ok(NodeExpr {
                    kind: NodeKind::Missing(target),
                    children: Vec::new(),
                    negated: Vec::new(),
                });
            }
            _ => NodeKind::Named(self.name(&token, 0)),
        };

        let mut children = Vec::new();
        let mut negated = Vec::new();
        self.items(&mut children, Some(&mut negated))?;
        Ok(NodeExpr {
            kind,
            children,
            negated,
        })
    }

    /// Items up to the closing `)`, which is left for the caller. Negated
    /// fields are only accepted when `negated` is given.
    fn items(
        &mut self,
        children: &mut Vec<Item>,
        mut negated: Option<&mut Vec<Name>>,
    ) -> Result<()> {
        loop {
            match self.current() {
                None | Some(TokenKind::ParenClose) => return Ok(()),
                Some(TokenKind::Dot) => {
                    self.bump();
                    children.push(Item::Anchor);
                }
                Some(TokenKind::Negation) => {
                    let bang = self.bump();
                    let field = self.expect(TokenKind::Id, "a field name after `!`")?;
                    let name = self.name(&field, 0);
                    match negated.as_deref_mut() {
                        Some(list) => list.push(name),
                        None => {
                            return Err(QueryError::new(
                                QueryErrorKind::Structure,
                                bang.span.start..field.span.end,
                                "negated fields only apply inside a node",
                            ));
                        }
                    }
                }
                Some(TokenKind::ParenOpen) if self.nth(1) == Some(TokenKind::Predicate) => {
                    self.predicate()?
                }
                _ => children.push(Item::Step(self.step()?)),
            }
        }
    }

    fn alternation(&mut self) -> Result<Expr> {
        let open = self.bump();
        let mut branches = Vec::new();

        loop {
            match self.current() {
                None | Some(TokenKind::BracketClose) => break,
                Some(TokenKind::Dot) => {
                    return Err(self.error_here(
                        QueryErrorKind::Structure,
                        "anchors are not allowed directly inside an alternation",
                    ));
                }
                _ => branches.push(self.step()?),
            }
        }

        if branches.is_empty() && self.at(TokenKind::BracketClose) {
            return Err(QueryError::new(
                QueryErrorKind::Syntax,
                open.span.start..self.current_span().end,
                "empty alternation",
            ));
        }
        self.close(TokenKind::BracketClose, &open)?;
        Ok(Expr::Alt(branches))
    }

    fn predicate(&mut self) -> Result<()> {
        let open = self.bump();
        let token = self.bump();
        let name = self.name(&token, 1);

        let mut args = Vec::new();
        loop {
            match self.current() {
                Some(TokenKind::Capture) => {
                    let arg = self.bump();
                    args.push(PredicateArg::Capture(self.name(&arg, 1)));
                }
                Some(TokenKind::Str) => {
                    let arg = self.bump();
                    args.push(PredicateArg::Str(self.string(&arg)));
                }
                _ => break,
            }
        }

        self.close(TokenKind::ParenClose, &open)?;
        self.predicates.push(PredicateCall {
            name,
            args,
            range: open.span.start..self.prev_end(),
        });
        Ok(())
    }

    // ===== Tokens

    fn current(&self) -> Option<TokenKind> {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    fn current_span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len()..self.source.len(), |t| t.span.clone())
    }

    fn current_text(&self) -> &str {
        self.tokens.get(self.pos).map_or("", |t| self.text(t))
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.at(kind) {
            return Ok(self.bump());
        }
        let message = match self.current() {
            Some(found) => format!("expected {what}, found {}", found.describe()),
            None => format!("expected {what} at end of query"),
        };
        Err(self.error_here(QueryErrorKind::Syntax, message))
    }

    fn close(&mut self, kind: TokenKind, open: &Token) -> Result<()> {
        match self.current() {
            Some(found) if found == kind => {
                self.bump();
                Ok(())
            }
            Some(found) => {
                let message = format!("expected {}, found {}", kind.describe(), found.describe());
                Err(self.error_here(QueryErrorKind::Syntax, message))
            }
            None => Err(self.unclosed(open)),
        }
    }

    fn unclosed(&self, open: &Token) -> QueryError {
        QueryError::new(
            QueryErrorKind::Syntax,
            open.span.start..self.source.len(),
            format!("unclosed {}", open.kind.describe()),
        )
    }

    fn error_here(&self, kind: QueryErrorKind, message: impl Into<String>) -> QueryError {
        QueryError::new(kind, self.current_span(), message)
    }

    fn text(&self, token: &Token) -> &str {
        &self.source[token.span.clone()]
    }

    /// Token text without its first `sigil` bytes (`@`, `#`).
    fn name(&self, token: &Token, sigil: usize) -> Name {
        Name {
            text: self.text(token)[sigil..].to_string(),
            range: token.span.clone(),
        }
    }

    /// Unquoted string contents. Unknown escapes stand for the escaped
    /// character itself.
    fn string(&self, token: &Token) -> Name {
        let raw = self.text(token);
        let raw = &raw[1..raw.len() - 1];
        let mut text = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                text.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                Some('0') => text.push('\0'),
                Some(other) => text.push(other),
                None => {}
            }
        }
        Name {
            text,
            range: token.span.clone(),
        }
    }
}
