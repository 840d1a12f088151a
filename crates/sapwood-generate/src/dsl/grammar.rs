//! Grammar productions for the DSL.
//!
//! ```text
//! root      := (rule | directive)*
//! rule      := Id "=" alt? ";"
//! directive := "@" Id "=" (item | "[" ... "]")* ";"
//! alt       := seq ("|" seq)*
//! seq       := item+
//! item      := atom quantifier*
//! atom      := field | call | Id | Str | Regex | "(" alt? ")"
//! ```

use rowan::TextRange;

use super::core::Parser;
use super::cst::SyntaxKind::{self, *};
use super::cst::token_sets::{ITEM_FIRST, QUANTIFIERS, ROOT_RECOVERY};
use crate::diagnostics::DiagnosticKind;

/// Function names that parse as calls when followed by `(` or `.`.
const CALL_NAMES: &[&str] = &["prec", "token"];

impl Parser<'_> {
    pub fn parse_root(&mut self) {
        self.start_node(Root);

        while !self.eof() {
            match self.current() {
                At => self.directive(),
                Id => self.rule(),
                _ => {
                    let text = self.current_text();
                    self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, format!("`{text}`"));
                }
            }
        }

        self.eat_trivia();
        self.finish_node();
    }

    fn rule(&mut self) {
        self.start_node(Rule);
        self.bump();

        let has_equals = self.expect(Equals, DiagnosticKind::ExpectedEquals);
        if (has_equals || self.currently_is_one_of(ITEM_FIRST)) && !self.currently_is(Semicolon) {
            self.alternation();
        }

        self.expect_semicolon();
        self.finish_node();
    }

    fn directive(&mut self) {
        self.start_node(Directive);
        self.bump();

        if !self.eat_token(Id) {
            self.error(DiagnosticKind::ExpectedDirectiveName);
        }

        if self.expect(Equals, DiagnosticKind::ExpectedEquals) {
            while !self.eof()
                && !self.currently_is_one_of(ROOT_RECOVERY)
                && !self.at_rule_start()
            {
                if self.currently_is(BracketOpen) {
                    self.conflict_set();
                } else if self.currently_is_one_of(ITEM_FIRST) {
                    self.item();
                } else {
                    let text = self.current_text();
                    self.error_and_bump_msg(
                        DiagnosticKind::InvalidDirectiveValue,
                        format!("`{text}`"),
                    );
                }
            }
        }

        self.expect_semicolon();
        self.finish_node();
    }

    /// Missing `;` resynchronizes at the next `;`, `@`, or `name =`.
    fn expect_semicolon(&mut self) {
        if self.eat_token(Semicolon) {
            return;
        }
        self.error_recover(DiagnosticKind::ExpectedSemicolon, ROOT_RECOVERY);
        self.eat_token(Semicolon);
    }

    fn conflict_set(&mut self) {
        self.start_node(ConflictSet);
        let open = self.current_span();
        self.bump();

        while !self.eof()
            && !self.currently_is(BracketClose)
            && !self.currently_is_one_of(ROOT_RECOVERY)
        {
            match self.current() {
                Id => {
                    self.start_node(SymbolRef);
                    self.bump();
                    self.finish_node();
                }
                Str => self.leaf(StrLit),
                Unterminated => self.unterminated_literal(),
                Comma => self.bump(),
                _ => {
                    let text = self.current_text();
                    self.error_and_bump_msg(
                        DiagnosticKind::InvalidDirectiveValue,
                        format!("`{text}`"),
                    );
                }
            }
        }

        if !self.eat_token(BracketClose) {
            self.error_unclosed_delimiter(
                DiagnosticKind::UnclosedConflictSet,
                "set started here",
                open,
            );
        }
        self.finish_node();
    }

    fn alternation(&mut self) {
        let checkpoint = self.checkpoint();
        self.sequence();

        if self.currently_is(Pipe) {
            self.start_node_at(checkpoint, Alt);
            while self.eat_token(Pipe) {
                self.sequence();
            }
            self.finish_node();
        }
    }

    fn sequence(&mut self) {
        let checkpoint = self.checkpoint();
        let mut count = 0usize;

        while self.currently_is_one_of(ITEM_FIRST) && !self.at_rule_start() {
            self.item();
            count += 1;
        }

        match count {
            0 => self.error(DiagnosticKind::ExpectedExpression),
            1 => {}
            _ => {
                self.start_node_at(checkpoint, Seq);
                self.finish_node();
            }
        }
    }

    fn item(&mut self) {
        let checkpoint = self.checkpoint();
        self.atom();

        while self.currently_is_one_of(QUANTIFIERS) {
            self.start_node_at(checkpoint, Quantified);
            self.bump();
            self.finish_node();
        }
    }

    fn atom(&mut self) {
        match self.current() {
            Id if self.next_is(Colon) => self.field(),
            Id if self.at_call_start() => self.call(),
            Id => self.leaf(SymbolRef),
            Str => self.leaf(StrLit),
            Regex => self.leaf(RegexLit),
            Unterminated => self.unterminated_literal(),
            ParenOpen => self.group(),
            _ => self.error(DiagnosticKind::ExpectedExpression),
        }
    }

    fn at_call_start(&mut self) -> bool {
        let text = self.current_text();
        CALL_NAMES.contains(&text) && (self.next_is(ParenOpen) || self.next_is(Dot))
    }

    /// Points at the opening delimiter; the rest of the line is already an error token.
    fn unterminated_literal(&mut self) {
        let span = self.current_span();
        let text = self.current_text();
        let close = if text.starts_with('/') {
            '/'
        } else if text.starts_with('\'') {
            '\''
        } else {
            '"'
        };
        self.error_at(
            DiagnosticKind::UnterminatedLiteral,
            TextRange::at(span.start(), 1.into()),
            format!("missing closing `{close}`"),
        );
        self.bump_as_error();
    }

    fn leaf(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    fn field(&mut self) {
        self.start_node(Field);
        self.bump();
        self.bump();

        if self.currently_is_one_of(ITEM_FIRST) && !self.at_rule_start() {
            self.item();
        } else {
            self.error(DiagnosticKind::ExpectedExpression);
        }
        self.finish_node();
    }

    fn call(&mut self) {
        if !self.enter_recursion() {
            self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "nesting too deep");
            return;
        }

        self.start_node(Call);
        self.bump();

        if self.eat_token(Dot) && !self.eat_token(Id) {
            self.error_msg(DiagnosticKind::UnknownCall, "(missing name after `.`)");
        }

        if self.currently_is(ParenOpen) {
            let open = self.current_span();
            self.bump();
            self.call_arguments();
            if !self.eat_token(ParenClose) {
                self.error_unclosed_delimiter(
                    DiagnosticKind::UnclosedCall,
                    "call started here",
                    open,
                );
            }
        } else {
            self.error_msg(DiagnosticKind::UnexpectedToken, "expected `(`");
        }

        self.finish_node();
        self.exit_recursion();
    }

    fn call_arguments(&mut self) {
        loop {
            if self.currently_is(Integer) {
                self.leaf(IntLit);
            } else if self.currently_is_one_of(ITEM_FIRST) {
                self.alternation();
            } else {
                return;
            }

            if !self.eat_token(Comma) {
                return;
            }
        }
    }

    fn group(&mut self) {
        if !self.enter_recursion() {
            self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "nesting too deep");
            return;
        }

        self.start_node(Group);
        let open = self.current_span();
        self.bump();

        if !self.currently_is(ParenClose) && self.currently_is_one_of(ITEM_FIRST) {
            self.alternation();
        }

        if !self.eat_token(ParenClose) {
            self.error_unclosed_delimiter(
                DiagnosticKind::UnclosedGroup,
                "group started here",
                open,
            );
        }

        self.finish_node();
        self.exit_recursion();
    }
}
