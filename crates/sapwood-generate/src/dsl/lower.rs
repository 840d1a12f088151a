//! Lowering from the DSL syntax tree to the `Grammar` model.
//!
//! Lowering keeps going after errors so one pass reports every problem; the
//! broken part is replaced by `Rule::Blank`.

use rowan::TextRange;
use sapwood_core::{Grammar, Precedence, PrecedenceEntry, Rule};

use super::ast::{self, Arg, Expr, QuantifierKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Grammar name used when the source has no `@name` directive.
pub const DEFAULT_NAME: &str = "grammar";

const DIRECTIVES: &[&str] = &[
    "name",
    "word",
    "extras",
    "externals",
    "inline",
    "supertypes",
    "conflicts",
    "precedences",
];

pub fn lower(root: &ast::Root, diagnostics: &mut Diagnostics) -> Grammar {
    let mut lowering = Lowering {
        diagnostics,
        grammar: Grammar::new(DEFAULT_NAME),
        seen_name: false,
        seen_word: false,
    };

    for directive in root.directives() {
        lowering.directive(&directive);
    }
    for rule in root.rules() {
        lowering.rule(&rule);
    }

    lowering.grammar
}

struct Lowering<'d> {
    diagnostics: &'d mut Diagnostics,
    grammar: Grammar,
    seen_name: bool,
    seen_word: bool,
}

impl Lowering<'_> {
    fn rule(&mut self, rule: &ast::RuleDef) {
        let Some(name) = rule.name() else {
            return;
        };
        let body = match rule.body() {
            Some(body) => self.expr(&body),
            None => Rule::Blank,
        };
        self.grammar.rules.push((name.text().to_string(), body));
    }

    fn directive(&mut self, directive: &ast::Directive) {
        let Some(name) = directive.name() else {
            return;
        };

        match name.text() {
            "name" => {
                if let Some(value) = self.single_name(directive) {
                    self.warn_duplicate(self.seen_name, "name", name.text_range());
                    self.seen_name = true;
                    self.grammar.name = value;
                }
            }
            "word" => {
                if let Some(value) = self.single_name(directive) {
                    self.warn_duplicate(self.seen_word, "word", name.text_range());
                    self.seen_word = true;
                    self.grammar.word = Some(value);
                }
            }
            "extras" => {
                let rules: Vec<_> = directive.values().map(|v| self.expr(&v)).collect();
                self.grammar.extras.extend(rules);
            }
            "externals" => {
                let rules: Vec<_> = directive.values().map(|v| self.expr(&v)).collect();
                self.grammar.externals.extend(rules);
            }
            "inline" => {
                let names = self.symbol_names(directive.values());
                self.grammar.inline.extend(names);
            }
            "supertypes" => {
                let names = self.symbol_names(directive.values());
                self.grammar.supertypes.extend(names);
            }
            "conflicts" => {
                for set in directive.sets() {
                    let names = self.symbol_names(set.members());
                    self.grammar.conflicts.push(names);
                }
                self.reject_loose_values(directive);
            }
            "precedences" => {
                for set in directive.sets() {
                    let entries = self.precedence_entries(&set);
                    self.grammar.precedences.push(entries);
                }
                self.reject_loose_values(directive);
            }
            other => {
                let mut report = self
                    .diagnostics
                    .report(DiagnosticKind::UnknownDirective, name.text_range())
                    .message(other);
                if let Some(known) = closest_directive(other) {
                    report = report.fix(format!("did you mean `@{known}`?"), known);
                }
                report.emit();
            }
        }
    }

    fn warn_duplicate(&mut self, seen: bool, name: &str, range: TextRange) {
        if seen {
            self.diagnostics
                .report(DiagnosticKind::DuplicateDirective, range)
                .message(name)
                .emit();
        }
    }

    /// `@name = x;` style directives take exactly one identifier.
    fn single_name(&mut self, directive: &ast::Directive) -> Option<String> {
        let values: Vec<_> = directive.values().collect();
        match values.as_slice() {
            [Expr::SymbolRef(sym)] => sym.name().map(|t| t.text().to_string()),
            [] => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidDirectiveValue, directive.text_range())
                    .message("expected a single name")
                    .emit();
                None
            }
            [_, ..] => {
                self.diagnostics
                    .report(DiagnosticKind::InvalidDirectiveValue, values[0].text_range())
                    .message("expected a single name")
                    .emit();
                None
            }
        }
    }

    fn symbol_names(&mut self, values: impl Iterator<Item = Expr>) -> Vec<String> {
        let mut names = Vec::new();
        for value in values {
            match &value {
                Expr::SymbolRef(sym) => {
                    if let Some(name) = sym.name() {
                        names.push(name.text().to_string());
                    }
                }
                _ => {
                    self.diagnostics
                        .report(DiagnosticKind::InvalidDirectiveValue, value.text_range())
                        .message("expected a rule name")
                        .emit();
                }
            }
        }
        names
    }

    fn precedence_entries(&mut self, set: &ast::ConflictSet) -> Vec<PrecedenceEntry> {
        let mut entries = Vec::new();
        for member in set.members() {
            match &member {
                Expr::StrLit(lit) => {
                    if let Some(text) = self.string_value(lit) {
                        entries.push(PrecedenceEntry::Name(text));
                    }
                }
                Expr::SymbolRef(sym) => {
                    if let Some(name) = sym.name() {
                        entries.push(PrecedenceEntry::Symbol(name.text().to_string()));
                    }
                }
                _ => {
                    self.diagnostics
                        .report(DiagnosticKind::InvalidDirectiveValue, member.text_range())
                        .message("expected a precedence name or rule name")
                        .emit();
                }
            }
        }
        entries
    }

    /// Set-valued directives take only `[...]` groups.
    fn reject_loose_values(&mut self, directive: &ast::Directive) {
        for value in directive.values() {
            self.diagnostics
                .report(DiagnosticKind::InvalidDirectiveValue, value.text_range())
                .message("expected `[ ... ]`")
                .emit();
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr) -> Rule {
        match expr {
            Expr::Alt(alt) => Rule::Choice(alt.branches().map(|b| self.expr(&b)).collect()),
            Expr::Seq(seq) => Rule::Seq(seq.items().map(|i| self.expr(&i)).collect()),
            Expr::Quantified(q) => {
                let inner = q.inner().map_or(Rule::Blank, |i| self.expr(&i));
                match q.kind() {
                    Some(QuantifierKind::Optional) => Rule::optional(inner),
                    Some(QuantifierKind::ZeroOrMore) => Rule::repeat(inner),
                    Some(QuantifierKind::OneOrMore) => Rule::repeat1(inner),
                    None => inner,
                }
            }
            Expr::Field(field) => {
                let content = field.value().map_or(Rule::Blank, |v| self.expr(&v));
                match field.name() {
                    Some(name) => Rule::field(name.text(), content),
                    None => content,
                }
            }
            Expr::Call(call) => self.call(call),
            Expr::Group(group) => group.inner().map_or(Rule::Blank, |i| self.expr(&i)),
            Expr::SymbolRef(sym) => sym
                .name()
                .map_or(Rule::Blank, |name| Rule::symbol(name.text())),
            Expr::StrLit(lit) => match self.string_value(lit) {
                Some(text) if text.is_empty() => {
                    self.diagnostics
                        .report(DiagnosticKind::EmptyString, lit.text_range())
                        .emit();
                    Rule::Blank
                }
                Some(text) => Rule::String(text),
                None => Rule::Blank,
            },
            Expr::RegexLit(lit) => lit.pattern().map_or(Rule::Blank, Rule::pattern),
        }
    }

    fn call(&mut self, call: &ast::Call) -> Rule {
        let callee = call.callee();
        let args: Vec<Arg> = call.args().collect();

        match callee.as_str() {
            "prec" => match args.as_slice() {
                [prec, Arg::Expr(content)] => {
                    let value = self.precedence(prec);
                    let content = Box::new(self.expr(content));
                    value.map_or(Rule::Blank, |value| Rule::Prec { value, content })
                }
                _ => self.wrong_arity(call, &callee, "2"),
            },
            "prec.left" | "prec.right" => {
                let (value, content) = match args.as_slice() {
                    [Arg::Expr(content)] => (Some(Precedence::Integer(0)), content),
                    [prec, Arg::Expr(content)] => (self.precedence(prec), content),
                    _ => return self.wrong_arity(call, &callee, "1 or 2"),
                };
                let content = Box::new(self.expr(content));
                let Some(value) = value else {
                    return Rule::Blank;
                };
                if callee == "prec.left" {
                    Rule::PrecLeft { value, content }
                } else {
                    Rule::PrecRight { value, content }
                }
            }
            "prec.dynamic" => match args.as_slice() {
                [Arg::Int(int), Arg::Expr(content)] => {
                    let content = Box::new(self.expr(content));
                    match int.value() {
                        Some(value) => Rule::PrecDynamic { value, content },
                        None => {
                            self.bad_integer(int.text_range());
                            Rule::Blank
                        }
                    }
                }
                [other, Arg::Expr(_)] => {
                    self.diagnostics
                        .report(DiagnosticKind::ExpectedPrecedence, arg_range(other))
                        .message("dynamic precedence must be an integer")
                        .emit();
                    Rule::Blank
                }
                _ => self.wrong_arity(call, &callee, "2"),
            },
            "token" | "token.immediate" => match args.as_slice() {
                [Arg::Expr(content)] => {
                    let content = Box::new(self.expr(content));
                    if callee == "token" {
                        Rule::Token(content)
                    } else {
                        Rule::ImmediateToken(content)
                    }
                }
                _ => self.wrong_arity(call, &callee, "1"),
            },
            _ => {
                self.diagnostics
                    .report(DiagnosticKind::UnknownCall, call.text_range())
                    .message(callee.as_str())
                    .emit();
                Rule::Blank
            }
        }
    }

    fn wrong_arity(&mut self, call: &ast::Call, callee: &str, expected: &str) -> Rule {
        self.diagnostics
            .report(DiagnosticKind::WrongArgumentCount, call.text_range())
            .message(format!("`{callee}` takes {expected} arguments"))
            .emit();
        Rule::Blank
    }

    fn precedence(&mut self, arg: &Arg) -> Option<Precedence> {
        match arg {
            Arg::Int(int) => match int.value() {
                Some(value) => Some(Precedence::Integer(value)),
                None => {
                    self.bad_integer(int.text_range());
                    None
                }
            },
            Arg::Expr(Expr::StrLit(lit)) => self.string_value(lit).map(Precedence::Name),
            Arg::Expr(other) => {
                self.diagnostics
                    .report(DiagnosticKind::ExpectedPrecedence, other.text_range())
                    .emit();
                None
            }
        }
    }

    fn bad_integer(&mut self, range: TextRange) {
        self.diagnostics
            .report(DiagnosticKind::ExpectedPrecedence, range)
            .message("integer out of range")
            .emit();
    }

    fn string_value(&mut self, lit: &ast::StrLit) -> Option<String> {
        let token = lit.raw()?;
        let start = token.text_range().start();
        match unescape(token.text()) {
            Ok(text) => Some(text),
            Err(bad) => {
                let offset = start + rowan::TextSize::from(bad.start as u32);
                let range = TextRange::at(offset, rowan::TextSize::from(bad.len() as u32));
                self.diagnostics
                    .report(DiagnosticKind::InvalidEscape, range)
                    .message(format!("`{}`", &token.text()[bad]))
                    .emit();
                None
            }
        }
    }
}

fn arg_range(arg: &Arg) -> TextRange {
    match arg {
        Arg::Int(int) => int.text_range(),
        Arg::Expr(expr) => expr.text_range(),
    }
}

/// Decodes a quoted literal. On failure, returns the byte range of the bad
/// escape within `quoted`.
pub(crate) fn unescape(quoted: &str) -> Result<String, std::ops::Range<usize>> {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        // Offsets are relative to `quoted`, which has one leading quote.
        let at = i + 1;
        let Some((_, escaped)) = chars.next() else {
            return Err(at..at + 1);
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' | '"' | '\'' => out.push(escaped),
            'u' => {
                let mut end = at + 2;
                if chars.next_if(|&(_, c)| c == '{').is_none() {
                    return Err(at..end);
                }
                end += 1;
                let mut hex = String::new();
                let mut closed = false;
                while let Some((j, c)) = chars.next() {
                    end = j + 2;
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    hex.push(c);
                }
                let decoded = closed
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => out.push(c),
                    None => return Err(at..end),
                }
            }
            other => return Err(at..at + 1 + other.len_utf8()),
        }
    }

    Ok(out)
}

/// A known directive within two edits of `name`.
fn closest_directive(name: &str) -> Option<&'static str> {
    DIRECTIVES
        .iter()
        .map(|&known| (edit_distance(name, known), known))
        .filter(|&(distance, _)| distance <= 2)
        .min()
        .map(|(_, known)| known)
}

/// Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &b_char) in b.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
