//! Token extraction.
//!
//! Lexical parts of the grammar become terminals with a regex each:
//! - rules whose whole body is a string, pattern or `token(..)` become named
//!   terminals (the start rule always stays syntactic)
//! - strings inside syntactic rules become anonymous terminals named by
//!   their text
//! - patterns and `token(..)` bodies become hidden terminals named
//!   `<rule>_token<n>`
//!
//! Inline terminals are deduplicated by regex and immediacy. A string that
//! names an external token refers to that external instead.

use std::collections::HashMap;

use regex_automata::meta;
use sapwood_core::{Grammar, Precedence, Rule};

use super::intern::RuleTable;
use super::precedence::{Assoc, PrecedenceOrder};
use super::{Expr, ExternalTerminal, ExtractedGrammar, LexicalTerminal, Sym, SyntacticRule};
use crate::error::{GrammarCompileError, Result};

pub fn extract(
    grammar: &Grammar,
    table: &RuleTable<'_>,
    order: &PrecedenceOrder,
) -> Result<ExtractedGrammar> {
    let mut extractor = Extractor {
        table,
        order,
        lexical: Vec::new(),
        dedup: HashMap::new(),
        counters: HashMap::new(),
        rule_terminals: HashMap::new(),
        external_strings: HashMap::new(),
        syntactic: vec![None; table.len()],
    };

    let mut externals = extract_externals(grammar)?;
    for (index, external) in externals.iter().enumerate() {
        if !external.named {
            extractor.external_strings.insert(external.name.clone(), index);
        }
    }

    for (index, name, body) in table.iter() {
        if index > 0 && is_lexical(body) {
            let terminal = extractor.rule_terminal(name, body)?;
            extractor.rule_terminals.insert(name, terminal);
        }
    }

    let mut syntactic_names = Vec::new();
    for (index, name, _) in table.iter() {
        if !extractor.rule_terminals.contains_key(name) {
            extractor.syntactic[index] = Some(syntactic_names.len());
            syntactic_names.push(name);
        }
    }

    let mut rules = Vec::with_capacity(syntactic_names.len());
    for name in syntactic_names {
        let index = table.index_of(name).expect("interned rule");
        let body = extractor.convert(table.body(index), name)?;
        let supertype = grammar.supertypes.iter().any(|s| s == name);
        rules.push(SyntacticRule {
            name: name.to_string(),
            body,
            visible: !name.starts_with('_') && !supertype,
            supertype,
            inline: grammar.inline.iter().any(|s| s == name),
        });
    }

    let mut extras = Vec::with_capacity(grammar.extras.len());
    for extra in &grammar.extras {
        let sym = extractor.extra(extra)?;
        match sym {
            Sym::Lexical(i) => extractor.lexical[i].extra = true,
            Sym::External(i) => externals[i].extra = true,
            Sym::Rule(_) => unreachable!("extras resolve to terminals"),
        }
        if !extras.contains(&sym) {
            extras.push(sym);
        }
    }

    let word = match &grammar.word {
        Some(word) => {
            let index = *extractor.rule_terminals.get(word.as_str()).ok_or_else(|| {
                GrammarCompileError::Unsupported(format!("word rule `{word}` must be a token"))
            })?;
            mark_keywords(&mut extractor.lexical, index)?;
            Some(index)
        }
        None => None,
    };

    Ok(ExtractedGrammar {
        name: grammar.name.clone(),
        lexical: extractor.lexical,
        externals,
        rules,
        extras,
        word,
        conflicts: grammar.conflicts.clone(),
    })
}

fn extract_externals(grammar: &Grammar) -> Result<Vec<ExternalTerminal>> {
    grammar
        .externals
        .iter()
        .map(|external| match external {
            Rule::Symbol(name) => Ok(ExternalTerminal {
                name: name.clone(),
                named: true,
                visible: !name.starts_with('_'),
                extra: false,
            }),
            Rule::String(text) => Ok(ExternalTerminal {
                name: text.clone(),
                named: false,
                visible: true,
                extra: false,
            }),
            _ => Err(GrammarCompileError::Unsupported(
                "external tokens must be names or strings".to_string(),
            )),
        })
        .collect()
}

fn is_lexical(body: &Rule) -> bool {
    matches!(
        body,
        Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_)
    )
}

struct Extractor<'a, 'g> {
    table: &'a RuleTable<'g>,
    order: &'a PrecedenceOrder,
    lexical: Vec<LexicalTerminal>,
    dedup: HashMap<(String, bool), usize>,
    /// Per-rule counter for hidden token names.
    counters: HashMap<String, usize>,
    rule_terminals: HashMap<&'g str, usize>,
    /// String externals; matching literals in rules refer to them.
    external_strings: HashMap<String, usize>,
    /// Rule index to syntactic rule index.
    syntactic: Vec<Option<usize>>,
}

impl<'g> Extractor<'_, 'g> {
    fn rule_terminal(&mut self, name: &str, body: &Rule) -> Result<usize> {
        let (inner, immediate) = match body {
            Rule::ImmediateToken(inner) => (inner.as_ref(), true),
            Rule::Token(inner) => (inner.as_ref(), false),
            other => (other, false),
        };
        let (regex, precedence) = token_regex(inner, name)?;
        check_regex(&regex, name)?;

        let index = self.lexical.len();
        self.dedup.entry((regex.clone(), immediate)).or_insert(index);
        self.lexical.push(LexicalTerminal {
            name: name.to_string(),
            regex,
            literal: string_literal(inner),
            named: true,
            visible: !name.starts_with('_'),
            immediate,
            precedence,
            is_keyword: false,
            extra: false,
        });
        Ok(index)
    }

    /// Registers or reuses an inline terminal.
    fn inline_terminal(&mut self, owner: &str, content: &Rule, immediate: bool) -> Result<usize> {
        let (regex, precedence) = token_regex(content, owner)?;
        if let Some(&existing) = self.dedup.get(&(regex.clone(), immediate)) {
            return Ok(existing);
        }
        check_regex(&regex, owner)?;

        let literal = string_literal(content);
        let (name, named, visible) = match &literal {
            Some(text) => (text.clone(), false, true),
            None => {
                let counter = self.counters.entry(owner.to_string()).or_insert(0);
                *counter += 1;
                (format!("{owner}_token{counter}"), true, false)
            }
        };

        let index = self.lexical.len();
        self.dedup.insert((regex.clone(), immediate), index);
        self.lexical.push(LexicalTerminal {
            name,
            regex,
            literal,
            named,
            visible,
            immediate,
            precedence,
            is_keyword: false,
            extra: false,
        });
        Ok(index)
    }

    fn resolve_symbol(&self, name: &str) -> Sym {
        if let Some(&terminal) = self.rule_terminals.get(name) {
            return Sym::Lexical(terminal);
        }
        if let Some(external) = self.table.external_index(name) {
            return Sym::External(external);
        }
        let index = self.table.index_of(name).expect("symbols are validated");
        Sym::Rule(self.syntactic[index].expect("non-token rule is syntactic"))
    }

    fn convert(&mut self, rule: &Rule, owner: &str) -> Result<Expr> {
        Ok(match rule {
            Rule::Blank => Expr::Blank,
            Rule::String(text) if self.external_strings.contains_key(text) => {
                Expr::Sym(Sym::External(self.external_strings[text]))
            }
            Rule::String(_) | Rule::Pattern { .. } => {
                Expr::Sym(Sym::Lexical(self.inline_terminal(owner, rule, false)?))
            }
            Rule::Token(inner) => {
                Expr::Sym(Sym::Lexical(self.inline_terminal(owner, inner, false)?))
            }
            Rule::ImmediateToken(inner) => {
                Expr::Sym(Sym::Lexical(self.inline_terminal(owner, inner, true)?))
            }
            Rule::Symbol(name) => Expr::Sym(self.resolve_symbol(name)),
            Rule::Seq(members) => Expr::Seq(
                members
                    .iter()
                    .map(|m| self.convert(m, owner))
                    .collect::<Result<_>>()?,
            ),
            Rule::Choice(members) => Expr::Choice(
                members
                    .iter()
                    .map(|m| self.convert(m, owner))
                    .collect::<Result<_>>()?,
            ),
            Rule::Repeat(content) => Expr::Repeat(Box::new(self.convert(content, owner)?)),
            Rule::Repeat1(content) => Expr::Repeat1(Box::new(self.convert(content, owner)?)),
            Rule::Field { name, content } => {
                Expr::Field(name.clone(), Box::new(self.convert(content, owner)?))
            }
            Rule::Prec { value, content } => self.prec(value, None, content, owner)?,
            Rule::PrecLeft { value, content } => {
                self.prec(value, Some(Assoc::Left), content, owner)?
            }
            Rule::PrecRight { value, content } => {
                self.prec(value, Some(Assoc::Right), content, owner)?
            }
            Rule::PrecDynamic { value, content } => {
                Expr::Dynamic(*value, Box::new(self.convert(content, owner)?))
            }
        })
    }

    fn prec(
        &mut self,
        value: &Precedence,
        assoc: Option<Assoc>,
        content: &Rule,
        owner: &str,
    ) -> Result<Expr> {
        let level = self.order.resolve(value)?;
        Ok(Expr::Prec(level, assoc, Box::new(self.convert(content, owner)?)))
    }

    fn extra(&mut self, extra: &Rule) -> Result<Sym> {
        match extra {
            Rule::Symbol(name) => match self.resolve_symbol(name) {
                Sym::Rule(_) => Err(GrammarCompileError::NonTerminalExtra(name.clone())),
                terminal => Ok(terminal),
            },
            Rule::String(_) | Rule::Pattern { .. } => {
                Ok(Sym::Lexical(self.inline_terminal("extras", extra, false)?))
            }
            Rule::Token(inner) => Ok(Sym::Lexical(self.inline_terminal("extras", inner, false)?)),
            other => Err(GrammarCompileError::NonTerminalExtra(describe(other))),
        }
    }
}

fn describe(rule: &Rule) -> String {
    match rule {
        Rule::Seq(_) => "seq(..)".to_string(),
        Rule::Choice(_) => "choice(..)".to_string(),
        Rule::Repeat(_) | Rule::Repeat1(_) => "repeat(..)".to_string(),
        other => format!("{other:?}"),
    }
}

fn string_literal(rule: &Rule) -> Option<String> {
    match rule {
        Rule::String(text) => Some(text.clone()),
        _ => None,
    }
}

/// Regex source and lexical precedence of a token body.
pub(crate) fn token_regex(rule: &Rule, owner: &str) -> Result<(String, i32)> {
    Ok(match rule {
        Rule::Blank => (String::new(), 0),
        Rule::String(text) => (regex_syntax::escape(text), 0),
        Rule::Pattern { value, flags } => match flags.as_deref() {
            None | Some("") => (format!("(?:{value})"), 0),
            Some(f) if f.chars().all(|c| c == 'i') => (format!("(?i:{value})"), 0),
            Some(f) => {
                return Err(GrammarCompileError::Unsupported(format!(
                    "regex flags `{f}` in rule `{owner}`"
                )));
            }
        },
        Rule::Seq(members) => {
            let mut regex = String::new();
            let mut precedence = 0;
            for member in members {
                let (part, prec) = token_regex(member, owner)?;
                regex.push_str(&part);
                precedence = precedence.max(prec);
            }
            (regex, precedence)
        }
        Rule::Choice(members) => {
            let mut parts = Vec::with_capacity(members.len());
            let mut precedence = 0;
            for member in members {
                let (part, prec) = token_regex(member, owner)?;
                parts.push(part);
                precedence = precedence.max(prec);
            }
            (format!("(?:{})", parts.join("|")), precedence)
        }
        Rule::Repeat(content) => {
            let (inner, prec) = token_regex(content, owner)?;
            (format!("(?:{inner})*"), prec)
        }
        Rule::Repeat1(content) => {
            let (inner, prec) = token_regex(content, owner)?;
            (format!("(?:{inner})+"), prec)
        }
        Rule::Prec { value, content }
        | Rule::PrecLeft { value, content }
        | Rule::PrecRight { value, content } => {
            let Precedence::Integer(level) = value else {
                return Err(GrammarCompileError::Unsupported(format!(
                    "named precedence inside a token in rule `{owner}`"
                )));
            };
            let (inner, _) = token_regex(content, owner)?;
            (inner, *level)
        }
        Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::PrecDynamic { content, .. }
        | Rule::Field { content, .. } => token_regex(content, owner)?,
        Rule::Symbol(name) => {
            return Err(GrammarCompileError::SymbolInToken {
                rule: owner.to_string(),
                symbol: name.clone(),
            });
        }
    })
}

fn check_regex(regex: &str, rule: &str) -> Result<()> {
    let hir = regex_syntax::Parser::new()
        .parse(regex)
        .map_err(|err| GrammarCompileError::InvalidPattern {
            rule: rule.to_string(),
            pattern: regex.to_string(),
            message: err.to_string(),
        })?;
    if hir.properties().minimum_len() == Some(0) {
        return Err(GrammarCompileError::EmptyToken(rule.to_string()));
    }
    Ok(())
}

/// Flags string terminals that the word token matches in full.
fn mark_keywords(lexical: &mut [LexicalTerminal], word: usize) -> Result<()> {
    let pattern = format!("^(?:{})$", lexical[word].regex);
    let matcher = meta::Regex::new(&pattern).map_err(|err| GrammarCompileError::InvalidPattern {
        rule: lexical[word].name.clone(),
        pattern: lexical[word].regex.clone(),
        message: err.to_string(),
    })?;

    for (index, terminal) in lexical.iter_mut().enumerate() {
        if index == word {
            continue;
        }
        if let Some(text) = &terminal.literal
            && !terminal.immediate
            && matcher.is_match(text)
        {
            terminal.is_keyword = true;
        }
    }
    Ok(())
}
