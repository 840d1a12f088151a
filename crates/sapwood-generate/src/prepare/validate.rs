//! Structural checks that need no token extraction.

use std::collections::VecDeque;

use sapwood_core::{Grammar, Precedence, PrecedenceEntry, Rule};

use super::intern::RuleTable;
use super::precedence::PrecedenceOrder;
use crate::error::{GrammarCompileError, Result};

/// Runs every check, returning the first failure.
pub fn validate(grammar: &Grammar, table: &RuleTable<'_>) -> Result<PrecedenceOrder> {
    check_defined(grammar, table)?;
    check_tokens(table)?;
    let order = PrecedenceOrder::new(grammar)?;
    check_precedence_names(table, &order)?;
    check_inline(grammar, table)?;
    check_reachable(grammar, table)?;
    Ok(order)
}

fn undefined(symbol: &str, context: impl Into<String>) -> GrammarCompileError {
    GrammarCompileError::UndefinedSymbol {
        symbol: symbol.to_string(),
        context: context.into(),
    }
}

fn symbols(rule: &Rule) -> Vec<&str> {
    let mut out = Vec::new();
    rule.walk(&mut |r| {
        if let Rule::Symbol(name) = r {
            out.push(name.as_str());
        }
    });
    out
}

fn check_defined(grammar: &Grammar, table: &RuleTable<'_>) -> Result<()> {
    for (_, name, body) in table.iter() {
        if let Some(missing) = symbols(body).into_iter().find(|s| !table.is_defined(s)) {
            return Err(undefined(missing, format!("rule `{name}`")));
        }
    }

    for extra in &grammar.extras {
        if let Some(missing) = symbols(extra).into_iter().find(|s| !table.is_defined(s)) {
            return Err(undefined(missing, "@extras"));
        }
    }

    let named_lists = [
        ("@inline", &grammar.inline),
        ("@supertypes", &grammar.supertypes),
    ];
    for (context, names) in named_lists {
        if let Some(missing) = names.iter().find(|n| table.index_of(n).is_none()) {
            return Err(undefined(missing, context));
        }
    }

    if let Some(word) = &grammar.word
        && table.index_of(word).is_none()
    {
        return Err(undefined(word, "@word"));
    }

    for set in &grammar.conflicts {
        if let Some(missing) = set.iter().find(|n| !table.is_defined(n)) {
            return Err(undefined(missing, "@conflicts"));
        }
    }

    for list in &grammar.precedences {
        for entry in list {
            if let PrecedenceEntry::Symbol(name) = entry
                && table.index_of(name).is_none()
            {
                return Err(undefined(name, "@precedences"));
            }
        }
    }

    Ok(())
}

fn check_tokens(table: &RuleTable<'_>) -> Result<()> {
    for (_, name, body) in table.iter() {
        let mut found = None;
        body.walk(&mut |r| {
            if let Rule::Token(inner) | Rule::ImmediateToken(inner) = r
                && found.is_none()
            {
                found = symbols(inner).first().map(|s| s.to_string());
            }
        });
        if let Some(symbol) = found {
            return Err(GrammarCompileError::SymbolInToken {
                rule: name.to_string(),
                symbol,
            });
        }
    }
    Ok(())
}

fn check_precedence_names(table: &RuleTable<'_>, order: &PrecedenceOrder) -> Result<()> {
    for (_, _, body) in table.iter() {
        let mut result = Ok(());
        body.walk(&mut |r| {
            if let Rule::Prec { value, .. }
            | Rule::PrecLeft { value, .. }
            | Rule::PrecRight { value, .. } = r
                && let Precedence::Name(_) = value
                && result.is_ok()
            {
                result = order.resolve(value).map(|_| ());
            }
        });
        result?;
    }
    Ok(())
}

/// An inline rule may not reach itself through other inline rules.
fn check_inline(grammar: &Grammar, table: &RuleTable<'_>) -> Result<()> {
    let is_inline = |name: &str| grammar.inline.iter().any(|n| n == name);

    for start in &grammar.inline {
        let Some(index) = table.index_of(start) else {
            continue;
        };
        let mut seen = vec![false; table.len()];
        let mut queue = VecDeque::from([index]);
        while let Some(current) = queue.pop_front() {
            for symbol in symbols(table.body(current)) {
                if symbol == start {
                    return Err(GrammarCompileError::RecursiveInline(start.clone()));
                }
                if let Some(next) = table.index_of(symbol)
                    && is_inline(symbol)
                    && !seen[next]
                {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    Ok(())
}

/// Roots: the start rule, extras, externals and the word rule.
fn check_reachable(grammar: &Grammar, table: &RuleTable<'_>) -> Result<()> {
    let mut reached = vec![false; table.len()];
    let mut queue = VecDeque::new();
    let visit = |name: &str, reached: &mut Vec<bool>, queue: &mut VecDeque<usize>| {
        if let Some(index) = table.index_of(name)
            && !reached[index]
        {
            reached[index] = true;
            queue.push_back(index);
        }
    };

    visit(table.name(0), &mut reached, &mut queue);
    for root in grammar.extras.iter().chain(&grammar.externals) {
        for name in symbols(root) {
            visit(name, &mut reached, &mut queue);
        }
    }
    if let Some(word) = &grammar.word {
        visit(word, &mut reached, &mut queue);
    }

    while let Some(index) = queue.pop_front() {
        for name in symbols(table.body(index)) {
            visit(name, &mut reached, &mut queue);
        }
    }

    match reached.iter().position(|&r| !r) {
        Some(index) => Err(GrammarCompileError::UnreachableRule(
            table.name(index).to_string(),
        )),
        None => Ok(()),
    }
}
