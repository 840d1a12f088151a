//! Table construction from a flattened grammar.
//!
//! Symbols are numbered `END`, lexical terminals, externals, then variables.
//! Production ids follow variable order and are shared with the LR builder,
//! whose augmented start production is kept out of the table.

mod conflict;
mod item_set;
mod lexer;
mod terminal_set;

#[cfg(test)]
mod item_set_tests;

use std::collections::{BTreeMap, BTreeSet};

use sapwood_core::{FieldId, StateId};
use sapwood_table::{
    ActionEntry, ParseAction, ParseState, Production, Symbol, SymbolInfo, SymbolKind, TableData,
    TerminalInfo,
};

use crate::error::{GrammarCompileError, Result};
use crate::options::CompileOptions;
use crate::prepare::{FlatGrammar, PrecedenceOrder, Sym};
use conflict::{Candidates, Resolver};
use item_set::{LrGrammar, LrProduction};

/// Symbol numbering for a flattened grammar.
struct Numbering {
    lexical: usize,
    externals: usize,
    variables: usize,
}

impl Numbering {
    fn new(grammar: &FlatGrammar) -> Self {
        Self {
            lexical: grammar.lexical.len(),
            externals: grammar.externals.len(),
            variables: grammar.variables.len(),
        }
    }

    fn terminal_count(&self) -> usize {
        1 + self.lexical + self.externals
    }

    fn symbol_count(&self) -> usize {
        self.terminal_count() + self.variables
    }

    fn of(&self, sym: Sym) -> usize {
        match sym {
            Sym::Lexical(i) => 1 + i,
            Sym::External(i) => 1 + self.lexical + i,
            Sym::Rule(v) => self.terminal_count() + v,
        }
    }
}

pub fn build_table(
    grammar: &FlatGrammar,
    order: &PrecedenceOrder,
    options: &CompileOptions,
) -> Result<TableData> {
    let numbering = Numbering::new(grammar);
    if numbering.symbol_count() >= u16::MAX as usize {
        return Err(GrammarCompileError::Unsupported(format!(
            "{} symbols exceed the table limit",
            numbering.symbol_count()
        )));
    }
    if grammar.production_count() >= u16::MAX as usize {
        return Err(GrammarCompileError::Unsupported(format!(
            "{} productions exceed the table limit",
            grammar.production_count()
        )));
    }

    let productions: Vec<LrProduction> = grammar
        .variables
        .iter()
        .enumerate()
        .flat_map(|(v, variable)| {
            let numbering = &numbering;
            variable.productions.iter().map(move |p| LrProduction {
                lhs: numbering.of(Sym::Rule(v)),
                rhs: p.steps.iter().map(|s| numbering.of(s.symbol)).collect(),
            })
        })
        .collect();
    let lr = LrGrammar::new(
        numbering.terminal_count(),
        numbering.symbol_count(),
        numbering.of(Sym::Rule(0)),
        productions,
    );

    let automaton = item_set::build(&lr, options.get_max_states())?;
    let closures = automaton.closures(&lr);
    let symbols = symbol_infos(grammar);

    let mut resolver = Resolver::new(grammar, order);
    let mut states = Vec::with_capacity(automaton.states.len());
    let mut actions: Vec<ParseAction> = Vec::new();

    for (id, (state, closure)) in automaton.states.iter().zip(&closures).enumerate() {
        let mut candidates: BTreeMap<usize, Candidates> = BTreeMap::new();
        for (&item, lookahead) in closure {
            match lr.next_symbol(item) {
                Some(next) if next < lr.terminal_count => {
                    let target = state.transitions[&next] as StateId;
                    let entry = candidates.entry(next).or_default();
                    entry
                        .shift
                        .get_or_insert_with(|| (target, Vec::new()))
                        .1
                        .push(item);
                }
                Some(_) => {}
                None if item.production == lr.augmented() => {
                    candidates.entry(0).or_default().accept = true;
                }
                None => {
                    for terminal in lookahead.iter() {
                        candidates
                            .entry(terminal)
                            .or_default()
                            .reduces
                            .push(item.production);
                    }
                }
            }
        }

        let mut entries = Vec::with_capacity(candidates.len());
        for (terminal, mut candidate) in candidates {
            candidate.reduces.sort_unstable();
            candidate.reduces.dedup();
            let resolved = resolver.resolve(id, &symbols[terminal].name, candidate);
            entries.push(ActionEntry {
                symbol: Symbol(terminal as u16),
                start: actions.len() as u32,
                len: resolved.len() as u16,
            });
            actions.extend(resolved);
        }

        let gotos = state
            .transitions
            .iter()
            .filter(|&(&symbol, _)| symbol >= lr.terminal_count)
            .map(|(&symbol, &target)| (Symbol(symbol as u16), target as StateId))
            .collect();

        states.push(ParseState {
            actions: entries,
            gotos,
            lex_mode: 0,
        });
    }

    let extras: Vec<Symbol> = grammar
        .extras
        .iter()
        .map(|&e| Symbol(numbering.of(e) as u16))
        .collect();
    let named_extras: Vec<Symbol> = extras
        .iter()
        .copied()
        .filter(|s| symbols[s.index()].named && symbols[s.index()].visible)
        .collect();
    let lex_modes = lexer::assign_lex_modes(&mut states, &named_extras, |s| {
        symbols[s.index()].kind == SymbolKind::External
    });

    let (fields, table_productions) = productions_with_fields(grammar, &numbering);
    let lexer = lexer::build_dfa(&grammar.lexical, options.get_minimize_lexer())?;

    tracing::debug!(
        symbols = symbols.len(),
        states = states.len(),
        productions = table_productions.len(),
        unresolved_conflicts = resolver.unresolved(),
        "parse table built"
    );

    Ok(TableData {
        name: grammar.name.clone(),
        terminals: terminal_infos(grammar),
        symbols,
        fields,
        productions: table_productions,
        states,
        actions,
        lex_modes,
        externals: (0..grammar.externals.len())
            .map(|i| Symbol(numbering.of(Sym::External(i)) as u16))
            .collect(),
        extras,
        word: grammar
            .word
            .map(|w| Symbol(numbering.of(Sym::Lexical(w)) as u16)),
        start_symbol: Symbol(numbering.of(Sym::Rule(0)) as u16),
        start_state: 0,
        lexer,
    })
}

fn symbol_infos(grammar: &FlatGrammar) -> Vec<SymbolInfo> {
    let mut symbols = Vec::with_capacity(
        1 + grammar.lexical.len() + grammar.externals.len() + grammar.variables.len(),
    );
    symbols.push(SymbolInfo {
        name: "end".to_string(),
        kind: SymbolKind::End,
        named: false,
        visible: false,
        extra: false,
        supertype: false,
    });
    symbols.extend(grammar.lexical.iter().map(|t| SymbolInfo {
        name: t.name.clone(),
        kind: SymbolKind::Terminal,
        named: t.named,
        visible: t.visible,
        extra: t.extra,
        supertype: false,
    }));
    symbols.extend(grammar.externals.iter().map(|t| SymbolInfo {
        name: t.name.clone(),
        kind: SymbolKind::External,
        named: t.named,
        visible: t.visible,
        extra: t.extra,
        supertype: false,
    }));
    symbols.extend(grammar.variables.iter().map(|v| SymbolInfo {
        name: v.name.clone(),
        kind: SymbolKind::Nonterminal,
        named: true,
        visible: v.visible,
        extra: false,
        supertype: v.supertype,
    }));
    symbols
}

fn terminal_infos(grammar: &FlatGrammar) -> Vec<TerminalInfo> {
    let mut terminals = Vec::with_capacity(1 + grammar.lexical.len() + grammar.externals.len());
    terminals.push(TerminalInfo::default());
    terminals.extend(grammar.lexical.iter().enumerate().map(|(i, t)| TerminalInfo {
        pattern: Some(i as u32),
        precedence: t.precedence,
        immediate: t.immediate,
        is_string: t.literal.is_some(),
        is_keyword: t.is_keyword,
    }));
    terminals.extend(grammar.externals.iter().map(|_| TerminalInfo::default()));
    terminals
}

/// Field names sorted alphabetically; ids start at 1.
fn productions_with_fields(
    grammar: &FlatGrammar,
    numbering: &Numbering,
) -> (Vec<String>, Vec<Production>) {
    let names: BTreeSet<&str> = grammar
        .variables
        .iter()
        .flat_map(|v| &v.productions)
        .flat_map(|p| &p.steps)
        .filter_map(|s| s.field.as_deref())
        .collect();
    let fields: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let field_id = |name: &str| {
        let index = fields
            .binary_search_by(|f| f.as_str().cmp(name))
            .expect("field collected above");
        FieldId::new(index as u16 + 1).expect("field ids start at 1")
    };

    let mut productions = Vec::with_capacity(grammar.production_count());
    for (v, variable) in grammar.variables.iter().enumerate() {
        for production in &variable.productions {
            productions.push(Production {
                lhs: Symbol(numbering.of(Sym::Rule(v)) as u16),
                child_count: production.steps.len() as u16,
                fields: production
                    .steps
                    .iter()
                    .map(|s| s.field.as_deref().map(field_id))
                    .collect(),
                dynamic_precedence: production.dynamic_precedence,
            });
        }
    }
    (fields, productions)
}
