//! LALR(1) item-set construction.
//!
//! States are built from LR(1) kernels, but a successor whose core (items
//! without lookaheads) matches an existing state is merged into it and the
//! lookaheads are unioned. A state whose lookaheads grow is reprocessed
//! until nothing changes.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::terminal_set::TerminalSet;
use crate::error::{GrammarCompileError, Result};

/// Context-free view of the grammar. Symbols below `terminal_count` are
/// terminals (0 is end of input).
#[derive(Debug)]
pub struct LrGrammar {
    pub terminal_count: usize,
    pub symbol_count: usize,
    /// The augmented production `S' -> start` is last.
    pub productions: Vec<LrProduction>,
    by_lhs: Vec<Vec<u32>>,
}

#[derive(Debug, Clone)]
pub struct LrProduction {
    pub lhs: usize,
    pub rhs: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub production: u32,
    pub dot: u16,
}

#[derive(Debug)]
pub struct LrState {
    pub kernel: Vec<Item>,
    lookaheads: Vec<TerminalSet>,
    /// Successor state for every symbol after a dot.
    pub transitions: BTreeMap<usize, usize>,
}

#[derive(Debug)]
pub struct Automaton {
    pub states: Vec<LrState>,
}

impl LrGrammar {
    pub fn new(
        terminal_count: usize,
        symbol_count: usize,
        start: usize,
        mut productions: Vec<LrProduction>,
    ) -> Self {
        productions.push(LrProduction {
            lhs: symbol_count,
            rhs: vec![start],
        });
        let mut by_lhs = vec![Vec::new(); symbol_count + 1];
        for (id, production) in productions.iter().enumerate() {
            by_lhs[production.lhs].push(id as u32);
        }
        Self {
            terminal_count,
            symbol_count,
            productions,
            by_lhs,
        }
    }

    pub fn augmented(&self) -> u32 {
        (self.productions.len() - 1) as u32
    }

    fn is_terminal(&self, symbol: usize) -> bool {
        symbol < self.terminal_count
    }

    pub fn next_symbol(&self, item: Item) -> Option<usize> {
        self.productions[item.production as usize]
            .rhs
            .get(item.dot as usize)
            .copied()
    }
}

/// FIRST sets and nullability of nonterminals, indexed by symbol.
struct FirstSets {
    terminal_count: usize,
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl FirstSets {
    fn new(grammar: &LrGrammar) -> Self {
        let n = grammar.symbol_count + 1;
        let mut first = vec![TerminalSet::new(grammar.terminal_count); n];
        let mut nullable = vec![false; n];
        for (terminal, set) in first.iter_mut().enumerate().take(grammar.terminal_count) {
            set.insert(terminal);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let mut all_nullable = true;
                for &symbol in &production.rhs {
                    if symbol != production.lhs {
                        let addition = first[symbol].clone();
                        changed |= first[production.lhs].union(&addition);
                    }
                    if !nullable[symbol] {
                        all_nullable = false;
                        break;
                    }
                }
                if all_nullable && !nullable[production.lhs] {
                    nullable[production.lhs] = true;
                    changed = true;
                }
            }
        }

        Self {
            terminal_count: grammar.terminal_count,
            first,
            nullable,
        }
    }

    /// FIRST of `symbols` followed by `tail`.
    fn sequence(&self, symbols: &[usize], tail: &TerminalSet) -> TerminalSet {
        let mut result = TerminalSet::new(self.terminal_count);
        for &symbol in symbols {
            result.union(&self.first[symbol]);
            if !self.nullable[symbol] {
                return result;
            }
        }
        result.union(tail);
        result
    }
}

pub fn build(grammar: &LrGrammar, max_states: usize) -> Result<Automaton> {
    let firsts = FirstSets::new(grammar);
    let mut builder = Builder {
        grammar,
        firsts: &firsts,
        states: Vec::new(),
        index: HashMap::new(),
    };

    let mut end = TerminalSet::new(grammar.terminal_count);
    end.insert(0);
    let start = Item {
        production: grammar.augmented(),
        dot: 0,
    };
    builder.add_state(vec![start], vec![end]);

    let mut queue = VecDeque::from([0usize]);
    let mut queued = vec![true];
    while let Some(state) = queue.pop_front() {
        queued[state] = false;
        let closure = builder.closure(state);

        let mut successors: BTreeMap<usize, BTreeMap<Item, TerminalSet>> = BTreeMap::new();
        for (item, lookahead) in &closure {
            let Some(symbol) = grammar.next_symbol(*item) else {
                continue;
            };
            let advanced = Item {
                production: item.production,
                dot: item.dot + 1,
            };
            successors
                .entry(symbol)
                .or_default()
                .entry(advanced)
                .or_insert_with(|| TerminalSet::new(grammar.terminal_count))
                .union(lookahead);
        }

        for (symbol, kernel) in successors {
            let (items, lookaheads): (Vec<Item>, Vec<TerminalSet>) = kernel.into_iter().unzip();
            let target = match builder.index.get(&items) {
                Some(&existing) => {
                    let mut changed = false;
                    let merged = builder.states[existing].lookaheads.iter_mut();
                    for (mine, theirs) in merged.zip(&lookaheads) {
                        changed |= mine.union(theirs);
                    }
                    if changed && !queued[existing] {
                        queued[existing] = true;
                        queue.push_back(existing);
                    }
                    existing
                }
                None => {
                    let id = builder.add_state(items, lookaheads);
                    if builder.states.len() > max_states {
                        return Err(GrammarCompileError::TooManyStates { limit: max_states });
                    }
                    queued.push(true);
                    queue.push_back(id);
                    id
                }
            };
            builder.states[state].transitions.insert(symbol, target);
        }
    }

    tracing::debug!(states = builder.states.len(), "LR automaton built");
    Ok(Automaton {
        states: builder.states,
    })
}

struct Builder<'a> {
    grammar: &'a LrGrammar,
    firsts: &'a FirstSets,
    states: Vec<LrState>,
    index: HashMap<Vec<Item>, usize>,
}

impl Builder<'_> {
    fn add_state(&mut self, kernel: Vec<Item>, lookaheads: Vec<TerminalSet>) -> usize {
        let id = self.states.len();
        self.index.insert(kernel.clone(), id);
        self.states.push(LrState {
            kernel,
            lookaheads,
            transitions: BTreeMap::new(),
        });
        id
    }

    fn closure(&self, state: usize) -> BTreeMap<Item, TerminalSet> {
        let state = &self.states[state];
        closure(self.grammar, self.firsts, &state.kernel, &state.lookaheads)
    }
}

fn closure(
    grammar: &LrGrammar,
    firsts: &FirstSets,
    kernel: &[Item],
    lookaheads: &[TerminalSet],
) -> BTreeMap<Item, TerminalSet> {
    let mut items: BTreeMap<Item, TerminalSet> = kernel
        .iter()
        .copied()
        .zip(lookaheads.iter().cloned())
        .collect();
    let mut work: Vec<Item> = kernel.to_vec();

    while let Some(item) = work.pop() {
        let production = &grammar.productions[item.production as usize];
        let Some(&next) = production.rhs.get(item.dot as usize) else {
            continue;
        };
        if grammar.is_terminal(next) {
            continue;
        }

        let lookahead = firsts.sequence(&production.rhs[item.dot as usize + 1..], &items[&item]);
        for &id in &grammar.by_lhs[next] {
            let fresh = Item {
                production: id,
                dot: 0,
            };
            let changed = match items.get_mut(&fresh) {
                Some(existing) => existing.union(&lookahead),
                None => {
                    items.insert(fresh, lookahead.clone());
                    true
                }
            };
            if changed {
                work.push(fresh);
            }
        }
    }

    items
}

impl Automaton {
    /// Closure of every state with its final lookaheads.
    pub fn closures(&self, grammar: &LrGrammar) -> Vec<BTreeMap<Item, TerminalSet>> {
        let firsts = FirstSets::new(grammar);
        self.states
            .iter()
            .map(|s| closure(grammar, &firsts, &s.kernel, &s.lookaheads))
            .collect()
    }
}
