//! Shift/reduce and reduce/reduce conflict resolution.

use std::cmp::Ordering;

use sapwood_core::StateId;
use sapwood_table::ParseAction;

use super::item_set::Item;
use crate::prepare::{Assoc, FlatGrammar, FlatProduction, PrecLevel, PrecedenceOrder};

/// Everything the automaton allows for one (state, terminal) pair.
#[derive(Debug, Default)]
pub struct Candidates {
    /// Target state and the items that shift the terminal.
    pub shift: Option<(StateId, Vec<Item>)>,
    /// Production ids, ascending.
    pub reduces: Vec<u32>,
    pub accept: bool,
}

pub struct Resolver<'a> {
    grammar: &'a FlatGrammar,
    order: &'a PrecedenceOrder,
    /// Production id to (variable, production).
    productions: Vec<(usize, &'a FlatProduction)>,
    unresolved: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(grammar: &'a FlatGrammar, order: &'a PrecedenceOrder) -> Self {
        let productions = grammar
            .variables
            .iter()
            .enumerate()
            .flat_map(|(v, variable)| variable.productions.iter().map(move |p| (v, p)))
            .collect();
        Self {
            grammar,
            order,
            productions,
            unresolved: 0,
        }
    }

    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    fn reduce_precedence(&self, production: u32) -> (PrecLevel, Option<Assoc>) {
        let (_, flat) = self.productions[production as usize];
        flat.steps
            .last()
            .map_or((PrecLevel::default(), None), |s| (s.precedence, s.assoc))
    }

    /// Precedence of the step before the dot, or at the dot for fresh items.
    fn shift_precedence(&self, item: Item) -> PrecLevel {
        let (_, flat) = self.productions[item.production as usize];
        let index = (item.dot as usize).saturating_sub(1);
        flat.steps
            .get(index)
            .map_or(PrecLevel::default(), |s| s.precedence)
    }

    /// Compares the shift against a reduction; `None` when undecidable.
    fn compare_shift(&self, shift_items: &[Item], reduce: PrecLevel) -> Option<Ordering> {
        let mut verdict = None;
        for &item in shift_items {
            let ordering = self.order.compare(self.shift_precedence(item), reduce)?;
            match verdict {
                None => verdict = Some(ordering),
                Some(previous) if previous != ordering => return None,
                Some(_) => {}
            }
        }
        verdict
    }

    pub fn resolve(
        &mut self,
        state: usize,
        terminal: &str,
        candidates: Candidates,
    ) -> Vec<ParseAction> {
        if candidates.accept {
            return vec![ParseAction::Accept];
        }

        // Reduce/reduce: keep the maximal precedences.
        let levels: Vec<_> = candidates
            .reduces
            .iter()
            .map(|&p| self.reduce_precedence(p).0)
            .collect();
        let mut reduces: Vec<u32> = candidates
            .reduces
            .iter()
            .enumerate()
            .filter(|&(i, _)| {
                !levels
                    .iter()
                    .any(|&other| self.order.compare(other, levels[i]) == Some(Ordering::Greater))
            })
            .map(|(_, &p)| p)
            .collect();

        let mut shift = candidates.shift;
        if let Some((_, items)) = &shift {
            let mut keep_shift = true;
            reduces.retain(|&production| {
                let (level, assoc) = self.reduce_precedence(production);
                match self.compare_shift(items, level) {
                    Some(Ordering::Greater) => false,
                    Some(Ordering::Less) => {
                        keep_shift = false;
                        true
                    }
                    Some(Ordering::Equal) => match assoc {
                        Some(Assoc::Left) => {
                            keep_shift = false;
                            true
                        }
                        Some(Assoc::Right) => false,
                        None => true,
                    },
                    None => true,
                }
            });
            if !keep_shift {
                shift = None;
            }
        }

        let mut actions = Vec::with_capacity(reduces.len() + 1);
        let shift_items = shift.as_ref().map(|(_, items)| items.clone()).unwrap_or_default();
        if let Some((target, _)) = shift {
            actions.push(ParseAction::Shift(target));
        }
        actions.extend(reduces.iter().map(|&p| ParseAction::Reduce(p as u16)));

        if actions.len() > 1 {
            self.report(state, terminal, &shift_items, &reduces);
        }
        actions
    }

    fn report(&mut self, state: usize, terminal: &str, shift_items: &[Item], reduces: &[u32]) {
        let mut rules: Vec<&str> = shift_items
            .iter()
            .map(|item| item.production)
            .chain(reduces.iter().copied())
            .map(|p| {
                let (variable, _) = self.productions[p as usize];
                self.grammar.variables[variable].origin.as_str()
            })
            .collect();
        rules.sort_unstable();
        rules.dedup();

        let expected = self
            .grammar
            .conflicts
            .iter()
            .any(|set| rules.iter().all(|r| set.iter().any(|s| s == r)));
        if !expected {
            self.unresolved += 1;
            tracing::warn!(
                state,
                terminal,
                rules = ?rules,
                "unresolved conflict; add it to @conflicts or use precedence"
            );
        }
    }
}
