//! Error recovery.
//!
//! Runs when every version is stuck. The cheapest stuck version is kept and
//! continued by one of:
//!
//! - inserting a zero-width MISSING token that lets the lookahead through,
//! - popping subtrees into an `ERROR` node back to a state that accepts the
//!   lookahead,
//! - wrapping the lookahead in an `ERROR` node and moving past it.
//!
//! Insertion and pop-back are tried once per position and neither consumes
//! input, so a version that stays stuck eventually skips. At end of input,
//! where nothing can be skipped, the stack becomes an `ERROR` root.

use std::cmp::Reverse;
use std::sync::Arc;

use sapwood_table::{ParseAction, StateId, Symbol};

use super::{ParseRun, Status};
use crate::lexer::Token;
use crate::stack::StackNode;
use crate::subtree::{MISSING_COST, RECOVERY_COST, SKIPPED_BYTE_COST, SKIPPED_TREE_COST, Subtree};
use crate::trace::{Recovery, Tracer};

/// Reductions simulated while checking whether a symbol can be shifted.
const MAX_SIMULATED_REDUCTIONS: usize = 64;

struct PopBack {
    head: Arc<StackNode>,
    cost: u32,
    trees: usize,
}

impl<T: Tracer> ParseRun<'_, T> {
    pub(super) fn recover(&mut self) {
        let Some(best) = self
            .versions
            .iter()
            .enumerate()
            .min_by_key(|(i, v)| (v.head.error_cost, Reverse(v.head.dynamic_precedence), *i))
            .map(|(i, _)| i)
        else {
            return;
        };
        let mut version = self.versions.swap_remove(best);
        self.versions.clear();

        let Status::Paused(token) = std::mem::replace(&mut version.status, Status::Active) else {
            return;
        };
        self.stats.recoveries += 1;

        if let Some(finished) = &self.finished
            && version.head.error_cost + MISSING_COST >= finished.error_cost()
        {
            return;
        }

        let position = version.head.position;
        let lookahead = token.symbol;

        if !lookahead.is_error() && version.missing_at != Some(position) {
            version.missing_at = Some(position);
            if let Some((head, symbol)) = self.insert_missing(&version.head, lookahead) {
                self.tracer.trace_recover(position, Recovery::Missing(symbol));
                version.head = head;
                version.reductions = 0;
                self.versions.push(version);
                return;
            }
        }

        let pop_back = if !lookahead.is_error() && version.popped_at != Some(position) {
            version.popped_at = Some(position);
            self.pop_back(&version.head, lookahead)
        } else {
            None
        };
        let skip_cost = (!lookahead.is_end())
            .then(|| RECOVERY_COST + SKIPPED_TREE_COST + SKIPPED_BYTE_COST * token.size as u32);
        let pop_back = pop_back.filter(|pop| skip_cost.is_none_or(|skip| pop.cost <= skip));

        match (pop_back, skip_cost) {
            (Some(pop), _) => {
                self.tracer
                    .trace_recover(position, Recovery::PopBack { trees: pop.trees });
                version.head = pop.head;
                version.reductions = 0;
                self.versions.push(version);
            }
            (None, Some(_)) => {
                self.tracer.trace_recover(position, Recovery::Skip(lookahead));
                version.head = self.skip(&version.head, &token);
                version.reductions = 0;
                self.versions.push(version);
            }
            (None, None) => {
                self.tracer.trace_recover(position, Recovery::ErrorRoot);
                let root = self.error_root(&version.head, Some(&token));
                self.finish(root);
            }
        }
    }

    /// Tries expected terminals in symbol order; the first one after which
    /// `lookahead` can be consumed is inserted as a MISSING leaf.
    fn insert_missing(
        &self,
        head: &Arc<StackNode>,
        lookahead: Symbol,
    ) -> Option<(Arc<StackNode>, Symbol)> {
        let table = self.table;
        let candidates: Vec<Symbol> = table.expected(head.state).collect();
        for symbol in candidates {
            if symbol.is_end()
                || symbol == lookahead
                || table.is_extra(symbol)
                || table.is_external(symbol)
            {
                continue;
            }
            let Some((reduced, next)) = self.simulate_shift(head, symbol) else {
                continue;
            };
            let leaf = Subtree::missing(table, symbol, reduced.state, &reduced.scanner_state);
            let pushed = reduced.push(leaf, false, next);
            let passes = (!lookahead.is_end() && table.is_extra(lookahead))
                || self.can_consume(&pushed, lookahead);
            if passes {
                return Some((pushed, symbol));
            }
        }
        None
    }

    /// Walks the preferred path down to the nearest state that can consume
    /// `lookahead`, wrapping everything popped in an `ERROR` node.
    fn pop_back(&self, head: &Arc<StackNode>, lookahead: Symbol) -> Option<PopBack> {
        let mut popped = Vec::new();
        let mut trees = 0;
        let mut node = Arc::clone(head);

        while let Some(link) = node.best_link() {
            popped.push(link.subtree.clone());
            if !link.is_extra {
                trees += 1;
            }
            let below = Arc::clone(&link.node);
            node = below;

            if trees > 0 && self.can_consume(&node, lookahead) {
                popped.reverse();
                let error = Subtree::error(popped, node.state, &node.scanner_state);
                let cost = RECOVERY_COST
                    + SKIPPED_TREE_COST * trees as u32
                    + SKIPPED_BYTE_COST * error.size() as u32;
                let state = node.state;
                return Some(PopBack {
                    head: node.push(error, true, state),
                    cost,
                    trees,
                });
            }
        }
        None
    }

    /// Consumes the lookahead into an `ERROR` node, extending the one on top
    /// of the stack if there is one.
    fn skip(&self, head: &Arc<StackNode>, token: &Token) -> Arc<StackNode> {
        let table = self.table;
        let leaf = Subtree::leaf(table, token, head.state, &head.scanner_state);

        if let [link] = head.links.as_slice()
            && link.is_extra
            && link.subtree.is_error()
            && !link.subtree.is_leaf()
            && link.node.state == head.state
        {
            let mut children = link.subtree.children().to_vec();
            children.push(leaf);
            let error =
                Subtree::error(children, link.subtree.parse_state(), &link.node.scanner_state);
            return link.node.push(error, true, head.state);
        }

        if token.symbol.is_error() {
            return head.push(leaf.into_extra(), true, head.state);
        }
        let error = Subtree::error(vec![leaf], head.state, &head.scanner_state);
        head.push(error, true, head.state)
    }

    /// Applies reductions on `symbol` until a shift is available. Returns the
    /// reduced head and the state the shift leads to.
    fn simulate_shift(
        &self,
        head: &Arc<StackNode>,
        symbol: Symbol,
    ) -> Option<(Arc<StackNode>, StateId)> {
        let mut head = Arc::clone(head);
        for _ in 0..MAX_SIMULATED_REDUCTIONS {
            let mut reduce = None;
            for action in self.table.actions(head.state, symbol) {
                match *action {
                    ParseAction::Shift(next) => return Some((head, next)),
                    ParseAction::Reduce(production) => {
                        reduce.get_or_insert(production);
                    }
                    ParseAction::Accept => {}
                }
            }
            head = self.reduce(&head, reduce?, false).into_iter().next()?;
        }
        None
    }

    /// Whether `symbol` can be shifted or accepted from `head` after
    /// reductions.
    fn can_consume(&self, head: &Arc<StackNode>, symbol: Symbol) -> bool {
        let mut head = Arc::clone(head);
        for _ in 0..MAX_SIMULATED_REDUCTIONS {
            let mut reduce = None;
            for action in self.table.actions(head.state, symbol) {
                match *action {
                    ParseAction::Shift(_) | ParseAction::Accept => return true,
                    ParseAction::Reduce(production) => {
                        reduce.get_or_insert(production);
                    }
                }
            }
            let Some(production) = reduce else {
                return false;
            };
            match self.reduce(&head, production, false).into_iter().next() {
                Some(next) => head = next,
                None => return false,
            }
        }
        false
    }
}
