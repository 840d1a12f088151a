//! GLR parser engine.
//!
//! The parser keeps a list of stack versions over a shared graph-structured
//! stack. Each step advances the active version with the smallest position
//! by one token: conflicts fork new versions, versions that reach the same
//! state at the same position are merged, and versions without an action
//! are dropped while another one can proceed. When none can, error recovery
//! picks the cheapest way to continue, so every input produces a tree.
//!
//! Given the previous tree (already edited), unchanged subtrees are taken
//! over whole instead of being re-lexed and re-reduced.

mod options;
mod recover;
mod reuse;

use std::cmp::Reverse;
use std::sync::Arc;

use sapwood_core::InputEdit;
use sapwood_table::{ParseAction, StateId, Symbol, Table};

pub use options::{ParseOptions, ParseStats};

use crate::language::Language;
use crate::lexer::{Lexer, Token};
use crate::scanner::ScannerState;
use crate::stack::StackNode;
use crate::subtree::{NodeSpec, Subtree, SubtreeFlags, select_tree};
use crate::trace::{NoopTracer, Tracer};
use crate::tree::Tree;
use reuse::ReusableNode;

/// Live stack versions kept after each step.
const MAX_VERSIONS: usize = 6;

/// Reductions a version may perform without shifting before it is treated
/// as stuck.
const MAX_REDUCTIONS_PER_POSITION: u32 = 4096;

/// Result of a parse pass.
#[derive(Debug)]
pub enum ParseOutcome {
    Complete(Tree),
    /// A limit in [`ParseOptions`] stopped the pass. The tree covers the
    /// consumed prefix.
    Cancelled(Tree),
}

impl ParseOutcome {
    pub fn tree(&self) -> &Tree {
        match self {
            ParseOutcome::Complete(tree) | ParseOutcome::Cancelled(tree) => tree,
        }
    }

    pub fn into_tree(self) -> Tree {
        match self {
            ParseOutcome::Complete(tree) | ParseOutcome::Cancelled(tree) => tree,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete(_))
    }
}

/// Parses text in one language. Reusable across documents and versions.
#[derive(Debug)]
pub struct Parser {
    language: Language,
    options: ParseOptions,
    stats: ParseStats,
}

impl Parser {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            options: ParseOptions::default(),
            stats: ParseStats::default(),
        }
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_options(&mut self, options: ParseOptions) {
        self.options = options;
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Counters of the last pass.
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Parses `text`. With `old_tree` (edited to match `text`), unchanged
    /// parts of it are reused.
    pub fn parse(&mut self, text: impl AsRef<[u8]>, old_tree: Option<&Tree>) -> ParseOutcome {
        self.parse_with(text, old_tree, &mut NoopTracer)
    }

    /// [`Parser::parse`] reporting every step to `tracer`.
    pub fn parse_with<T: Tracer>(
        &mut self,
        text: impl AsRef<[u8]>,
        old_tree: Option<&Tree>,
        tracer: &mut T,
    ) -> ParseOutcome {
        let text = text.as_ref();
        let reusable = old_tree
            .filter(|tree| tree.language().same_as(&self.language))
            .map(|tree| ReusableNode::new(tree.root_subtree()));

        let run = ParseRun::new(&self.language, text, &self.options, reusable, tracer);
        let (root, complete, stats) = run.run();
        self.stats = stats;

        tracing::debug!(
            len = text.len(),
            lexed = stats.lexed_tokens,
            reused = stats.reused_subtrees,
            reused_bytes = stats.reused_bytes,
            max_versions = stats.max_versions,
            recoveries = stats.recoveries,
            complete,
            "parse finished"
        );

        let tree = Tree::new(root, self.language.clone());
        if complete {
            ParseOutcome::Complete(tree)
        } else {
            ParseOutcome::Cancelled(tree)
        }
    }

    /// Applies `edit` to `old_tree` and parses the new text, reusing what the
    /// edit left untouched.
    pub fn reparse(
        &mut self,
        old_tree: &Tree,
        edit: &InputEdit,
        text: impl AsRef<[u8]>,
    ) -> ParseOutcome {
        let edited = old_tree.edit(edit);
        self.parse(text, Some(&edited))
    }
}

#[derive(Clone, Debug)]
enum Status {
    Active,
    /// No action for this lookahead; waiting for error recovery.
    Paused(Token),
    /// Accepted; removed on the next condense.
    Finished,
}

#[derive(Clone, Debug)]
struct Version {
    head: Arc<StackNode>,
    status: Status,
    /// Positions where MISSING insertion and pop-back were last tried.
    missing_at: Option<usize>,
    popped_at: Option<usize>,
    reductions: u32,
}

impl Version {
    fn is_active(&self) -> bool {
        matches!(self.status, Status::Active)
    }
}

enum Lookahead {
    Token(Token),
    /// A subtree of the old tree and the state after it.
    Reused(Subtree, StateId),
}

struct CachedToken {
    position: usize,
    lex_mode: u16,
    scanner_state: ScannerState,
    token: Token,
}

struct ParseRun<'a, T: Tracer> {
    table: &'a Table,
    text: &'a [u8],
    lexer: Lexer<'a>,
    options: &'a ParseOptions,
    tracer: &'a mut T,
    versions: Vec<Version>,
    reusable: Option<ReusableNode>,
    cached: Option<CachedToken>,
    finished: Option<Subtree>,
    stats: ParseStats,
}

impl<'a, T: Tracer> ParseRun<'a, T> {
    fn new(
        language: &'a Language,
        text: &'a [u8],
        options: &'a ParseOptions,
        reusable: Option<ReusableNode>,
        tracer: &'a mut T,
    ) -> Self {
        let table = language.table();
        Self {
            table,
            text,
            lexer: Lexer::new(language, text),
            options,
            tracer,
            versions: vec![Version {
                head: StackNode::bottom(table.start_state()),
                status: Status::Active,
                missing_at: None,
                popped_at: None,
                reductions: 0,
            }],
            reusable,
            cached: None,
            finished: None,
            stats: ParseStats {
                max_versions: 1,
                ..ParseStats::default()
            },
        }
    }

    /// Returns the root, whether the pass completed, and the counters.
    fn run(mut self) -> (Subtree, bool, ParseStats) {
        while !self.versions.is_empty() {
            if self.options.should_stop(self.stats.lexed_tokens) {
                if let Some(root) = self.finished.take() {
                    return (root, true, self.stats);
                }
                let root = self.partial_root();
                return (root, false, self.stats);
            }

            match self.next_active() {
                Some(index) => self.advance(index),
                None => self.recover(),
            }
            self.condense();
        }

        let root = match self.finished.take() {
            Some(root) => root,
            None => self.skipped_root(),
        };
        (root, true, self.stats)
    }

    /// Active version with the smallest position, earliest on ties.
    fn next_active(&self) -> Option<usize> {
        self.versions
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active())
            .min_by_key(|(i, v)| (v.head.position, *i))
            .map(|(i, _)| i)
    }

    /// Runs one version until it shifts, accepts or gets stuck.
    fn advance(&mut self, index: usize) {
        let table = self.table;
        loop {
            let head = Arc::clone(&self.versions[index].head);
            let state = head.state;

            let token = match self.lookahead(&head) {
                Lookahead::Reused(subtree, next) => {
                    self.push_reused(index, subtree, next);
                    return;
                }
                Lookahead::Token(token) => token,
            };

            if token.symbol.is_error() {
                self.pause(index, token);
                return;
            }

            let actions = table.actions(state, token.symbol);
            if actions.is_empty() {
                if !token.symbol.is_end() && table.is_extra(token.symbol) {
                    self.shift(index, state, token, true);
                } else {
                    self.pause(index, token);
                }
                return;
            }

            let mut shift = None;
            let mut reduces = Vec::new();
            let mut accept = false;
            for action in actions {
                match *action {
                    ParseAction::Shift(next) => shift = Some(next),
                    ParseAction::Reduce(production) => reduces.push(production),
                    ParseAction::Accept => accept = true,
                }
            }

            if accept {
                self.accept(index, &token);
                return;
            }
            if let Some(next) = shift {
                for &production in &reduces {
                    self.fork(index, production);
                }
                self.shift(index, next, token, false);
                return;
            }

            let Some((&first, rest)) = reduces.split_first() else {
                self.pause(index, token);
                return;
            };
            for &production in rest {
                self.fork(index, production);
            }

            let version = &mut self.versions[index];
            version.reductions += 1;
            if version.reductions > MAX_REDUCTIONS_PER_POSITION {
                tracing::debug!(position = head.position, "reduction budget exhausted");
                self.pause(index, token);
                return;
            }

            let fragile = self.versions.len() > 1;
            let mut heads = self.reduce(&head, first, fragile);
            if heads.is_empty() {
                self.pause(index, token);
                return;
            }
            self.trace_reduce(index, first);
            let head = heads.remove(0);
            for other in heads {
                self.spawn(index, other);
            }
            self.versions[index].head = head;
        }
    }

    // ===== Lookahead

    fn lookahead(&mut self, head: &Arc<StackNode>) -> Lookahead {
        let position = head.position;
        let lex_mode = self.table.lex_mode_id(head.state);
        let single = self.versions.len() == 1;

        if single && let Some((subtree, next)) = self.reuse_node(head) {
            return Lookahead::Reused(subtree, next);
        }

        if let Some(cached) = &self.cached
            && cached.position == position
            && (cached.lex_mode == lex_mode || self.is_bare_end(&cached.token, lex_mode))
            && cached.scanner_state == head.scanner_state
        {
            return Lookahead::Token(cached.token.clone());
        }

        let reused = if single {
            self.reuse_leaf(position, lex_mode, &head.scanner_state)
        } else {
            None
        };
        let token = match reused {
            Some(token) => token,
            None => {
                let token = self.lexer.lex(position, lex_mode, &head.scanner_state);
                self.stats.lexed_tokens += 1;
                self.tracer
                    .trace_lex(position + token.padding, token.symbol, token.size);
                token
            }
        };

        self.cached = Some(CachedToken {
            position,
            lex_mode,
            scanner_state: head.scanner_state.clone(),
            token: token.clone(),
        });
        Lookahead::Token(token)
    }

    /// End of input with nothing before it lexes the same in every mode
    /// without external tokens.
    fn is_bare_end(&self, token: &Token, lex_mode: u16) -> bool {
        token.symbol.is_end() && token.padding == 0 && !self.table.lex_mode(lex_mode).has_externals
    }

    /// Moves the reuse cursor to the first subtree at `position` that passes
    /// the state-independent checks.
    fn reuse_candidate(
        &mut self,
        position: usize,
        scanner_state: &ScannerState,
    ) -> Option<Subtree> {
        let cursor = self.reusable.as_mut()?;
        loop {
            let (tree, start) = cursor.current()?;
            let end = start + tree.total_len();
            if start > position {
                return None;
            }
            if end <= position {
                cursor.advance();
                continue;
            }
            let usable = start == position
                && tree.size() > 0
                && !tree.has_changes()
                && !tree.has_error()
                && !tree.is_fragile()
                && tree.scanner_before() == scanner_state;
            if usable {
                return Some(tree.clone());
            }
            if !cursor.descend() {
                cursor.advance();
            }
        }
    }

    fn reuse_node(&mut self, head: &Arc<StackNode>) -> Option<(Subtree, StateId)> {
        loop {
            let tree = self.reuse_candidate(head.position, &head.scanner_state)?;
            if tree.is_leaf() {
                return None;
            }
            let cursor = self.reusable.as_mut()?;
            let next = self.table.goto(head.state, tree.symbol());
            if tree.parse_state() == head.state
                && let Some(next) = next
                && cursor.following_tokens_unchanged()
            {
                cursor.advance();
                return Some((tree, next));
            }
            cursor.descend();
        }
    }

    fn reuse_leaf(
        &mut self,
        position: usize,
        lex_mode: u16,
        scanner_state: &ScannerState,
    ) -> Option<Token> {
        let tree = self.reuse_candidate(position, scanner_state)?;
        if !tree.is_leaf() || tree.lex_mode() != lex_mode {
            return None;
        }
        self.stats.reused_subtrees += 1;
        self.stats.reused_bytes += tree.total_len();
        self.tracer
            .trace_reuse(position, tree.symbol(), tree.total_len());

        let external = tree.flags().contains(SubtreeFlags::HAS_EXTERNAL);
        Some(Token {
            symbol: tree.symbol(),
            padding: tree.padding(),
            size: tree.size(),
            lookahead_bytes: tree.lookahead_bytes(),
            lex_mode,
            scanner_state: external.then(|| tree.scanner_after().clone()),
        })
    }

    // ===== Actions

    fn shift(&mut self, index: usize, next: StateId, token: Token, extra: bool) {
        let table = self.table;
        let version = &mut self.versions[index];
        let head = &version.head;
        let mut leaf = Subtree::leaf(table, &token, head.state, &head.scanner_state);
        if extra {
            leaf = leaf.into_extra();
        }
        version.head = head.push(leaf, extra, next);
        version.reductions = 0;
        self.tracer.trace_shift(index, next, token.symbol);
    }

    fn push_reused(&mut self, index: usize, subtree: Subtree, next: StateId) {
        let version = &mut self.versions[index];
        let position = version.head.position;
        self.stats.reused_subtrees += 1;
        self.stats.reused_bytes += subtree.total_len();
        self.tracer
            .trace_reuse(position, subtree.symbol(), subtree.total_len());
        version.head = version.head.push(subtree, false, next);
        version.reductions = 0;
    }

    /// Reduces `production` on `head` along every path, returning the new
    /// heads. Trailing extras are pushed back above the new node.
    fn reduce(&self, head: &Arc<StackNode>, production: u16, fragile: bool) -> Vec<Arc<StackNode>> {
        let table = self.table;
        let production = table.production(production);
        let paths = head.pop(production.child_count as usize);
        let fragile = fragile || paths.len() > 1;

        let mut heads = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(next) = table.goto(path.base.state, production.lhs) else {
                continue;
            };
            let mut subtrees = path.subtrees;
            let split = subtrees
                .iter()
                .rposition(|(_, extra)| !extra)
                .map_or(0, |i| i + 1);
            let trailing = subtrees.split_off(split);

            let mut fields = Vec::with_capacity(subtrees.len());
            let mut child = 0;
            for (_, extra) in &subtrees {
                if *extra {
                    fields.push(None);
                } else {
                    fields.push(production.fields.get(child).copied().flatten());
                    child += 1;
                }
            }

            let node = Subtree::node(
                table,
                NodeSpec {
                    symbol: production.lhs,
                    children: subtrees.into_iter().map(|(tree, _)| tree).collect(),
                    fields,
                    parse_state: path.base.state,
                    dynamic_precedence: production.dynamic_precedence,
                    fragile,
                    scanner_state: &path.base.scanner_state,
                },
            );
            let mut new_head = path.base.push(node, false, next);
            for (extra, _) in trailing {
                new_head = new_head.push(extra, true, next);
            }
            heads.push(new_head);
        }
        heads
    }

    /// Reduces on a copy of version `index`, leaving the original in place.
    fn fork(&mut self, index: usize, production: u16) {
        let head = Arc::clone(&self.versions[index].head);
        for new_head in self.reduce(&head, production, true) {
            let new_index = self.spawn(index, new_head);
            self.trace_reduce(new_index, production);
        }
    }

    fn spawn(&mut self, index: usize, head: Arc<StackNode>) -> usize {
        let mut version = self.versions[index].clone();
        version.head = head;
        version.status = Status::Active;
        version.reductions += 1;
        self.versions.push(version);
        let new_index = self.versions.len() - 1;
        self.tracer.trace_fork(index, new_index);
        new_index
    }

    fn pause(&mut self, index: usize, token: Token) {
        self.versions[index].status = Status::Paused(token);
    }

    fn accept(&mut self, index: usize, token: &Token) {
        let head = Arc::clone(&self.versions[index].head);
        self.versions[index].status = Status::Finished;
        let root = self.accepted_root(&head, token);
        self.tracer.trace_accept(root.error_cost());
        self.finish(root);
    }

    /// Keeps the better of the current and a newly finished tree.
    fn finish(&mut self, root: Subtree) {
        self.finished = match self.finished.take() {
            Some(previous) if !select_tree(&previous, &root) => Some(previous),
            _ => Some(root),
        };
    }

    fn trace_reduce(&mut self, index: usize, production: u16) {
        let production = self.table.production(production);
        self.tracer
            .trace_reduce(index, production.lhs, production.child_count as usize);
    }

    // ===== Versions

    /// Drops finished and stuck versions, merges equivalent heads and
    /// enforces the version cap.
    fn condense(&mut self) {
        self.versions
            .retain(|v| !matches!(v.status, Status::Finished));
        if self.versions.iter().any(Version::is_active) {
            self.versions.retain(Version::is_active);
        }
        if let Some(finished) = &self.finished {
            let cost = finished.error_cost();
            self.versions.retain(|v| v.head.error_cost <= cost);
        }

        let mut i = 0;
        while i < self.versions.len() {
            let mut j = i + 1;
            while j < self.versions.len() {
                let (left, right) = (&self.versions[i], &self.versions[j]);
                if left.is_active()
                    && right.is_active()
                    && StackNode::mergeable(&left.head, &right.head)
                {
                    let merged = StackNode::merge(&left.head, &right.head);
                    self.versions.remove(j);
                    self.versions[i].head = merged;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }

        if self.versions.len() > MAX_VERSIONS {
            self.versions
                .sort_by_key(|v| (v.head.error_cost, Reverse(v.head.dynamic_precedence)));
            self.versions.truncate(MAX_VERSIONS);
        }

        self.stats.max_versions = self.stats.max_versions.max(self.versions.len());
        self.tracer.trace_versions(self.versions.len());
    }

    // ===== Roots

    /// Root for an accepting stack: the start node with surrounding extras
    /// and error nodes folded into its children.
    fn accepted_root(&self, head: &Arc<StackNode>, token: &Token) -> Subtree {
        let table = self.table;
        let start_symbol = table.start_symbol();
        let mut children = Vec::new();
        let mut fields = Vec::new();
        let mut dynamic_precedence = 0;
        let mut found = false;

        for (tree, extra) in head.pop_all() {
            if !found && !extra && tree.symbol() == start_symbol {
                found = true;
                let inner: i32 = tree.children().iter().map(Subtree::dynamic_precedence).sum();
                dynamic_precedence = tree.dynamic_precedence() - inner;
                children.extend(tree.children().iter().cloned());
                fields.extend(tree.fields().iter().copied());
            } else {
                children.push(tree);
                fields.push(None);
            }
        }
        children.push(Subtree::leaf(table, token, head.state, &head.scanner_state));
        fields.push(None);

        let symbol = if found { start_symbol } else { Symbol::ERROR };
        Subtree::root(
            table,
            NodeSpec {
                symbol,
                children,
                fields,
                parse_state: table.start_state(),
                dynamic_precedence,
                fragile: false,
                scanner_state: &head.scanner_state,
            },
            !found,
        )
    }

    /// `ERROR` root over a whole stack, optionally closed by `token`.
    fn error_root(&self, head: &Arc<StackNode>, token: Option<&Token>) -> Subtree {
        let table = self.table;
        let mut children: Vec<Subtree> = head.pop_all().into_iter().map(|(tree, _)| tree).collect();
        if let Some(token) = token {
            children.push(Subtree::leaf(table, token, head.state, &head.scanner_state));
        }
        Subtree::root(
            table,
            NodeSpec {
                symbol: Symbol::ERROR,
                children,
                fields: Vec::new(),
                parse_state: table.start_state(),
                dynamic_precedence: 0,
                fragile: false,
                scanner_state: &head.scanner_state,
            },
            true,
        )
    }

    /// Tree for a cancelled pass: the most advanced version's stack.
    fn partial_root(&self) -> Subtree {
        let head = self
            .versions
            .iter()
            .max_by_key(|v| (v.head.position, Reverse(v.head.error_cost)))
            .map(|v| Arc::clone(&v.head))
            .unwrap_or_else(|| StackNode::bottom(self.table.start_state()));
        self.error_root(&head, None)
    }

    /// Last resort when no version survived: the whole text as one error.
    fn skipped_root(&self) -> Subtree {
        let token = Token {
            symbol: Symbol::ERROR,
            padding: 0,
            size: self.text.len(),
            lookahead_bytes: 0,
            lex_mode: 0,
            scanner_state: None,
        };
        self.error_root(&StackNode::bottom(self.table.start_state()), Some(&token))
    }
}
