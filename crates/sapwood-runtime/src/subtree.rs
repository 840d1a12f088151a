//! Immutable, reference-counted syntax nodes.
//!
//! A subtree stores only relative lengths: `padding` (bytes of anonymous
//! extras before it) and `size`. Absolute positions are computed while
//! walking from the root, which is what lets an edited tree share every
//! subtree the edit did not touch.

use std::cmp::Ordering;
use std::sync::Arc;

use bitflags::bitflags;
use sapwood_table::{FieldId, StateId, Symbol, Table};

use crate::lexer::Token;
use crate::scanner::ScannerState;

/// Fixed cost of one error-recovery action.
pub(crate) const RECOVERY_COST: u32 = 500;
/// Cost of an inserted zero-width token.
pub(crate) const MISSING_COST: u32 = 110;
/// Cost per subtree swallowed by an `ERROR` node.
pub(crate) const SKIPPED_TREE_COST: u32 = 100;
/// Cost per byte swallowed by an `ERROR` node.
pub(crate) const SKIPPED_BYTE_COST: u32 = 1;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct SubtreeFlags: u16 {
        const VISIBLE = 1 << 0;
        const NAMED = 1 << 1;
        const EXTRA = 1 << 2;
        /// Zero-width token inserted by error recovery.
        const MISSING = 1 << 3;
        /// An `ERROR` node or unrecognized-byte token.
        const ERROR = 1 << 4;
        /// Self or any descendant is an error or missing.
        const HAS_ERROR = 1 << 5;
        /// Built while more than one stack version was alive.
        const FRAGILE = 1 << 6;
        /// Touched by an edit since it was parsed.
        const HAS_CHANGES = 1 << 7;
        /// Contains a token produced by an external scanner.
        const HAS_EXTERNAL = 1 << 8;
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SubtreeData {
    pub symbol: Symbol,
    pub padding: usize,
    pub size: usize,
    pub lookahead_bytes: usize,
    pub flags: SubtreeFlags,
    /// State the parser was in when the subtree's first token was shifted.
    pub parse_state: StateId,
    pub lex_mode: u16,
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    pub children: Vec<Subtree>,
    /// Parallel to `children`.
    pub fields: Vec<Option<FieldId>>,
    /// Scanner state in effect before the first token.
    pub scanner_before: ScannerState,
    /// Scanner state after the last token.
    pub scanner_after: ScannerState,
}

#[derive(Clone, Debug)]
pub(crate) struct Subtree(Arc<SubtreeData>);

/// Inputs for an internal node; lengths and flags are summarized from the
/// children.
pub(crate) struct NodeSpec<'a> {
    pub symbol: Symbol,
    pub children: Vec<Subtree>,
    pub fields: Vec<Option<FieldId>>,
    pub parse_state: StateId,
    pub dynamic_precedence: i32,
    pub fragile: bool,
    /// Scanner state used when there are no children.
    pub scanner_state: &'a ScannerState,
}

impl Subtree {
    pub fn leaf(
        table: &Table,
        token: &Token,
        parse_state: StateId,
        scanner_before: &ScannerState,
    ) -> Self {
        let mut flags = symbol_flags(table, token.symbol);
        let mut error_cost = 0;
        if token.symbol.is_error() {
            flags |= SubtreeFlags::ERROR | SubtreeFlags::HAS_ERROR;
            error_cost = RECOVERY_COST + SKIPPED_TREE_COST + SKIPPED_BYTE_COST * token.size as u32;
        }
        if token.scanner_state.is_some() {
            flags |= SubtreeFlags::HAS_EXTERNAL;
        }
        let scanner_after = token
            .scanner_state
            .clone()
            .unwrap_or_else(|| scanner_before.clone());
        Self(Arc::new(SubtreeData {
            symbol: token.symbol,
            padding: token.padding,
            size: token.size,
            lookahead_bytes: token.lookahead_bytes,
            flags,
            parse_state,
            lex_mode: token.lex_mode,
            error_cost,
            dynamic_precedence: 0,
            children: Vec::new(),
            fields: Vec::new(),
            scanner_before: scanner_before.clone(),
            scanner_after,
        }))
    }

    pub fn missing(
        table: &Table,
        symbol: Symbol,
        parse_state: StateId,
        scanner: &ScannerState,
    ) -> Self {
        Self(Arc::new(SubtreeData {
            symbol,
            padding: 0,
            size: 0,
            lookahead_bytes: 0,
            flags: symbol_flags(table, symbol) | SubtreeFlags::MISSING | SubtreeFlags::HAS_ERROR,
            parse_state,
            lex_mode: table.lex_mode_id(parse_state),
            error_cost: MISSING_COST,
            dynamic_precedence: 0,
            children: Vec::new(),
            fields: Vec::new(),
            scanner_before: scanner.clone(),
            scanner_after: scanner.clone(),
        }))
    }

    pub fn node(table: &Table, spec: NodeSpec<'_>) -> Self {
        let mut flags = symbol_flags(table, spec.symbol);
        if spec.fragile {
            flags |= SubtreeFlags::FRAGILE;
        }
        let mut data = summarize(spec, flags);
        data.error_cost += data.children.iter().map(Subtree::error_cost).sum::<u32>();
        Self(Arc::new(data))
    }

    /// An `ERROR` node over skipped or popped subtrees.
    pub fn error(children: Vec<Subtree>, parse_state: StateId, scanner: &ScannerState) -> Self {
        let flags = SubtreeFlags::VISIBLE | SubtreeFlags::NAMED | SubtreeFlags::ERROR;
        let mut data = summarize(
            NodeSpec {
                symbol: Symbol::ERROR,
                children,
                fields: Vec::new(),
                parse_state,
                dynamic_precedence: 0,
                fragile: false,
                scanner_state: scanner,
            },
            flags,
        );
        let trees = data.children.iter().filter(|c| !c.is_extra()).count() as u32;
        data.flags |= SubtreeFlags::HAS_ERROR;
        data.error_cost = RECOVERY_COST
            + SKIPPED_TREE_COST * trees
            + SKIPPED_BYTE_COST * data.size as u32
            + data.children.iter().map(Subtree::error_cost).sum::<u32>();
        Self(Arc::new(data))
    }

    /// Root of a finished tree: same as [`Subtree::node`] but starting at
    /// byte 0, with leading padding counted in its size.
    pub fn root(table: &Table, spec: NodeSpec<'_>, error: bool) -> Self {
        let node = if error {
            let scanner = spec.scanner_state.clone();
            Self::error(spec.children, spec.parse_state, &scanner)
        } else {
            Self::node(table, spec)
        };
        let mut data = Arc::into_inner(node.0).expect("fresh subtree has a single owner");
        data.size += data.padding;
        data.padding = 0;
        Self(Arc::new(data))
    }

    /// Copy of a leaf marked as an extra.
    pub fn into_extra(self) -> Self {
        if self.is_extra() {
            return self;
        }
        let mut data = SubtreeData::clone(&self.0);
        data.flags |= SubtreeFlags::EXTRA;
        Self(Arc::new(data))
    }

    /// Copy with new lengths and children, marked as changed.
    pub fn edited(&self, padding: usize, size: usize, children: Vec<Subtree>) -> Self {
        let mut data = SubtreeData::clone(&self.0);
        data.padding = padding;
        data.size = size;
        data.children = children;
        data.flags |= SubtreeFlags::HAS_CHANGES;
        Self(Arc::new(data))
    }

    // ===== Accessors

    #[inline]
    pub fn symbol(&self) -> Symbol {
        self.0.symbol
    }

    #[inline]
    pub fn padding(&self) -> usize {
        self.0.padding
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.0.size
    }

    #[inline]
    pub fn total_len(&self) -> usize {
        self.0.padding + self.0.size
    }

    pub fn lookahead_bytes(&self) -> usize {
        self.0.lookahead_bytes
    }

    pub fn flags(&self) -> SubtreeFlags {
        self.0.flags
    }

    pub fn parse_state(&self) -> StateId {
        self.0.parse_state
    }

    pub fn lex_mode(&self) -> u16 {
        self.0.lex_mode
    }

    pub fn error_cost(&self) -> u32 {
        self.0.error_cost
    }

    pub fn dynamic_precedence(&self) -> i32 {
        self.0.dynamic_precedence
    }

    pub fn children(&self) -> &[Subtree] {
        &self.0.children
    }

    pub fn fields(&self) -> &[Option<FieldId>] {
        &self.0.fields
    }

    pub fn field_at(&self, index: usize) -> Option<FieldId> {
        self.0.fields.get(index).copied().flatten()
    }

    pub fn scanner_before(&self) -> &ScannerState {
        &self.0.scanner_before
    }

    pub fn scanner_after(&self) -> &ScannerState {
        &self.0.scanner_after
    }

    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::VISIBLE)
    }

    pub fn is_named(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::NAMED)
    }

    pub fn is_extra(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::EXTRA)
    }

    pub fn is_missing(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::MISSING)
    }

    pub fn is_error(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::ERROR)
    }

    pub fn has_error(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::HAS_ERROR)
    }

    pub fn is_fragile(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::FRAGILE)
    }

    pub fn has_changes(&self) -> bool {
        self.0.flags.contains(SubtreeFlags::HAS_CHANGES)
    }

    pub fn ptr_eq(&self, other: &Subtree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn data(&self) -> &SubtreeData {
        &self.0
    }
}

/// `true` when `right` should replace `left` as the interpretation of a
/// span: lower error cost, then higher dynamic precedence, then the
/// structurally smaller tree.
pub(crate) fn select_tree(left: &Subtree, right: &Subtree) -> bool {
    if left.ptr_eq(right) {
        return false;
    }
    match right.error_cost().cmp(&left.error_cost()) {
        Ordering::Less => return true,
        Ordering::Greater => return false,
        Ordering::Equal => {}
    }
    match right.dynamic_precedence().cmp(&left.dynamic_precedence()) {
        Ordering::Greater => return true,
        Ordering::Less => return false,
        Ordering::Equal => {}
    }
    compare(left, right) == Ordering::Greater
}

fn compare(left: &Subtree, right: &Subtree) -> Ordering {
    left.symbol()
        .cmp(&right.symbol())
        .then_with(|| left.children().len().cmp(&right.children().len()))
        .then_with(|| {
            left.children()
                .iter()
                .zip(right.children())
                .map(|(l, r)| compare(l, r))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

fn symbol_flags(table: &Table, symbol: Symbol) -> SubtreeFlags {
    let mut flags = SubtreeFlags::empty();
    if table.is_visible(symbol) {
        flags |= SubtreeFlags::VISIBLE;
    }
    if table.is_named(symbol) {
        flags |= SubtreeFlags::NAMED;
    }
    flags
}

fn summarize(spec: NodeSpec<'_>, mut flags: SubtreeFlags) -> SubtreeData {
    let children = spec.children;
    let padding = children.first().map_or(0, Subtree::padding);

    let mut total = 0;
    let mut reach = 0;
    let mut dynamic_precedence = spec.dynamic_precedence;
    for child in &children {
        total += child.total_len();
        reach = reach.max(total + child.lookahead_bytes());
        dynamic_precedence += child.dynamic_precedence();
        flags |= child.flags() & (SubtreeFlags::HAS_ERROR | SubtreeFlags::HAS_EXTERNAL);
        if child.is_error() || child.is_missing() {
            flags |= SubtreeFlags::HAS_ERROR;
        }
    }

    let mut fields = spec.fields;
    fields.resize(children.len(), None);

    let (scanner_before, scanner_after, lex_mode) = match (children.first(), children.last()) {
        (Some(first), Some(last)) => (
            first.scanner_before().clone(),
            last.scanner_after().clone(),
            first.lex_mode(),
        ),
        _ => (spec.scanner_state.clone(), spec.scanner_state.clone(), 0),
    };

    SubtreeData {
        symbol: spec.symbol,
        padding,
        size: total - padding,
        lookahead_bytes: reach - total,
        flags,
        parse_state: spec.parse_state,
        lex_mode,
        error_cost: 0,
        dynamic_precedence,
        children,
        fields,
        scanner_before,
        scanner_after,
    }
}
