//! Patterns with names resolved against a language.

use sapwood_runtime::{FieldId, Node, Symbol};

pub(crate) use crate::ast::Quantifier;
use crate::predicate::Predicate;

/// Index into the query's capture names.
pub(crate) type CaptureId = usize;

#[derive(Debug)]
pub(crate) struct Pattern {
    pub root: Step,
    pub predicates: Vec<Predicate>,
    pub start_byte: usize,
}

#[derive(Debug)]
pub(crate) struct Step {
    pub field: Option<FieldId>,
    pub expr: Expr,
    pub quantifier: Quantifier,
    pub captures: Vec<CaptureId>,
}

#[derive(Debug)]
pub(crate) enum Expr {
    Node(NodeTest),
    Alt(Vec<Step>),
    /// Consecutive siblings, starting at the matched position.
    Group(Vec<Item>),
}

#[derive(Debug)]
pub(crate) struct NodeTest {
    pub kind: KindTest,
    pub negated: Vec<FieldId>,
    pub children: Vec<Item>,
}

impl NodeTest {
    pub fn leaf(kind: KindTest) -> Self {
        Self {
            kind,
            negated: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindTest {
    /// `_`
    Any,
    /// `(_)`
    AnyNamed,
    Symbol(Symbol),
    Error,
    Missing(Option<Symbol>),
}

impl KindTest {
    pub fn accepts(self, node: Node<'_>) -> bool {
        match self {
            KindTest::Any => true,
            KindTest::AnyNamed => node.is_named(),
            KindTest::Symbol(symbol) => node.symbol() == symbol,
            KindTest::Error => node.is_error(),
            KindTest::Missing(None) => node.is_missing(),
            KindTest::Missing(Some(symbol)) => node.is_missing() && node.symbol() == symbol,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Item {
    Step(Step),
    Anchor,
}
