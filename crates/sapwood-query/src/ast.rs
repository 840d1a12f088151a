//! Parsed query patterns, before names are resolved against a language.

use std::ops::Range;

/// A name or literal with the source range it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub text: String,
    pub range: Range<usize>,
}

/// One top-level pattern and the predicates written anywhere inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub root: Step,
    pub predicates: Vec<PredicateCall>,
    pub range: Range<usize>,
}

/// A pattern in a position where it consumes nodes, with what surrounds it:
/// `field: (expr)+ @a @b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub field: Option<Name>,
    pub expr: Expr,
    pub quantifier: Quantifier,
    pub captures: Vec<Name>,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `(kind ...)`, `(_ ...)`, `(ERROR)`, `(MISSING ...)`
    Node(NodeExpr),
    /// `"text"`
    Anonymous(Name),
    /// `_`
    Wildcard,
    /// `[a b c]`
    Alt(Vec<Step>),
    /// `((a) (b))`
    Group(Vec<Item>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeExpr {
    pub kind: NodeKind,
    pub children: Vec<Item>,
    /// `!field`
    pub negated: Vec<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Named(Name),
    /// `(_)`
    AnyNamed,
    Error,
    /// `(MISSING)`, `(MISSING kind)`, `(MISSING "text")`; the flag is `true`
    /// for named kinds.
    Missing(Option<(Name, bool)>),
}

/// An entry of a child or sibling list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Step(Step),
    Anchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantifier {
    #[default]
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Quantifier {
    pub fn min(self) -> usize {
        match self {
            Quantifier::One | Quantifier::OneOrMore => 1,
            Quantifier::ZeroOrOne | Quantifier::ZeroOrMore => 0,
        }
    }

    /// Whether more than one match is allowed.
    pub fn repeats(self) -> bool {
        matches!(self, Quantifier::ZeroOrMore | Quantifier::OneOrMore)
    }
}

/// `(#name? args...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateCall {
    pub name: Name,
    pub args: Vec<PredicateArg>,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateArg {
    Capture(Name),
    Str(Name),
}

impl PredicateArg {
    pub fn range(&self) -> Range<usize> {
        match self {
            PredicateArg::Capture(name) | PredicateArg::Str(name) => name.range.clone(),
        }
    }
}
