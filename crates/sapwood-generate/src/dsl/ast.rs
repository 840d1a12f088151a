//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and exposes typed accessors. Casting only
//! checks the node kind; malformed children surface as `None`.

use rowan::TextRange;

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }

            pub fn text_range(&self) -> TextRange {
                self.0.text_range()
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(RuleDef, Rule);
ast_node!(Directive, Directive);
ast_node!(Alt, Alt);
ast_node!(Seq, Seq);
ast_node!(Quantified, Quantified);
ast_node!(Field, Field);
ast_node!(Call, Call);
ast_node!(Group, Group);
ast_node!(SymbolRef, SymbolRef);
ast_node!(StrLit, StrLit);
ast_node!(RegexLit, RegexLit);
ast_node!(IntLit, IntLit);
ast_node!(ConflictSet, ConflictSet);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierKind {
    Optional,
    ZeroOrMore,
    OneOrMore,
}

/// Anything that can appear on the right of `=`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Alt(Alt),
    Seq(Seq),
    Quantified(Quantified),
    Field(Field),
    Call(Call),
    Group(Group),
    SymbolRef(SymbolRef),
    StrLit(StrLit),
    RegexLit(RegexLit),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Alt => Alt::cast(node).map(Expr::Alt),
            SyntaxKind::Seq => Seq::cast(node).map(Expr::Seq),
            SyntaxKind::Quantified => Quantified::cast(node).map(Expr::Quantified),
            SyntaxKind::Field => Field::cast(node).map(Expr::Field),
            SyntaxKind::Call => Call::cast(node).map(Expr::Call),
            SyntaxKind::Group => Group::cast(node).map(Expr::Group),
            SyntaxKind::SymbolRef => SymbolRef::cast(node).map(Expr::SymbolRef),
            SyntaxKind::StrLit => StrLit::cast(node).map(Expr::StrLit),
            SyntaxKind::RegexLit => RegexLit::cast(node).map(Expr::RegexLit),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Expr::Alt(n) => n.as_cst(),
            Expr::Seq(n) => n.as_cst(),
            Expr::Quantified(n) => n.as_cst(),
            Expr::Field(n) => n.as_cst(),
            Expr::Call(n) => n.as_cst(),
            Expr::Group(n) => n.as_cst(),
            Expr::SymbolRef(n) => n.as_cst(),
            Expr::StrLit(n) => n.as_cst(),
            Expr::RegexLit(n) => n.as_cst(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        self.as_cst().text_range()
    }
}

/// Call argument: an integer literal or an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    Int(IntLit),
    Expr(Expr),
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn exprs(node: &SyntaxNode) -> impl Iterator<Item = Expr> + '_ {
    node.children().filter_map(Expr::cast)
}

impl Root {
    pub fn rules(&self) -> impl Iterator<Item = RuleDef> + '_ {
        self.0.children().filter_map(RuleDef::cast)
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + '_ {
        self.0.children().filter_map(Directive::cast)
    }
}

impl RuleDef {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }

    pub fn body(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }
}

impl Directive {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }

    pub fn values(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }

    pub fn sets(&self) -> impl Iterator<Item = ConflictSet> + '_ {
        self.0.children().filter_map(ConflictSet::cast)
    }
}

impl Alt {
    pub fn branches(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }
}

impl Seq {
    pub fn items(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }
}

impl Quantified {
    pub fn inner(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }

    pub fn kind(&self) -> Option<QuantifierKind> {
        // The outermost operator is the last direct token child.
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter_map(|t| match t.kind() {
                SyntaxKind::Question => Some(QuantifierKind::Optional),
                SyntaxKind::Star => Some(QuantifierKind::ZeroOrMore),
                SyntaxKind::Plus => Some(QuantifierKind::OneOrMore),
                _ => None,
            })
            .last()
    }
}

impl Field {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }

    pub fn value(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }
}

impl Call {
    /// Dotted callee, e.g. `prec.left`.
    pub fn callee(&self) -> String {
        let mut parts = self
            .0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .take_while(|t| t.kind() != SyntaxKind::ParenOpen)
            .filter(|t| t.kind() == SyntaxKind::Id)
            .map(|t| t.text().to_string());
        let mut name = parts.next().unwrap_or_default();
        for part in parts {
            name.push('.');
            name.push_str(&part);
        }
        name
    }

    pub fn args(&self) -> impl Iterator<Item = Arg> + '_ {
        self.0.children().filter_map(|node| match node.kind() {
            SyntaxKind::IntLit => IntLit::cast(node).map(Arg::Int),
            _ => Expr::cast(node).map(Arg::Expr),
        })
    }
}

impl Group {
    pub fn inner(&self) -> Option<Expr> {
        exprs(&self.0).next()
    }
}

impl SymbolRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Id)
    }
}

impl StrLit {
    /// Raw token text including quotes.
    pub fn raw(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Str)
    }
}

impl RegexLit {
    /// Pattern body between the slashes.
    pub fn pattern(&self) -> Option<String> {
        let tok = token(&self.0, SyntaxKind::Regex)?;
        let text = tok.text();
        Some(text[1..text.len() - 1].to_string())
    }
}

impl IntLit {
    pub fn value(&self) -> Option<i32> {
        token(&self.0, SyntaxKind::Integer)?.text().parse().ok()
    }
}

impl ConflictSet {
    pub fn members(&self) -> impl Iterator<Item = Expr> + '_ {
        exprs(&self.0)
    }
}
