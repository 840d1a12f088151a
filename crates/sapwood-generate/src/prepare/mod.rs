//! Grammar preparation: interning, validation, token extraction and
//! flattening into productions.
//!
//! ```text
//! Grammar ──intern──▶ RuleTable ──validate──▶ PrecedenceOrder
//!                          │
//!                       extract ──▶ ExtractedGrammar ──flatten──▶ FlatGrammar
//! ```

mod extract;
mod flatten;
mod intern;
mod precedence;
mod validate;

#[cfg(test)]
mod extract_tests;
#[cfg(test)]
mod flatten_tests;

pub use extract::extract;
pub use flatten::{FlatGrammar, FlatProduction, flatten};
pub use intern::RuleTable;
pub use precedence::{Assoc, PrecLevel, PrecedenceOrder};
pub use validate::validate;

use sapwood_core::Grammar;

use crate::error::Result;

/// Reference from a syntactic expression to a grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sym {
    /// Index into `ExtractedGrammar::lexical`.
    Lexical(usize),
    /// Index into `ExtractedGrammar::externals`.
    External(usize),
    /// Index into `ExtractedGrammar::rules`.
    Rule(usize),
}

/// Syntactic rule body with tokens replaced by terminal references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Blank,
    Sym(Sym),
    Seq(Vec<Expr>),
    Choice(Vec<Expr>),
    Repeat(Box<Expr>),
    Repeat1(Box<Expr>),
    Field(String, Box<Expr>),
    Prec(PrecLevel, Option<Assoc>, Box<Expr>),
    Dynamic(i32, Box<Expr>),
}

/// A terminal recognized by the lexical DFA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalTerminal {
    pub name: String,
    pub regex: String,
    /// Decoded text for string terminals.
    pub literal: Option<String>,
    pub named: bool,
    pub visible: bool,
    pub immediate: bool,
    pub precedence: i32,
    pub is_keyword: bool,
    pub extra: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTerminal {
    pub name: String,
    pub named: bool,
    pub visible: bool,
    pub extra: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntacticRule {
    pub name: String,
    pub body: Expr,
    pub visible: bool,
    pub supertype: bool,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedGrammar {
    pub name: String,
    pub lexical: Vec<LexicalTerminal>,
    pub externals: Vec<ExternalTerminal>,
    /// The start rule is always first.
    pub rules: Vec<SyntacticRule>,
    /// Terminal extras, lexical or external.
    pub extras: Vec<Sym>,
    /// Lexical index of the word token.
    pub word: Option<usize>,
    /// `@conflicts` sets by rule name.
    pub conflicts: Vec<Vec<String>>,
}

/// Runs interning, validation and extraction.
pub fn prepare(grammar: &Grammar) -> Result<(ExtractedGrammar, PrecedenceOrder)> {
    let table = RuleTable::new(grammar)?;
    let order = validate(grammar, &table)?;
    let extracted = extract(grammar, &table, &order)?;
    tracing::debug!(
        rules = extracted.rules.len(),
        tokens = extracted.lexical.len(),
        externals = extracted.externals.len(),
        "grammar prepared"
    );
    Ok((extracted, order))
}
