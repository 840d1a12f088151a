//! Parser for the grammar DSL.
//!
//! ```text
//! @name = arith;
//! @extras = /\s/;
//!
//! expr = prec.left(1, expr "+" expr) | number;
//! number = /[0-9]+/;
//! ```
//!
//! The parser produces a lossless CST via Rowan's green tree builder, then
//! [`lower`] turns it into a [`Grammar`].
//!
//! - Trivia buffering: whitespace and comments attach as leading trivia
//! - Checkpoint-based wrapping: quantifiers, sequences and alternations wrap
//!   already-parsed children
//! - Recovery: a missing `;` resynchronizes at the next `;`, `@`, or `name =`
//!
//! The parser always produces a tree; problems are reported as diagnostics.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;
mod lower;

#[cfg(test)]
mod grammar_tests;
#[cfg(test)]
mod lexer_tests;

use std::fmt::Write;

use rowan::NodeOrToken;
use sapwood_core::Grammar;

pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};
pub use lower::DEFAULT_NAME;

use crate::diagnostics::Diagnostics;
use core::Parser;

/// Parse result: the green tree plus everything reported along the way.
#[derive(Debug, Clone)]
pub struct Parse {
    cst: rowan::GreenNode,
    diagnostics: Diagnostics,
}

impl Parse {
    pub fn as_cst(&self) -> &rowan::GreenNode {
        &self.cst
    }

    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.cst.clone())
    }

    pub fn root(&self) -> ast::Root {
        ast::Root::cast(self.syntax()).expect("parser always produces a Root node")
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

pub fn parse(source: &str) -> Parse {
    let mut parser = Parser::new(source, lexer::lex(source));
    parser.parse_root();
    let (cst, diagnostics) = parser.finish();
    Parse { cst, diagnostics }
}

/// Parses and lowers grammar source.
///
/// Returns every diagnostic on error. Warnings alone don't fail.
pub fn parse_grammar(source: &str) -> Result<Grammar, Diagnostics> {
    let parsed = parse(source);
    let mut diagnostics = parsed.diagnostics.clone();
    let grammar = lower::lower(&parsed.root(), &mut diagnostics);

    if diagnostics.has_errors() {
        return Err(diagnostics);
    }
    for warning in diagnostics.filtered().iter() {
        tracing::warn!(range = ?warning.range(), "{}", warning.message());
    }
    Ok(grammar)
}

/// Indented dump of the CST, one node or token per line. Trivia is skipped.
pub fn dump_cst(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_cst(node, 0, &mut out).expect("String write never fails");
    out
}

fn write_cst(node: &SyntaxNode, indent: usize, w: &mut impl Write) -> std::fmt::Result {
    let prefix = "  ".repeat(indent);
    writeln!(w, "{}{:?}", prefix, node.kind())?;

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => write_cst(&n, indent + 1, w)?,
            NodeOrToken::Token(t) if !t.kind().is_trivia() => {
                writeln!(w, "{}  {:?} {:?}", prefix, t.kind(), t.text())?;
            }
            NodeOrToken::Token(_) => {}
        }
    }
    Ok(())
}
