#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Sapwood runtime: lexing, GLR parsing, syntax trees and incremental
//! reparsing over compiled grammar tables.
//!
//! ```ignore
//! let language = Language::new(table);
//! let mut parser = Parser::new(language);
//! let tree = parser.parse("1 + 2", None).into_tree();
//! let edit = InputEdit::insert(5, 4);
//! let tree = parser.reparse(&tree, &edit, "1 + 2 + 3").into_tree();
//! ```

mod cursor;
mod language;
mod lexer;
mod node;
mod parser;
mod scanner;
mod stack;
mod subtree;
mod trace;
mod tree;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod stack_tests;

pub use cursor::TreeCursor;
pub use language::Language;
pub use node::{Node, NodeView};
pub use parser::{ParseOptions, ParseOutcome, ParseStats, Parser};
pub use scanner::{ExternalScanner, ScanInput, ScanResult, ScannerState};
pub use trace::{LogTracer, NoopTracer, Recovery, Tracer};
pub use tree::Tree;

pub use sapwood_core::InputEdit;
pub use sapwood_table::{FieldId, StateId, Symbol, Table};
