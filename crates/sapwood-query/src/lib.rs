//! Tree-sitter style queries over Sapwood syntax trees.
//!
//! ```text
//! (binding
//!   name: (identifier) @name
//!   value: [(number) (identifier)] @value)
//!
//! ((identifier) @keyword
//!   (#any-of? @keyword "let" "const"))
//! ```
//!
//! A query is parsed, checked against a [`Language`](sapwood_runtime::Language)
//! and then matched lazily:
//!
//! ```ignore
//! let query = Query::new(&language, "(binding name: (identifier) @name)")?;
//! for m in query.matches(tree.root_node(), text.as_bytes()) {
//!     println!("{:?}", m.capture("name"));
//! }
//! ```
//!
//! - `lexer`, `parser` - query source to patterns
//! - `compile` - node kind, field and capture resolution
//! - `matcher` - the lazy match iterator
//! - `predicate` - `#eq?`, `#match?` and `#any-of?`

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod lexer;

mod compile;
mod error;
mod matcher;
mod parser;
mod pattern;
mod predicate;
mod query;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod parser_tests;
#[cfg(test)]
mod matcher_tests;

pub use error::{QueryError, QueryErrorKind};
pub use matcher::{QueryCapture, QueryMatch, QueryMatches};
pub use parser::parse;
pub use query::Query;
