//! Grammar model.
//!
//! Grammars come from the grammar DSL (see `sapwood-generate`), from
//! tree-sitter `grammar.json` files, or from the compact binary form.

mod binary;
mod json;
mod types;

#[cfg(test)]
mod json_tests;

pub use json::GrammarError;
pub use types::{Grammar, Precedence, PrecedenceEntry, Rule};
