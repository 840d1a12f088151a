//! Sapwood grammar compiler: grammar DSL, validation, LALR(1) tables and the
//! lexical DFA.
//!
//! - `dsl` - lexer, CST and lowering of the grammar DSL
//! - `prepare` - validation, token extraction and flattening
//! - `build` - item sets, conflict resolution, lex modes, table assembly
//! - `diagnostics` - error reporting for grammar sources

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod dsl;

mod build;
mod error;
mod options;
mod prepare;


use sapwood_core::Grammar;
use sapwood_table::Table;

pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use error::{GrammarCompileError, Result};
pub use options::CompileOptions;

/// Compiles a grammar model with default options.
pub fn compile(grammar: &Grammar) -> Result<Table> {
    compile_with(grammar, &CompileOptions::default())
}

pub fn compile_with(grammar: &Grammar, options: &CompileOptions) -> Result<Table> {
    let (extracted, order) = prepare::prepare(grammar)?;
    let flat = prepare::flatten(extracted, &order);
    let data = build::build_table(&flat, &order, options)?;
    let table = Table::new(data).map_err(|e| GrammarCompileError::Lexer(e.to_string()))?;
    tracing::info!(
        grammar = table.name(),
        states = table.state_count(),
        symbols = table.symbol_count(),
        "grammar compiled"
    );
    Ok(table)
}

/// Parses grammar DSL source and compiles it.
///
/// ```
/// let table = sapwood_generate::compile_source(r#"
///     @name = greeting;
///     @extras = /\s/;
///     greeting = "hello" name;
///     name = /[a-z]+/;
/// "#).unwrap();
/// assert_eq!(table.name(), "greeting");
/// ```
pub fn compile_source(source: &str) -> Result<Table> {
    let grammar = dsl::parse_grammar(source).map_err(GrammarCompileError::Syntax)?;
    compile(&grammar)
}

/// Compiles a `grammar.json` document.
pub fn compile_json(json: &str) -> Result<Table> {
    let grammar = Grammar::from_json(json)?;
    compile(&grammar)
}
