//! Sapwood: incremental parsing from declarative grammars.
//!
//! # Example
//!
//! ```
//! use sapwood::{Parser, Query};
//!
//! let language = sapwood::compile(r#"
//!     @extras = /\s/;
//!     program = binding*;
//!     binding = name: identifier "=" value: number ";";
//!     identifier = /[a-z]+/;
//!     number = /[0-9]+/;
//! "#).unwrap();
//!
//! let text = "x = 1; y = 2;";
//! let tree = Parser::new(language.clone()).parse(text, None).into_tree();
//! assert_eq!(tree.root_node().named_child_count(), 2);
//!
//! let query = Query::new(&language, "(binding name: (identifier) @name)").unwrap();
//! let names: Vec<_> = query
//!     .matches(tree.root_node(), text.as_bytes())
//!     .map(|m| m.capture("name").unwrap().utf8_text(text.as_bytes()).unwrap())
//!     .collect();
//! assert_eq!(names, ["x", "y"]);
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg(test)]
mod lib_tests;

pub use sapwood_generate::{
    CompileOptions, Diagnostics, DiagnosticsPrinter, GrammarCompileError, Severity,
};
pub use sapwood_query::{Query, QueryCapture, QueryError, QueryErrorKind, QueryMatch, QueryMatches};
pub use sapwood_runtime::{
    ExternalScanner, FieldId, InputEdit, Language, LogTracer, Node, NodeView, NoopTracer,
    ParseOptions, ParseOutcome, ParseStats, Parser, Recovery, ScanInput, ScanResult, ScannerState,
    Symbol, Table, Tracer, Tree, TreeCursor,
};
pub use sapwood_table::LoadError;

#[cfg(feature = "langs")]
pub use sapwood_langs as langs;

/// Errors from building a language or a query.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] GrammarCompileError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compiles grammar DSL source into a language without a scanner.
pub fn compile(source: &str) -> Result<Language> {
    compile_with(source, &CompileOptions::default())
}

pub fn compile_with(source: &str, options: &CompileOptions) -> Result<Language> {
    let grammar =
        sapwood_generate::dsl::parse_grammar(source).map_err(GrammarCompileError::Syntax)?;
    let table = sapwood_generate::compile_with(&grammar, options)?;
    Ok(Language::new(table))
}

/// Compiles a `grammar.json` document.
pub fn compile_json(json: &str) -> Result<Language> {
    Ok(Language::new(sapwood_generate::compile_json(json)?))
}

/// Loads a table saved with [`Table::to_bytes`].
pub fn load(bytes: &[u8]) -> Result<Language> {
    Ok(Language::from_bytes(bytes)?)
}
