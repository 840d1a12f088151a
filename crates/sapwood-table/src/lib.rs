#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compiled grammar tables.
//!
//! A [`Table`] is the read-only product of grammar compilation: symbol
//! metadata, LR states with their action and goto entries, lex modes, and a
//! single lexical DFA over every terminal. Tables are shared between parsers
//! through `Arc` and can be cached on disk in a versioned binary layout.

mod header;
mod lex_dfa;
mod symbol;
mod table;

#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod lex_dfa_tests;
#[cfg(test)]
mod table_tests;

pub use header::Header;
pub use lex_dfa::{LexDfa, LexMatch};
pub use symbol::{Symbol, SymbolInfo, SymbolKind};
pub use table::{
    ActionEntry, LexMode, ParseAction, ParseState, Production, Table, TableData, TerminalInfo,
};

pub use sapwood_core::{FieldId, StateId};

/// Magic bytes identifying a compiled table.
pub const MAGIC: [u8; 4] = *b"SAPT";

/// Table format version. Bumped whenever the payload layout changes.
pub const VERSION: u32 = 1;

/// Errors raised while loading a compiled table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid magic: expected SAPT")]
    InvalidMagic,
    #[error("unsupported table version {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("table too small: {0} bytes")]
    TooSmall(usize),
    #[error("checksum mismatch: header {expected:#010x}, payload {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("payload decode failed: {0}")]
    Decode(#[from] postcard::Error),
    #[error("lexer DFA decode failed: {0}")]
    Dfa(String),
}
