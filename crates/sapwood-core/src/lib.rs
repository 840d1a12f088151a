#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the Sapwood crates.
//!
//! Two layers:
//! - **Grammar layer**: the declarative grammar model (`Grammar`, `Rule`) with
//!   `grammar.json` import and a compact binary form
//! - **Edit layer**: byte-level edit descriptions used to remap trees between
//!   document versions

pub mod grammar;

mod edit;

#[cfg(test)]
mod edit_tests;

// ============================================================================
// Re-exports
// ============================================================================

pub use edit::InputEdit;
pub use grammar::{Grammar, GrammarError, Precedence, PrecedenceEntry, Rule};

// ============================================================================
// Common Types
// ============================================================================

/// Symbol id inside a compiled grammar (terminals first, then nonterminals).
pub type SymbolId = u16;

/// Automaton state id.
pub type StateId = u16;

/// Field id. Zero means "no field" in packed tables, so real ids start at 1.
pub type FieldId = std::num::NonZeroU16;
