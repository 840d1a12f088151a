//! Lex modes and the lexical DFA.

use indexmap::IndexSet;
use regex_automata::MatchKind;
use regex_automata::dfa::{StartKind, dense};
use sapwood_table::{LexMode, ParseState, Symbol};

use crate::error::{GrammarCompileError, Result};
use crate::prepare::LexicalTerminal;

/// Assigns every state a lex mode: its terminals with an action, plus named
/// extras. Identical sets share one mode.
pub fn assign_lex_modes(
    states: &mut [ParseState],
    always_valid: &[Symbol],
    is_external: impl Fn(Symbol) -> bool,
) -> Vec<LexMode> {
    let mut modes: IndexSet<LexMode> = IndexSet::new();

    for state in states.iter_mut() {
        let mut valid: Vec<Symbol> = state
            .actions
            .iter()
            .map(|entry| entry.symbol)
            .chain(always_valid.iter().copied())
            .collect();
        valid.sort_unstable();
        valid.dedup();

        let has_externals = valid.iter().any(|&s| is_external(s));
        let (id, _) = modes.insert_full(LexMode {
            valid,
            has_externals,
        });
        state.lex_mode = id as u16;
    }

    tracing::debug!(modes = modes.len(), "lex modes assigned");
    modes.into_iter().collect()
}

/// One anchored multi-pattern DFA over every lexical terminal, serialized
/// little-endian. Pattern `i` is lexical terminal `i`.
pub fn build_dfa(terminals: &[LexicalTerminal], minimize: bool) -> Result<Vec<u8>> {
    let patterns: Vec<&str> = terminals.iter().map(|t| t.regex.as_str()).collect();

    let dfa = dense::DFA::builder()
        .configure(
            dense::DFA::config()
                .match_kind(MatchKind::All)
                .start_kind(StartKind::Anchored)
                .minimize(minimize),
        )
        .build_many(&patterns)
        .map_err(|err| GrammarCompileError::Lexer(err.to_string()))?;

    let sparse = dfa
        .to_sparse()
        .map_err(|err| GrammarCompileError::Lexer(err.to_string()))?;
    let bytes = sparse.to_bytes_little_endian();

    tracing::debug!(
        patterns = patterns.len(),
        dense_bytes = dfa.memory_usage(),
        bytes = bytes.len(),
        "lexical DFA built"
    );
    Ok(bytes)
}
