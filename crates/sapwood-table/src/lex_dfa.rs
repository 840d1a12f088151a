//! Lexical automaton over every terminal pattern.
//!
//! One multi-pattern sparse DFA built with `MatchKind::All` and an anchored
//! start state. Pattern `i` belongs to the terminal whose
//! `TerminalInfo::pattern` is `Some(i)`.
//! Stepping is manual so a single pass reports every pattern that matches at
//! every length, plus how far the automaton looked.

use regex_automata::dfa::{Automaton, sparse};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input};

/// A pattern that matched a prefix of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexMatch {
    pub pattern: u32,
    pub len: usize,
}

#[derive(Clone, Debug)]
pub struct LexDfa {
    dfa: sparse::DFA<Vec<u8>>,
}

impl LexDfa {
    /// Decode a DFA serialized with `to_bytes_little_endian`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        // Sparse DFAs have no alignment requirement, unlike dense ones.
        let (dfa, _) = sparse::DFA::from_bytes(bytes).map_err(|e| e.to_string())?;
        Ok(Self { dfa: dfa.to_owned() })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.dfa.to_bytes_little_endian()
    }

    pub fn pattern_len(&self) -> usize {
        self.dfa.pattern_len()
    }

    /// Runs the automaton over `input`, pushing every non-empty match into
    /// `out`. Returns the number of bytes examined, which can exceed the
    /// longest match.
    pub fn scan(&self, input: &[u8], out: &mut Vec<LexMatch>) -> usize {
        let config = Input::new(input).anchored(Anchored::Yes);
        let Ok(mut state) = self.dfa.start_state_forward(&config) else {
            return 0;
        };

        // Matches are reported one byte late: after stepping on byte `i`, a
        // match state means a match covering `input[..i]`.
        for (i, &byte) in input.iter().enumerate() {
            let previous = state;
            state = self.dfa.next_state(state, byte);
            if !self.dfa.is_special_state(state) {
                continue;
            }
            if self.dfa.is_match_state(state) {
                self.collect(state, i, out);
            } else if self.dfa.is_dead_state(state) || self.dfa.is_quit_state(state) {
                // A byte stepped only to flush a delayed match was not examined.
                if self.dfa.is_match_state(previous) && self.dies_on_every_byte(previous) {
                    return i;
                }
                return i + 1;
            }
        }

        state = self.dfa.next_eoi_state(state);
        if self.dfa.is_match_state(state) {
            self.collect(state, input.len(), out);
        }
        input.len()
    }

    /// Whether `state` has nowhere to go, so the next byte cannot change the
    /// outcome. End of input counts as a byte here.
    fn dies_on_every_byte(&self, state: StateID) -> bool {
        (0..=u8::MAX).all(|byte| self.dfa.is_dead_state(self.dfa.next_state(state, byte)))
            && !self.dfa.is_match_state(self.dfa.next_eoi_state(state))
    }

    fn collect(&self, state: StateID, len: usize, out: &mut Vec<LexMatch>) {
        if len == 0 {
            return;
        }
        for i in 0..self.dfa.match_len(state) {
            let pattern = self.dfa.match_pattern(state, i).as_u32();
            out.push(LexMatch { pattern, len });
        }
    }
}
