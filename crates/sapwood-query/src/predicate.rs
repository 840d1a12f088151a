//! Text predicates, checked once a pattern has matched.
//!
//! A predicate over a capture that matched nothing (an absent optional)
//! holds. Quantified captures must satisfy it for every node.

use std::fmt;

use regex_automata::Input;
use regex_automata::dfa::{Automaton, StartKind, dense};
use sapwood_runtime::Node;

use crate::pattern::CaptureId;

#[derive(Debug)]
pub(crate) enum Predicate {
    /// `#eq?` and `#not-eq?`
    Eq {
        capture: CaptureId,
        operand: Operand,
        negated: bool,
    },
    /// `#match?` and `#not-match?`
    Match {
        capture: CaptureId,
        regex: TextRegex,
        negated: bool,
    },
    /// `#any-of?`
    AnyOf { capture: CaptureId, values: Vec<String> },
}

#[derive(Debug)]
pub(crate) enum Operand {
    /// Compared against the first node of the other capture.
    Capture(CaptureId),
    Literal(String),
}

impl Predicate {
    pub fn holds(&self, captures: &[(CaptureId, Node<'_>)], text: &[u8]) -> bool {
        match self {
            Predicate::Eq {
                capture,
                operand: Operand::Literal(value),
                negated,
            } => texts(captures, text, *capture).all(|t| (t == value.as_bytes()) != *negated),
            Predicate::Eq {
                capture,
                operand: Operand::Capture(other),
                negated,
            } => match (
                texts(captures, text, *capture).next(),
                texts(captures, text, *other).next(),
            ) {
                (Some(a), Some(b)) => (a == b) != *negated,
                _ => true,
            },
            Predicate::Match {
                capture,
                regex,
                negated,
            } => texts(captures, text, *capture).all(|t| regex.is_match(t) != *negated),
            Predicate::AnyOf { capture, values } => {
                texts(captures, text, *capture).all(|t| values.iter().any(|v| v.as_bytes() == t))
            }
        }
    }
}

fn texts<'a>(
    captures: &'a [(CaptureId, Node<'_>)],
    text: &'a [u8],
    id: CaptureId,
) -> impl Iterator<Item = &'a [u8]> {
    captures
        .iter()
        .filter(move |(capture, _)| *capture == id)
        .map(move |(_, node)| text.get(node.byte_range()).unwrap_or_default())
}

/// Unanchored DFA search over captured bytes.
pub(crate) struct TextRegex {
    pattern: String,
    dfa: dense::DFA<Vec<u32>>,
}

impl TextRegex {
    pub fn new(pattern: &str) -> Result<Self, String> {
        let dfa = dense::DFA::builder()
            .configure(dense::DFA::config().start_kind(StartKind::Unanchored))
            .build(pattern)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            pattern: pattern.to_string(),
            dfa,
        })
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.dfa
            .try_search_fwd(&Input::new(haystack))
            .is_ok_and(|found| found.is_some())
    }
}

impl fmt::Debug for TextRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.pattern)
    }
}
