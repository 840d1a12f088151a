use regex_automata::dfa::{StartKind, dense};
use regex_automata::MatchKind;

use super::{LexDfa, LexMatch};

fn build(patterns: &[&str]) -> LexDfa {
    let dense = dense::Builder::new()
        .configure(
            dense::Config::new()
                .match_kind(MatchKind::All)
                .start_kind(StartKind::Anchored),
        )
        .build_many(patterns)
        .unwrap();
    let bytes = dense.to_sparse().unwrap().to_bytes_little_endian();
    LexDfa::from_bytes(&bytes).unwrap()
}

fn scan(dfa: &LexDfa, input: &str) -> (Vec<LexMatch>, usize) {
    let mut out = Vec::new();
    let examined = dfa.scan(input.as_bytes(), &mut out);
    (out, examined)
}

#[test]
fn reports_every_pattern_and_length() {
    let dfa = build(&["if", "[a-z]+"]);
    let (mut matches, examined) = scan(&dfa, "ifx (");
    matches.sort_by_key(|m| (m.len, m.pattern));

    assert_eq!(
        matches,
        vec![
            LexMatch { pattern: 1, len: 1 },
            LexMatch { pattern: 0, len: 2 },
            LexMatch { pattern: 1, len: 2 },
            LexMatch { pattern: 1, len: 3 },
        ]
    );
    // The space ends the word. "(" only flushes the delayed match.
    assert_eq!(examined, 4);
}

#[test]
fn flushing_a_delayed_match_is_not_examined() {
    let dfa = build(&["a", "b"]);
    let (matches, examined) = scan(&dfa, "abb");
    assert_eq!(matches, vec![LexMatch { pattern: 0, len: 1 }]);
    assert_eq!(examined, 2);
}

#[test]
fn a_byte_that_ends_a_longer_candidate_is_examined() {
    let dfa = build(&["a", "abc"]);
    let (matches, examined) = scan(&dfa, "abx");
    assert_eq!(matches, vec![LexMatch { pattern: 0, len: 1 }]);
    assert_eq!(examined, 3);
}

#[test]
fn match_at_end_of_input() {
    let dfa = build(&["ab"]);
    let (matches, examined) = scan(&dfa, "ab");
    assert_eq!(matches, vec![LexMatch { pattern: 0, len: 2 }]);
    assert_eq!(examined, 2);
}

#[test]
fn anchored_at_start() {
    let dfa = build(&["b"]);
    let (matches, _) = scan(&dfa, "ab");
    assert!(matches.is_empty());
}

#[test]
fn empty_matches_are_dropped() {
    let dfa = build(&["a*"]);
    let (matches, _) = scan(&dfa, "b");
    assert!(matches.is_empty());
}

#[test]
fn bytes_roundtrip() {
    let dfa = build(&["x", "y+"]);
    let again = LexDfa::from_bytes(&dfa.to_bytes()).unwrap();
    assert_eq!(again.pattern_len(), 2);
    assert_eq!(scan(&again, "yy").0.len(), 2);
}

#[test]
fn garbage_bytes_are_rejected() {
    assert!(LexDfa::from_bytes(&[1, 2, 3]).is_err());
}
