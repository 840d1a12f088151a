use super::item_set::{Item, LrGrammar, LrProduction, build};
use crate::error::GrammarCompileError;

/// `S -> "(" S ")" | "x"` with terminals END=0, "("=1, ")"=2, "x"=3 and S=4.
fn parens() -> LrGrammar {
    LrGrammar::new(
        4,
        5,
        4,
        vec![
            LrProduction {
                lhs: 4,
                rhs: vec![1, 4, 2],
            },
            LrProduction {
                lhs: 4,
                rhs: vec![3],
            },
        ],
    )
}

fn item(production: u32, dot: u16) -> Item {
    Item { production, dot }
}

#[test]
fn augmented_production_is_last() {
    let grammar = parens();

    assert_eq!(grammar.augmented(), 2);
    assert_eq!(grammar.productions[2].lhs, 5);
    assert_eq!(grammar.productions[2].rhs, vec![4]);
    assert_eq!(grammar.next_symbol(item(0, 1)), Some(4));
    assert_eq!(grammar.next_symbol(item(1, 1)), None);
}

#[test]
fn lalr_merges_states_with_equal_cores() {
    let grammar = parens();
    let automaton = build(&grammar, 100).unwrap();

    // Canonical LR(1) would split the inner `(` and `x` states by lookahead.
    assert_eq!(automaton.states.len(), 6);

    let start: Vec<_> = automaton.states[0]
        .transitions
        .iter()
        .map(|(&s, &t)| (s, t))
        .collect();
    assert_eq!(start, vec![(1, 1), (3, 2), (4, 3)]);

    // `(` inside parentheses loops back to the same state.
    assert_eq!(automaton.states[1].transitions[&1], 1);
    assert_eq!(automaton.states[4].kernel, vec![item(0, 2)]);
}

#[test]
fn merged_lookaheads_reach_every_use() {
    let grammar = parens();
    let automaton = build(&grammar, 100).unwrap();
    let closures = automaton.closures(&grammar);

    let done_x = &closures[2][&item(1, 1)];
    assert_eq!(done_x.iter().collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn nullable_prefix_exposes_following_terminal() {
    // A -> B "a";  B -> ε | "b"  with END=0, "a"=1, "b"=2, A=3, B=4.
    let grammar = LrGrammar::new(
        3,
        5,
        3,
        vec![
            LrProduction {
                lhs: 3,
                rhs: vec![4, 1],
            },
            LrProduction {
                lhs: 4,
                rhs: vec![],
            },
            LrProduction {
                lhs: 4,
                rhs: vec![2],
            },
        ],
    );
    let automaton = build(&grammar, 100).unwrap();
    let closures = automaton.closures(&grammar);

    let empty_b = &closures[0][&item(1, 0)];
    assert_eq!(empty_b.iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn state_limit() {
    let err = build(&parens(), 3).unwrap_err();

    assert!(matches!(err, GrammarCompileError::TooManyStates { limit: 3 }));
}
