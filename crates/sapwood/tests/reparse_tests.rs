//! Chains of random edits: every reparse must equal a fresh parse of the
//! edited text, whatever it reused.

mod common;

use common::{
    BINDING_PIECES, BINDINGS, EXPRESSION_PIECES, EXPRESSIONS, NESTED, NESTED_PIECES, Rng, compile,
};
use sapwood::{Language, Parser};

const DOCUMENTS: usize = 60;
const EDITS_PER_DOCUMENT: usize = 5;

fn check_random_edits(language: Language, pieces: &[&str], seed: u64) {
    let mut rng = Rng::new(seed);
    let mut parser = Parser::new(language.clone());
    let mut fresh_parser = Parser::new(language);
    let mut reused_subtrees = 0;

    for _ in 0..DOCUMENTS {
        let mut text = rng.document(pieces, 16);
        let mut tree = parser.parse(&text, None).into_tree();

        for _ in 0..EDITS_PER_DOCUMENT {
            let (edit, new_text) = rng.edit(&text, pieces);
            let reparsed = parser.reparse(&tree, &edit, &new_text).into_tree();
            reused_subtrees += parser.stats().reused_subtrees;
            let fresh = fresh_parser.parse(&new_text, None).into_tree();

            assert_eq!(
                reparsed.to_sexp(),
                fresh.to_sexp(),
                "{text:?} -> {new_text:?} via {edit:?}"
            );
            assert_eq!(
                reparsed.root_node().view(),
                fresh.root_node().view(),
                "{text:?} -> {new_text:?} via {edit:?}"
            );
            assert_eq!(reparsed.len(), new_text.len());

            text = new_text;
            tree = reparsed;
        }
    }

    // Otherwise every comparison above is between two fresh parses.
    assert!(reused_subtrees > 0);
}

#[test]
fn nested_edits() {
    check_random_edits(compile(NESTED), NESTED_PIECES, 0xed17_0001);
}

#[test]
fn binding_edits() {
    check_random_edits(compile(BINDINGS), BINDING_PIECES, 0xed17_0002);
}

#[test]
fn ambiguous_expression_edits() {
    check_random_edits(compile(EXPRESSIONS), EXPRESSION_PIECES, 0xed17_0003);
}

#[cfg(feature = "langs")]
#[test]
fn cbnf_edits() {
    check_random_edits(sapwood::langs::cbnf(), common::CBNF_PIECES, 0xed17_0004);
}
