use sapwood_table::{Symbol, Table};

use crate::lexer::Token;
use crate::scanner::ScannerState;
use crate::stack::StackNode;
use crate::subtree::{MISSING_COST, Subtree, select_tree};
use crate::test_utils::{BINDINGS, language};

fn leaf(table: &Table, name: &str, padding: usize, size: usize) -> Subtree {
    let symbol = table
        .symbol_for_name(name, true)
        .or_else(|| table.symbol_for_name(name, false))
        .unwrap();
    let token = Token {
        symbol,
        padding,
        size,
        lookahead_bytes: 0,
        lex_mode: 0,
        scanner_state: None,
    };
    Subtree::leaf(table, &token, 0, &ScannerState::default())
}

#[test]
fn push_tracks_position_and_cost() {
    let lang = language(BINDINGS);
    let table = lang.table();

    let bottom = StackNode::bottom(0);
    let head = bottom
        .push(leaf(table, "identifier", 0, 1), false, 1)
        .push(Subtree::missing(table, Symbol(2), 1, &ScannerState::default()), false, 2);

    assert_eq!(head.position, 1);
    assert_eq!(head.error_cost, MISSING_COST);
    assert_eq!(head.state, 2);
}

#[test]
fn pop_collects_extras_between_subtrees() {
    let lang = language(BINDINGS);
    let table = lang.table();

    let bottom = StackNode::bottom(0);
    let head = bottom
        .push(leaf(table, "identifier", 0, 1), false, 1)
        .push(leaf(table, "=", 1, 1).into_extra(), true, 1)
        .push(leaf(table, "number", 1, 1), false, 2);

    let paths = head.pop(2);
    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    assert!(std::sync::Arc::ptr_eq(&path.base, &bottom));
    let extras: Vec<bool> = path.subtrees.iter().map(|(_, extra)| *extra).collect();
    assert_eq!(extras, [false, true, false]);

    assert!(head.pop(4).is_empty());
}

#[test]
fn merged_heads_pop_along_both_paths() {
    let lang = language(BINDINGS);
    let table = lang.table();

    let bottom = StackNode::bottom(0);
    let left = bottom
        .push(leaf(table, "identifier", 0, 1), false, 1)
        .push(leaf(table, "number", 0, 1), false, 3);
    let right = bottom.push(leaf(table, "identifier", 0, 2), false, 3);

    assert!(StackNode::mergeable(&left, &right));
    let merged = StackNode::merge(&left, &right);
    assert_eq!(merged.links.len(), 2);

    let one = merged.pop(1);
    assert_eq!(one.len(), 2);
    let bases: Vec<usize> = one.iter().map(|p| p.base.position).collect();
    assert_eq!(bases, [1, 0]);
}

#[test]
fn merge_keeps_the_cheaper_subtree_for_a_shared_predecessor() {
    let lang = language(BINDINGS);
    let table = lang.table();

    let bottom = StackNode::bottom(0);
    let clean = leaf(table, "identifier", 0, 0);
    let missing = Subtree::missing(table, clean.symbol(), 0, &ScannerState::default());

    let left = bottom.push(missing.clone(), false, 1);
    let right = bottom.push(clean.clone(), false, 1);
    let merged = StackNode::merge(&left, &right);

    assert_eq!(merged.links.len(), 1);
    assert!(merged.links[0].subtree.ptr_eq(&clean));
    assert_eq!(merged.error_cost, 0);
    assert!(select_tree(&missing, &clean));
    assert!(!select_tree(&clean, &missing));
}

#[test]
fn pop_all_follows_the_best_path() {
    let lang = language(BINDINGS);
    let table = lang.table();

    let bottom = StackNode::bottom(0);
    let head = bottom
        .push(leaf(table, "identifier", 0, 1), false, 1)
        .push(leaf(table, ";", 0, 1).into_extra(), true, 1);

    let all = head.pop_all();
    assert_eq!(all.len(), 2);
    assert_eq!(table.symbol_name(all[0].0.symbol()), "identifier");
    assert!(all[1].1);
}
