//! Parsing, editing and querying the built-in CBNF language.

#![cfg(feature = "langs")]

use indoc::indoc;
use sapwood::{InputEdit, Parser, Query, Tree, langs};

const DOCUMENT: &str = indoc! {r##"
    # Letters and words.
    $letter { 'a' or 'b' or 'c' }
    word { $letter ($letter) }
    quoted { "\"" word "\"" except nil }
    raw { r#"a "raw" string"# }
    $eol;
"##};

fn parse(text: &str) -> Tree {
    Parser::new(langs::cbnf()).parse(text, None).into_tree()
}

fn captures(query: &str, text: &str) -> Vec<String> {
    let language = langs::cbnf();
    let tree = parse(text);
    let query = Query::new(&language, query).unwrap_or_else(|err| panic!("{}", err.render(query)));
    query
        .matches(tree.root_node(), text.as_bytes())
        .flat_map(|m| m.captures)
        .map(|c| format!("{}={}", c.name, c.node.utf8_text(text.as_bytes()).unwrap()))
        .collect()
}

#[test]
fn document_parses_cleanly() {
    let tree = parse(DOCUMENT);
    assert!(!tree.has_error(), "{}", tree.to_sexp());
    assert_eq!(tree.len(), DOCUMENT.len());
    assert_eq!(tree.root_node().byte_range(), 0..DOCUMENT.len());
}

#[test]
fn rule_names() {
    assert_eq!(
        captures("(syntax_rule name: (_) @name)", DOCUMENT),
        ["name=$letter", "name=word", "name=quoted", "name=raw"]
    );
}

#[test]
fn alternatives_of_meta_rules() {
    assert_eq!(
        captures("(syntax_rule name: (meta) definition: (or (list) @alt))", DOCUMENT),
        ["alt='a'"]
    );
    assert_eq!(
        captures("(syntax_rule name: (meta) definition: (or (list)+ @alt))", DOCUMENT),
        ["alt='a'", "alt='b'", "alt='c'"]
    );
}

#[test]
fn strings_and_keywords() {
    assert_eq!(
        captures(r#"((string) @s (#match? @s "^\""))"#, DOCUMENT),
        [r#"s="\"""#, r#"s="\"""#]
    );
    assert_eq!(
        captures(r#"((keyword) @kw (#any-of? @kw "nil"))"#, DOCUMENT),
        ["kw=nil"]
    );
    assert_eq!(
        captures("(raw_string) @raw", DOCUMENT),
        [r##"raw=r#"a "raw" string"#"##]
    );
}

#[test]
fn bare_meta_rules() {
    assert_eq!(captures("(syntax_rule . (meta) @m . \";\")", DOCUMENT), ["m=$eol"]);
}

#[test]
fn comments() {
    assert_eq!(captures("(comment) @c", DOCUMENT), ["c=# Letters and words."]);
}

/// Applies each edit in turn, checking every reparse against a fresh parse.
#[test]
fn edit_sequence_matches_fresh_parses() {
    let mut parser = Parser::new(langs::cbnf());
    let mut text = DOCUMENT.to_string();
    let mut tree = parser.parse(&text, None).into_tree();

    let edits: [(&str, &str); 6] = [
        ("word {", "words {"),
        ("'b' or ", ""),
        ("except nil", "except"),
        ("r#\"a", "r#\"an"),
        ("$eol;", "$eol; tail { $letter }"),
        ("\"raw\"", "raw\""),
    ];
    for (from, to) in edits {
        let at = text.find(from).unwrap_or_else(|| panic!("{from:?} not in {text:?}"));
        let edit = InputEdit::replace(at..at + from.len(), to.len());
        text.replace_range(at..at + from.len(), to);

        let reparsed = parser.reparse(&tree, &edit, &text).into_tree();
        let fresh = parse(&text);
        assert_eq!(
            reparsed.root_node().view(),
            fresh.root_node().view(),
            "after {from:?} -> {to:?}"
        );
        tree = reparsed;
    }
}

#[test]
fn unchanged_document_is_reused() {
    let mut parser = Parser::new(langs::cbnf());
    let tree = parser.parse(DOCUMENT, None).into_tree();

    let again = parser.parse(DOCUMENT, Some(&tree)).into_tree();

    assert_eq!(again.root_node().view(), tree.root_node().view());
    assert!(parser.stats().reused_subtrees >= 1);
}
