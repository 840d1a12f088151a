use indoc::indoc;

use crate::ast::{Expr, Item, NodeKind, Pattern, PredicateArg, Quantifier};
use crate::{QueryError, QueryErrorKind, parse};

fn parse_ok(source: &str) -> Vec<Pattern> {
    match parse(source) {
        Ok(patterns) => patterns,
        Err(err) => panic!("{}", err.render(source)),
    }
}

fn parse_err(source: &str) -> QueryError {
    match parse(source) {
        Ok(patterns) => panic!("expected an error, got {patterns:?}"),
        Err(err) => err,
    }
}

#[test]
fn node_with_fields_and_captures() {
    let patterns = parse_ok("(binding name: (identifier) @name @also value: _)* @all");
    let [pattern] = patterns.as_slice() else {
        panic!("expected one pattern");
    };
    assert_eq!(pattern.range, 0..55);

    let root = &pattern.root;
    assert_eq!(root.quantifier, Quantifier::ZeroOrMore);
    assert_eq!(root.captures[0].text, "all");
    let Expr::Node(node) = &root.expr else {
        panic!("expected a node");
    };
    assert!(matches!(
        &node.kind,
        NodeKind::Named(name) if name.text == "binding" && name.range == (1..8)
    ));

    let [Item::Step(name), Item::Step(value)] = node.children.as_slice() else {
        panic!("expected two steps");
    };
    assert_eq!(name.field.as_ref().unwrap().text, "name");
    let captures: Vec<_> = name.captures.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(captures, ["name", "also"]);
    assert_eq!(name.range, 9..39);
    assert_eq!(value.field.as_ref().unwrap().text, "value");
    assert_eq!(value.expr, Expr::Wildcard);
}

#[test]
fn special_node_kinds() {
    let patterns = parse_ok(r#"(_) (ERROR) (MISSING) (MISSING identifier) (MISSING ";")"#);
    let kinds: Vec<_> = patterns
        .iter()
        .map(|p| match &p.root.expr {
            Expr::Node(node) => match &node.kind {
                NodeKind::Named(name) => format!("named {}", name.text),
                NodeKind::AnyNamed => "any".to_string(),
                NodeKind::Error => "error".to_string(),
                NodeKind::Missing(None) => "missing".to_string(),
                NodeKind::Missing(Some((name, named))) => format!("missing {} {named}", name.text),
            },
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        ["any", "error", "missing", "missing identifier true", "missing ; false"]
    );
}

#[test]
fn anchors_negations_and_groups() {
    let patterns = parse_ok(indoc! {r#"
        (call . (identifier) !type "(" .)
        ((comment) . (call))
    "#});
    assert_eq!(patterns.len(), 2);

    let Expr::Node(call) = &patterns[0].root.expr else {
        panic!("expected a node");
    };
    assert_eq!(call.children.len(), 4);
    assert_eq!(call.children[0], Item::Anchor);
    assert_eq!(call.children[3], Item::Anchor);
    assert_eq!(call.negated[0].text, "type");
    let Item::Step(paren) = &call.children[2] else {
        panic!("expected a step");
    };
    assert!(matches!(&paren.expr, Expr::Anonymous(text) if text.text == "("));

    let Expr::Group(items) = &patterns[1].root.expr else {
        panic!("expected a group");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn alternation_branches() {
    let patterns = parse_ok(r#"[(number) "x" @x (string)+]"#);
    let Expr::Alt(branches) = &patterns[0].root.expr else {
        panic!("expected an alternation");
    };
    assert_eq!(branches.len(), 3);
    assert_eq!(branches[1].captures[0].text, "x");
    assert_eq!(branches[2].quantifier, Quantifier::OneOrMore);
}

#[test]
fn predicates_are_collected_per_pattern() {
    let patterns = parse_ok(indoc! {r#"
        ((identifier) @a (#eq? @a "x"))
        (binding (identifier) @b (#match? @b "^y") (number)) (number)
    "#});
    assert_eq!(patterns.len(), 3);
    assert_eq!(patterns[0].predicates.len(), 1);
    assert_eq!(patterns[2].predicates.len(), 0);

    let predicate = &patterns[1].predicates[0];
    assert_eq!(predicate.name.text, "match?");
    assert!(matches!(&predicate.args[0], PredicateArg::Capture(name) if name.text == "b"));
    assert!(matches!(&predicate.args[1], PredicateArg::Str(text) if text.text == "^y"));
}

#[test]
fn string_escapes() {
    let patterns = parse_ok(r#""a\"b\n\t\\" "\q""#);
    let texts: Vec<_> = patterns
        .iter()
        .map(|p| match &p.root.expr {
            Expr::Anonymous(text) => text.text.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(texts, ["a\"b\n\t\\", "q"]);
}

#[test]
fn comments_and_empty_queries() {
    assert!(parse_ok("").is_empty());
    assert!(parse_ok("; nothing here\n").is_empty());
    assert_eq!(parse_ok("(a) ; one\n(b)").len(), 2);
}

#[test]
fn syntax_errors() {
    let cases = [
        ("(binding", 0..8, "unclosed `(`"),
        ("()", 0..2, "empty pattern `()`"),
        ("identifier", 0..10, "node kinds are written in parentheses: `(identifier)`"),
        ("@x", 0..2, "capture without a pattern"),
        ("[]", 0..2, "empty alternation"),
        ("[(a)", 0..4, "unclosed `[`"),
        ("(binding !)", 10..11, "expected a field name after `!`, found `)`"),
        ("(a :)", 3..4, "expected a pattern, found `:`"),
        ("(a (b) ]", 7..8, "expected a pattern, found `]`"),
        ("[(a) )", 5..6, "expected a pattern, found `)`"),
    ];
    for (source, range, message) in cases {
        let err = parse_err(source);
        assert_eq!(err.kind(), QueryErrorKind::Syntax, "{source}");
        assert_eq!((err.range(), err.message()), (range, message), "{source}");
    }
}

#[test]
fn structure_errors() {
    let cases = [
        (". (a)", 0..1),
        ("!field", 0..1),
        ("[. (a)]", 1..2),
        (r#"((#eq? @a "x"))"#, 0..15),
        ("(#eq? @a @b)", 1..5),
        ("((a) !field)", 5..11),
    ];
    for (source, range) in cases {
        let err = parse_err(source);
        assert_eq!(err.kind(), QueryErrorKind::Structure, "{source}");
        assert_eq!(err.range(), range, "{source}");
    }
}

#[test]
fn nesting_is_bounded() {
    let source = "(a ".repeat(300);
    let err = parse_err(&source);
    assert_eq!(err.message(), "pattern is nested too deeply");
    assert_eq!(err.range(), 768..769);
}

#[test]
fn lexer_errors_surface() {
    let err = parse_err("(a) %");
    assert_eq!(err.kind(), QueryErrorKind::Syntax);
    assert_eq!(err.range(), 4..5);
}
