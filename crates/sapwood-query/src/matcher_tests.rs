use indoc::indoc;

use crate::test_utils::{TEXT, describe, language, parse, query, run};

#[test]
fn fields_and_captures() {
    assert_eq!(
        run("(binding name: (identifier) @name value: (_) @value)", TEXT),
        ["0: @name=x @value=1", r#"0: @name=y @value="hi""#]
    );
}

#[test]
fn patterns_are_tried_in_order_at_each_node() {
    assert_eq!(
        run("(identifier) @id (number) @num", TEXT),
        [
            "0: @id=x",
            "1: @num=1",
            "0: @id=print",
            "0: @id=x",
            "1: @num=2",
            "0: @id=y",
            "0: @id=int",
        ]
    );
}

#[test]
fn anonymous_nodes_and_wildcards() {
    assert_eq!(run(r#"(call "(" @open)"#, TEXT), ["0: @open=("]);
    assert_eq!(run("(call . _ @first)", TEXT), ["0: @first=print"]);
    assert_eq!(
        run("[(comment) (string)] @leaf", TEXT),
        ["0: @leaf=# note", r#"0: @leaf="hi""#]
    );
}

#[test]
fn anchors() {
    assert_eq!(run(r#"(call "(" . (_) @arg)"#, TEXT), ["0: @arg=x"]);
    assert_eq!(run(r#"(call (_) @arg . ")")"#, TEXT), ["0: @arg=2"]);
    assert_eq!(run("(call (_) @arg .)", TEXT), ["0: @arg=2"]);
    assert_eq!(run("(program . (_) @first)", TEXT), ["0: @first=x = 1;"]);
    assert_eq!(run(r#"(program (_) @last .)"#, TEXT), [r#"0: @last=y: int = "hi";"#]);
}

#[test]
fn anchored_siblings_must_be_adjacent() {
    // `x` and `2` are separated by a comma only.
    assert_eq!(run("(call (identifier) @a . (number) @b)", TEXT), ["0: @a=x @b=2"]);
    // `print` and `2` are separated by a named node.
    assert!(run("(call function: (identifier) @a . (number) @b)", TEXT).is_empty());
}

#[test]
fn quantifiers_are_greedy() {
    assert_eq!(run("(call (identifier)* @ids)", TEXT), ["0: @ids=print @ids=x"]);
    assert_eq!(run("(call (number)+ @n)", TEXT), ["0: @n=2"]);
    assert_eq!(
        run("(binding name: (identifier) @name type: (identifier)? @type)", TEXT),
        ["0: @name=x", "0: @name=y @type=int"]
    );
    assert!(run("(call (string)+ @s)", TEXT).is_empty());
    assert_eq!(run("(call (string)* @s)", TEXT), ["0: "]);
}

#[test]
fn alternations() {
    assert_eq!(
        run("(binding value: [(number) (string)] @lit)", TEXT),
        ["0: @lit=1", r#"0: @lit="hi""#]
    );
    assert_eq!(
        run("[(number) @num (string) @str]", TEXT),
        ["0: @num=1", "0: @num=2", r#"0: @str="hi""#]
    );
}

#[test]
fn negated_fields() {
    assert_eq!(run("(binding name: (identifier) @name !type)", TEXT), ["0: @name=x"]);
}

#[test]
fn sibling_groups() {
    assert_eq!(
        run("((comment) @c . (call) @call)", TEXT),
        ["0: @c=# note @call=print(x, 2);"]
    );
    assert!(run("((binding) . (call))", TEXT).is_empty());
    assert_eq!(run("((binding) @b (call))", TEXT), ["0: @b=x = 1;"]);
}

#[test]
fn predicates_filter_matches() {
    assert_eq!(
        run(r#"((identifier) @id (#eq? @id "x"))"#, TEXT),
        ["0: @id=x", "0: @id=x"]
    );
    assert_eq!(
        run(r#"((identifier) @id (#not-eq? @id "x"))"#, TEXT),
        ["0: @id=print", "0: @id=y", "0: @id=int"]
    );
    assert_eq!(
        run(r#"((identifier) @id (#match? @id "^p"))"#, TEXT),
        ["0: @id=print"]
    );
    assert_eq!(
        run(r#"((identifier) @id (#not-match? @id "^[a-z]$"))"#, TEXT),
        ["0: @id=print", "0: @id=int"]
    );
    assert_eq!(
        run(r#"((identifier) @id (#any-of? @id "int" "y"))"#, TEXT),
        ["0: @id=y", "0: @id=int"]
    );
}

#[test]
fn predicates_compare_captures() {
    let text = "a = a; b = c;";
    assert_eq!(
        run("(binding name: (identifier) @n value: (identifier) @v (#eq? @n @v))", text),
        ["0: @n=a @v=a"]
    );
    assert_eq!(
        run("(binding name: (identifier) @n value: (identifier) @v (#not-eq? @n @v))", text),
        ["0: @n=b @v=c"]
    );
}

#[test]
fn predicates_hold_for_every_quantified_node() {
    let text = "f(a, b, c); g(a, bb);";
    assert_eq!(
        run(
            r#"(call function: (identifier) @f (identifier)+ @args (#match? @args "^[a-z]$"))"#,
            text
        ),
        ["0: @f=f @args=a @args=b @args=c"]
    );
}

#[test]
fn missing_and_error_nodes() {
    let lang = language();
    let text = "x = 1";
    let tree = parse(&lang, text);

    let missing = query(&lang, r#"(MISSING ";") @m"#);
    let found: Vec<_> = missing.matches(tree.root_node(), text.as_bytes()).collect();
    assert_eq!(found.len(), 1);
    let node = found[0].capture("m").unwrap();
    assert!(node.is_missing());
    assert_eq!(node.byte_range(), 5..5);

    let any_missing = query(&lang, "(MISSING) @m");
    assert_eq!(any_missing.matches(tree.root_node(), text.as_bytes()).count(), 1);

    let text = "x = 1 2;";
    let tree = parse(&lang, text);
    let errors = query(&lang, "(ERROR) @e");
    let found: Vec<_> = errors.matches(tree.root_node(), text.as_bytes()).collect();
    assert!(!found.is_empty());
    assert!(found.iter().all(|m| m.capture("e").unwrap().is_error()));
}

#[test]
fn matches_are_lazy_and_restartable() {
    let lang = language();
    let tree = parse(&lang, TEXT);
    let query = query(&lang, "(identifier) @id");

    let mut matches = query.matches(tree.root_node(), TEXT.as_bytes());
    let first = matches.next().unwrap();
    assert_eq!(describe(&first, TEXT), "0: @id=x");

    let resumed = matches.clone();
    let rest: Vec<_> = matches.map(|m| describe(&m, TEXT)).collect();
    let again: Vec<_> = resumed.map(|m| describe(&m, TEXT)).collect();
    assert_eq!(rest, again);
    assert_eq!(rest.len(), 4);

    let restarted = query.matches(tree.root_node(), TEXT.as_bytes()).count();
    assert_eq!(restarted, 5);
}

#[test]
fn matching_below_a_node() {
    let lang = language();
    let tree = parse(&lang, TEXT);
    let call = tree.root_node().named_child(2).unwrap();
    assert_eq!(call.kind(), "call");

    let query = query(&lang, "(identifier) @id");
    let ids: Vec<_> = query
        .matches(call, TEXT.as_bytes())
        .map(|m| describe(&m, TEXT))
        .collect();
    assert_eq!(ids, ["0: @id=print", "0: @id=x"]);
}

#[test]
fn long_sibling_lists() {
    let text: String = (0..300).map(|i| format!("v{} = {i};\n", "a".repeat(i % 7 + 1))).collect();
    let lang = language();
    let tree = parse(&lang, &text);
    let query = query(&lang, "(program (binding)+ @all . (binding) @last .)");

    let found: Vec<_> = query.matches(tree.root_node(), text.as_bytes()).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].nodes_for_capture("all").count(), 299);
    assert_eq!(found[0].capture("last"), tree.root_node().named_child(299));
}

#[test]
fn capture_order_follows_the_document() {
    let source = indoc! {r#"
        (call
          function: (identifier) @fn
          (number) @arg) @call
    "#};
    assert_eq!(run(source, TEXT), ["0: @call=print(x, 2); @fn=print @arg=2"]);
}
