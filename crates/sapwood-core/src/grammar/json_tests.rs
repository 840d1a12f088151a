use super::*;

#[test]
fn parse_minimal_grammar() {
    let json = r#"{
        "name": "nested",
        "rules": {
            "rule": {
                "type": "SEQ",
                "members": [
                    { "type": "STRING", "value": "a" },
                    { "type": "CHOICE", "members": [
                        { "type": "SYMBOL", "name": "rule" },
                        { "type": "BLANK" }
                    ]},
                    { "type": "STRING", "value": "b" }
                ]
            }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(grammar.name, "nested");
    assert_eq!(grammar.start_rule(), Some("rule"));
    assert_eq!(
        grammar.rules[0].1,
        Rule::seq([
            Rule::string("a"),
            Rule::optional(Rule::symbol("rule")),
            Rule::string("b"),
        ])
    );
}

#[test]
fn parse_precedence_and_fields() {
    let json = r#"{
        "name": "expr",
        "precedences": [[
            { "type": "STRING", "value": "mul" },
            { "type": "SYMBOL", "name": "sum" }
        ]],
        "rules": {
            "sum": {
                "type": "PREC_LEFT",
                "value": "mul",
                "content": {
                    "type": "FIELD",
                    "name": "left",
                    "content": { "type": "PATTERN", "value": "[0-9]+", "flags": "i" }
                }
            }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();
    assert_eq!(
        grammar.precedences,
        vec![vec![
            PrecedenceEntry::Name("mul".into()),
            PrecedenceEntry::Symbol("sum".into()),
        ]]
    );
    let Rule::PrecLeft { value, content } = &grammar.rules[0].1 else {
        panic!("expected PREC_LEFT, got {:?}", grammar.rules[0].1);
    };
    assert_eq!(*value, Precedence::Name("mul".into()));
    assert!(matches!(**content, Rule::Field { .. }));
}

#[test]
fn preserves_rule_order() {
    let json = r#"{
        "name": "test",
        "rules": {
            "program": { "type": "SYMBOL", "name": "statement" },
            "statement": { "type": "SYMBOL", "name": "expression" },
            "expression": { "type": "STRING", "value": "x" }
        }
    }"#;

    let grammar = Grammar::from_json(json).unwrap();

    // Start rule stays first, not alphabetically sorted
    assert_eq!(grammar.rules[0].0, "program");
    assert_eq!(grammar.rules[1].0, "statement");
    assert_eq!(grammar.rules[2].0, "expression");
}

#[test]
fn rejects_alias() {
    let json = r#"{
        "name": "test",
        "rules": {
            "program": {
                "type": "ALIAS",
                "value": "x",
                "named": true,
                "content": { "type": "STRING", "value": "x" }
            }
        }
    }"#;

    let err = Grammar::from_json(json).unwrap_err();
    assert_eq!(err.to_string(), "unsupported grammar feature: ALIAS");
}

#[test]
fn rejects_malformed_json() {
    let err = Grammar::from_json("{ \"name\": 1 }").unwrap_err();
    assert!(matches!(err, GrammarError::Json(_)));
}
