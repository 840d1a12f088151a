use indoc::indoc;
use sapwood_core::{Grammar, Rule};

use super::extract::token_regex;
use super::{Expr, ExtractedGrammar, Sym, prepare};
use crate::dsl::parse_grammar;
use crate::error::GrammarCompileError;

fn extracted(source: &str) -> ExtractedGrammar {
    let grammar = parse_grammar(source).expect("grammar source parses");
    prepare(&grammar).unwrap().0
}

fn terminal_names(grammar: &ExtractedGrammar) -> Vec<&str> {
    grammar.lexical.iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn rule_tokens_then_inline_tokens_then_extras() {
    let grammar = extracted(indoc! {r#"
        @extras = /\s/;
        expr = expr "+" number | number | /0x[0-9a-f]+/;
        number = /[0-9]+/;
    "#});

    assert_eq!(
        terminal_names(&grammar),
        vec!["number", "+", "expr_token1", "extras_token1"]
    );
    let number = &grammar.lexical[0];
    assert!(number.named && number.visible);
    let plus = &grammar.lexical[1];
    assert!(!plus.named && plus.visible);
    assert_eq!(plus.literal.as_deref(), Some("+"));
    let hex = &grammar.lexical[2];
    assert!(hex.named && !hex.visible);
    assert!(grammar.lexical[3].extra);
    assert_eq!(grammar.extras, vec![Sym::Lexical(3)]);
}

#[test]
fn start_rule_stays_syntactic() {
    let grammar = extracted(r#"start = "x";"#);

    assert_eq!(grammar.rules.len(), 1);
    assert_eq!(grammar.rules[0].body, Expr::Sym(Sym::Lexical(0)));
    assert_eq!(terminal_names(&grammar), vec!["x"]);
}

#[test]
fn inline_tokens_are_deduplicated() {
    let grammar = extracted(indoc! {r#"
        start = "(" inner ")" | "(" ")";
        inner = "x" "(";
    "#});

    assert_eq!(terminal_names(&grammar), vec!["(", ")", "x"]);
}

#[test]
fn immediate_tokens_are_distinct() {
    let grammar = extracted(r#"start = "." token.immediate(".");"#);

    assert_eq!(grammar.lexical.len(), 2);
    assert!(!grammar.lexical[0].immediate);
    assert!(grammar.lexical[1].immediate);
}

#[test]
fn hidden_rule_token() {
    let grammar = extracted("start = _ws; _ws = /[ ]+/;");

    assert!(grammar.lexical[0].named);
    assert!(!grammar.lexical[0].visible);
}

#[test]
fn supertypes_and_inline_flags() {
    let grammar = extracted(indoc! {r#"
        @supertypes = value;
        @inline = _pair;
        start = value;
        value = _pair | "null";
        _pair = "a" "b";
    "#});

    let value = &grammar.rules[1];
    assert!(value.supertype);
    assert!(!value.visible);
    let pair = &grammar.rules[2];
    assert!(pair.inline);
    assert!(!pair.visible);
}

#[test]
fn keywords_are_marked_from_word_rule() {
    let grammar = extracted(indoc! {r#"
        @word = identifier;
        start = "if" identifier | "+" identifier | "IF";
        identifier = /[a-z_]+/;
    "#});

    let keyword = |text: &str| {
        grammar
            .lexical
            .iter()
            .find(|t| t.name == text)
            .map(|t| t.is_keyword)
            .unwrap()
    };
    assert!(keyword("if"));
    assert!(!keyword("+"));
    assert!(!keyword("IF"));
    assert!(!keyword("identifier"));
    assert_eq!(grammar.word, Some(0));
}

#[test]
fn word_must_be_a_token() {
    let grammar = Grammar {
        word: Some("name".into()),
        ..Grammar::new("g")
    }
    .rule("start", Rule::symbol("name"))
    .rule("name", Rule::seq([Rule::string("a"), Rule::string("b")]));

    let err = prepare(&grammar).unwrap_err();

    insta::assert_snapshot!(err, @"unsupported grammar feature: word rule `name` must be a token");
}

#[test]
fn externals_and_external_extras() {
    let grammar = extracted(indoc! {r#"
        @externals = indent "::" _newline;
        @extras = _newline;
        start = indent "::";
    "#});

    let externals: Vec<_> = grammar
        .externals
        .iter()
        .map(|e| (e.name.as_str(), e.named, e.visible, e.extra))
        .collect();
    assert_eq!(
        externals,
        vec![
            ("indent", true, true, false),
            ("::", false, true, false),
            ("_newline", true, false, true),
        ]
    );
    assert_eq!(grammar.extras, vec![Sym::External(2)]);
    assert!(grammar.lexical.is_empty());
    assert_eq!(
        grammar.rules[0].body,
        Expr::Seq(vec![Expr::Sym(Sym::External(0)), Expr::Sym(Sym::External(1))])
    );
}

#[test]
fn nonterminal_extra() {
    let grammar = Grammar {
        extras: vec![Rule::symbol("comment")],
        ..Grammar::new("g")
    }
    .rule("start", Rule::string("x"))
    .rule("comment", Rule::seq([Rule::string("#"), Rule::symbol("start")]));

    let err = prepare(&grammar).unwrap_err();

    assert!(matches!(err, GrammarCompileError::NonTerminalExtra(n) if n == "comment"));
}

#[test]
fn invalid_pattern() {
    let err = prepare(&Grammar::new("g").rule("start", Rule::pattern("[a-"))).unwrap_err();

    assert!(matches!(
        err,
        GrammarCompileError::InvalidPattern { ref rule, .. } if rule == "start"
    ));
}

#[test]
fn token_regex_shapes() {
    let regex = |rule: Rule| token_regex(&rule, "r").unwrap();

    assert_eq!(regex(Rule::string("a+b")), (r"a\+b".to_string(), 0));
    assert_eq!(regex(Rule::pattern("[0-9]")), ("(?:[0-9])".to_string(), 0));
    assert_eq!(
        regex(Rule::Pattern {
            value: "select".into(),
            flags: Some("i".into()),
        }),
        ("(?i:select)".to_string(), 0)
    );
    assert_eq!(
        regex(Rule::seq([
            Rule::string("0x"),
            Rule::repeat1(Rule::pattern("[0-9a-f]")),
        ])),
        ("0x(?:(?:[0-9a-f]))+".to_string(), 0)
    );
    assert_eq!(
        regex(Rule::choice([Rule::string("a"), Rule::string("b")])),
        ("(?:a|b)".to_string(), 0)
    );
    assert_eq!(
        regex(Rule::Prec {
            value: sapwood_core::Precedence::Integer(3),
            content: Box::new(Rule::string("=>")),
        }),
        ("=>".to_string(), 3)
    );
}

#[test]
fn token_regex_rejects_symbols_and_flags() {
    let symbol = token_regex(&Rule::symbol("x"), "r").unwrap_err();
    assert!(matches!(symbol, GrammarCompileError::SymbolInToken { .. }));

    let flags = token_regex(
        &Rule::Pattern {
            value: "x".into(),
            flags: Some("g".into()),
        },
        "r",
    )
    .unwrap_err();
    assert!(matches!(flags, GrammarCompileError::Unsupported(_)));
}
