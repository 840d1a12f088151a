use indoc::indoc;
use rowan::TextRange;

use super::{dump_cst, parse};
use crate::diagnostics::DiagnosticKind;

fn valid_cst(source: &str) -> String {
    let parsed = parse(source);
    assert!(
        parsed.diagnostics().is_empty(),
        "unexpected diagnostics:\n{}",
        parsed.diagnostics()
    );
    dump_cst(&parsed.syntax())
}

#[test]
fn alternation_of_sequences() {
    let res = valid_cst(r#"expr = expr "+" expr | number;"#);

    insta::assert_snapshot!(res, @r#"
    Root
      Rule
        Id "expr"
        Equals "="
        Alt
          Seq
            SymbolRef
              Id "expr"
            StrLit
              Str "\"+\""
            SymbolRef
              Id "expr"
          Pipe "|"
          SymbolRef
            Id "number"
        Semicolon ";"
    "#);
}

#[test]
fn call_with_field_and_quantifier() {
    let res = valid_cst("call = prec.left(1, name: ident args?);");

    insta::assert_snapshot!(res, @r#"
    Root
      Rule
        Id "call"
        Equals "="
        Call
          Id "prec"
          Dot "."
          Id "left"
          ParenOpen "("
          IntLit
            Integer "1"
          Comma ","
          Seq
            Field
              Id "name"
              Colon ":"
              SymbolRef
                Id "ident"
            Quantified
              SymbolRef
                Id "args"
              Question "?"
          ParenClose ")"
        Semicolon ";"
    "#);
}

#[test]
fn prec_without_parens_is_a_symbol() {
    let res = valid_cst("a = prec;");

    insta::assert_snapshot!(res, @r#"
    Root
      Rule
        Id "a"
        Equals "="
        SymbolRef
          Id "prec"
        Semicolon ";"
    "#);
}

#[test]
fn directive_with_regex_and_symbol() {
    let res = valid_cst(r"@extras = /\s/ comment;");

    insta::assert_snapshot!(res, @r#"
    Root
      Directive
        At "@"
        Id "extras"
        Equals "="
        RegexLit
          Regex "/\\s/"
        SymbolRef
          Id "comment"
        Semicolon ";"
    "#);
}

#[test]
fn conflict_set() {
    let res = valid_cst("@conflicts = [a, b];");

    insta::assert_snapshot!(res, @r#"
    Root
      Directive
        At "@"
        Id "conflicts"
        Equals "="
        ConflictSet
          BracketOpen "["
          SymbolRef
            Id "a"
          Comma ","
          SymbolRef
            Id "b"
          BracketClose "]"
        Semicolon ";"
    "#);
}

#[test]
fn empty_group_and_nested_quantifiers() {
    let res = valid_cst("a = ()*;");

    insta::assert_snapshot!(res, @r#"
    Root
      Rule
        Id "a"
        Equals "="
        Quantified
          Group
            ParenOpen "("
            ParenClose ")"
          Star "*"
        Semicolon ";"
    "#);
}

#[test]
fn comments_are_trivia() {
    let source = indoc! {r#"
    // leading
    a = b; // trailing
    "#};

    let res = valid_cst(source);

    insta::assert_snapshot!(res, @r#"
    Root
      Rule
        Id "a"
        Equals "="
        SymbolRef
          Id "b"
        Semicolon ";"
    "#);
}

#[test]
fn tree_is_lossless() {
    let source = "a = b |\n  c* ; // x\n@word = a;\n";
    let parsed = parse(source);
    assert_eq!(parsed.syntax().to_string(), source);
}

#[test]
fn missing_semicolon_resyncs_at_next_rule() {
    let source = indoc! {r#"
    a = b
    c = d;
    "#};

    let parsed = parse(source);
    let rules: Vec<_> = parsed
        .root()
        .rules()
        .filter_map(|r| r.name())
        .map(|t| t.text().to_string())
        .collect();

    assert_eq!(rules, vec!["a", "c"]);
    insta::assert_snapshot!(parsed.diagnostics().to_string(), @"error at 6..7: expected `;` (hint: every rule and directive ends with `;`)");
}

#[test]
fn unclosed_group() {
    let parsed = parse("a = (b c;");

    let diagnostics: Vec<_> = parsed.diagnostics().iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::UnclosedGroup);
    assert_eq!(
        diagnostics[0].message(),
        "missing closing `)`; group started here"
    );
}

#[test]
fn unclosed_group_renders_with_source() {
    let source = "a = (b c;";
    let parsed = parse(source);

    let rendered = parsed.diagnostics().render(source);
    assert!(rendered.starts_with("error: missing closing `)`; group started here"));
    assert!(rendered.contains("1 | a = (b c;"));
}

#[test]
fn unexpected_top_level_token() {
    let parsed = parse("; a = b;");

    let diagnostics: Vec<_> = parsed.diagnostics().iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::UnexpectedToken);
    assert_eq!(diagnostics[0].message(), "unexpected token: `;`");
    assert_eq!(parsed.root().rules().count(), 1);
}

#[test]
fn empty_alternative() {
    let parsed = parse("a = b | ;");

    let kinds: Vec<_> = parsed.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, vec![DiagnosticKind::ExpectedExpression]);
}

#[test]
fn missing_equals() {
    let parsed = parse("a b;");

    let kinds: Vec<_> = parsed.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, vec![DiagnosticKind::ExpectedEquals]);
    assert!(parsed.root().rules().next().unwrap().body().is_some());
}

#[test]
fn garbage_inside_rule_is_skipped() {
    let parsed = parse("a = b $ c;\nd = e;");

    assert_eq!(parsed.diagnostics().len(), 1);
    assert_eq!(parsed.root().rules().count(), 2);
}

#[test]
fn unterminated_string_does_not_swallow_the_next_rule() {
    let parsed = parse("a = \"b c;\nd = e;");

    let unterminated = parsed
        .diagnostics()
        .iter()
        .find(|d| d.kind() == DiagnosticKind::UnterminatedLiteral)
        .unwrap();
    assert_eq!(unterminated.message(), "unterminated literal: missing closing `\"`");
    assert_eq!(unterminated.range(), TextRange::at(4.into(), 1.into()));

    let rules: Vec<_> = parsed
        .root()
        .rules()
        .filter_map(|r| r.name())
        .map(|t| t.text().to_string())
        .collect();
    assert_eq!(rules, vec!["a", "d"]);
}

#[test]
fn unterminated_literal_in_conflict_set() {
    let parsed = parse("@conflicts = [a, 'b];");

    assert_eq!(
        parsed.diagnostics().iter().next().unwrap().message(),
        "unterminated literal: missing closing `'`"
    );
    // The literal ate the `]`, yet it stays the headline error.
    let kinds: Vec<_> = parsed.diagnostics().filtered().iter().map(|d| d.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::UnterminatedLiteral,
            DiagnosticKind::UnclosedConflictSet
        ]
    );
}

#[test]
fn unclosed_call() {
    let parsed = parse("a = token(b;");

    let kinds: Vec<_> = parsed.diagnostics().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, vec![DiagnosticKind::UnclosedCall]);
}

#[test]
fn deep_nesting_is_bounded() {
    let depth = 400;
    let mut source = String::from("a = ");
    for _ in 0..depth {
        source.push('(');
    }
    source.push('b');
    for _ in 0..depth {
        source.push(')');
    }
    source.push(';');

    let parsed = parse(&source);
    assert!(parsed.diagnostics().has_errors());
    assert_eq!(parsed.syntax().to_string(), source);
}
