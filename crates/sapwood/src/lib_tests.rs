use indoc::indoc;

use crate::{
    CompileOptions, Error, GrammarCompileError, Parser, Query, QueryErrorKind, compile,
    compile_with, load,
};

const LIST: &str = indoc! {r#"
    @name = list;
    @extras = /\s/;

    list = "[" (item ("," item)*)? "]";
    item = /[a-z]+/ | list;
"#};

#[test]
fn compile_and_parse() {
    let language = compile(LIST).unwrap();
    let tree = Parser::new(language).parse("[a, [b, c], []]", None).into_tree();
    insta::assert_snapshot!(tree.to_sexp(), @"(list (item) (item (list (item) (item))) (item (list)))");
}

#[test]
fn syntax_errors_carry_diagnostics() {
    let source = "list = (item;";
    let Err(Error::Compile(GrammarCompileError::Syntax(diagnostics))) = compile(source) else {
        panic!("expected a syntax error");
    };
    assert!(diagnostics.has_errors());
    assert!(!diagnostics.render(source).is_empty());
}

#[test]
fn semantic_errors() {
    let err = compile("start = missing;").unwrap_err();
    assert!(matches!(err, Error::Compile(GrammarCompileError::UndefinedSymbol { .. })), "{err}");
    assert_eq!(err.to_string(), "undefined symbol `missing` referenced in rule `start`");
}

#[test]
fn state_limit() {
    let options = CompileOptions::new().max_states(2);
    let err = compile_with(LIST, &options).unwrap_err();
    assert!(
        matches!(
            err,
            Error::Compile(GrammarCompileError::TooManyStates { limit: 2 })
        ),
        "{err}"
    );
}

#[test]
fn tables_load_from_bytes() {
    let language = compile(LIST).unwrap();
    let bytes = language.table().to_bytes().unwrap();

    let loaded = load(&bytes).unwrap();
    let text = "[x, [y]]";
    let fresh = Parser::new(language).parse(text, None).into_tree();
    let again = Parser::new(loaded).parse(text, None).into_tree();
    assert_eq!(fresh.root_node().view(), again.root_node().view());

    assert!(matches!(load(&bytes[..bytes.len() / 2]), Err(Error::Load(_))));
}

#[test]
fn query_errors_convert() {
    let language = compile(LIST).unwrap();
    let err: Error = Query::new(&language, "(nope)").unwrap_err().into();
    let Error::Query(query) = &err else {
        panic!("expected a query error");
    };
    assert_eq!(query.kind(), QueryErrorKind::NodeKind);
    assert_eq!(err.to_string(), "unknown node kind at 1..5: unknown node kind `nope`");
}
