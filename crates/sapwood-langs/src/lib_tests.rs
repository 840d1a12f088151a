use super::*;

#[test]
fn lang_from_name() {
    assert_eq!(from_name("cbnf").unwrap().name(), "cbnf");
    assert_eq!(from_name("CBNF").unwrap().name(), "cbnf");
    assert!(from_name("unknown").is_none());
}

#[test]
fn lang_from_extension() {
    assert_eq!(from_ext("cbnf").unwrap().name(), "cbnf");
    assert!(from_ext("rs").is_none());
}

#[test]
fn all_returns_every_lang() {
    let langs = all();
    assert_eq!(langs.len(), 1);
    for lang in &langs {
        assert!(!lang.name().is_empty());
        assert!(lang.scanner().is_some());
    }
}

#[test]
fn languages_are_built_once() {
    let first = cbnf();
    let second = cbnf();
    assert!(std::ptr::eq(first.table(), second.table()));
}

#[test]
fn cbnf_symbols_resolve() {
    let lang = cbnf();
    assert!(lang.symbol_for_name("syntax_rule", true).is_some());
    assert!(lang.symbol_for_name("raw_string", true).is_some());
    assert!(lang.symbol_for_name("or", false).is_some());
    assert!(lang.symbol_for_name("_expression", true).is_none());
    assert!(lang.field_id("definition").is_some());
}
