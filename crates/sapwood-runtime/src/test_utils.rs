use indoc::indoc;

use crate::{Language, Parser, Tree};

/// `let`-style bindings with a hidden value rule, used across the tests.
pub const BINDINGS: &str = indoc! {r#"
    @name = bindings;
    @extras = /\s/;

    program = binding*;
    binding = name: identifier "=" value: _value ";";
    _value = number | identifier;
    identifier = /[a-z]+/;
    number = /[0-9]+/;
"#};

/// Balanced `a`/`b` nesting.
pub const NESTED: &str = r#"rule = "a" rule? "b";"#;

pub fn language(source: &str) -> Language {
    match sapwood_generate::compile_source(source) {
        Ok(table) => Language::new(table),
        Err(err) => panic!("grammar failed to compile: {err}"),
    }
}

pub fn parse(language: &Language, text: &str) -> Tree {
    Parser::new(language.clone()).parse(text, None).into_tree()
}

pub fn sexp(language: &Language, text: &str) -> String {
    parse(language, text).to_sexp()
}
