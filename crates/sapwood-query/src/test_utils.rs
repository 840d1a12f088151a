use indoc::indoc;
use sapwood_runtime::{Language, Parser, Tree};

use crate::{Query, QueryMatch};

/// Bindings and calls with comments as named extras.
pub const ITEMS: &str = indoc! {r##"
    @name = items;
    @extras = /\s/ comment;

    program = _item*;
    _item = binding | call;
    binding = name: identifier (":" type: identifier)? "=" value: _value ";";
    call = function: identifier "(" (_value ("," _value)*)? ")" ";";
    _value = number | identifier | string;
    identifier = /[a-z_]+/;
    number = /[0-9]+/;
    string = /"[^"]*"/;
    comment = /#[^\n]*/;
"##};

pub const TEXT: &str = indoc! {r#"
    x = 1;
    # note
    print(x, 2);
    y: int = "hi";
"#};

pub fn language() -> Language {
    match sapwood_generate::compile_source(ITEMS) {
        Ok(table) => Language::new(table),
        Err(err) => panic!("grammar failed to compile: {err}"),
    }
}

pub fn parse(language: &Language, text: &str) -> Tree {
    Parser::new(language.clone()).parse(text, None).into_tree()
}

pub fn query(language: &Language, source: &str) -> Query {
    match Query::new(language, source) {
        Ok(query) => query,
        Err(err) => panic!("{}", err.render(source)),
    }
}

/// `pattern: @name=text ...`
pub fn describe(m: &QueryMatch<'_, '_>, text: &str) -> String {
    let captures: Vec<String> = m
        .captures
        .iter()
        .map(|c| format!("@{}={}", c.name, &text[c.node.byte_range()]))
        .collect();
    format!("{}: {}", m.pattern_index, captures.join(" "))
}

/// Every match of `source` over `text`, described.
pub fn run(source: &str, text: &str) -> Vec<String> {
    let lang = language();
    let tree = parse(&lang, text);
    let query = query(&lang, source);
    query
        .matches(tree.root_node(), text.as_bytes())
        .map(|m| describe(&m, text))
        .collect()
}
