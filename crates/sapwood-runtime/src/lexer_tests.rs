use indoc::indoc;

use crate::Language;
use crate::lexer::{Lexer, Token};
use crate::scanner::ScannerState;
use crate::test_utils::language;

const LET: &str = indoc! {r#"
    @extras = /\s/;
    @word = identifier;

    program = statement*;
    statement = "let" identifier "=" number ";";
    identifier = /[a-z]+/;
    number = /[0-9]+/;
"#};

fn lex_at_start(language: &Language, text: &str, position: usize) -> Token {
    let table = language.table();
    let mode = table.lex_mode_id(table.start_state());
    Lexer::new(language, text.as_bytes()).lex(position, mode, &ScannerState::default())
}

fn name(language: &Language, token: &Token) -> String {
    language.symbol_name(token.symbol).to_string()
}

#[test]
fn keyword_with_padding() {
    let lang = language(LET);
    let token = lex_at_start(&lang, "  let x", 0);

    assert_eq!(name(&lang, &token), "let");
    assert_eq!((token.padding, token.size), (2, 3));
    assert!(token.scanner_state.is_none());
}

#[test]
fn word_token_beats_keyword_prefix() {
    let lang = language(LET);
    let token = lex_at_start(&lang, "letter = 1;", 0);

    assert_eq!(name(&lang, &token), "identifier");
    assert_eq!(token.size, 6);
}

#[test]
fn end_of_input_after_padding() {
    let lang = language(LET);
    let token = lex_at_start(&lang, "let   ", 3);

    assert!(token.symbol.is_end());
    assert_eq!((token.padding, token.size), (3, 0));
}

#[test]
fn invalid_terminal_is_still_lexed() {
    let lang = language(LET);
    let token = lex_at_start(&lang, "= 1", 0);

    assert_eq!(name(&lang, &token), "=");
    assert_eq!(token.size, 1);
}

#[test]
fn unrecognized_bytes_become_one_error_token() {
    let lang = language(LET);

    let token = lex_at_start(&lang, "@@ let", 0);
    assert!(token.symbol.is_error());
    assert_eq!(token.size, 2);

    let token = lex_at_start(&lang, "é", 0);
    assert!(token.symbol.is_error());
    assert_eq!(token.size, 2);
}

#[test]
fn lookahead_counts_bytes_past_the_token() {
    let lang = language(LET);
    let token = lex_at_start(&lang, "letx", 0);

    assert_eq!(name(&lang, &token), "identifier");
    assert_eq!(token.size, 4);
    assert_eq!(token.lookahead_bytes, 0);
}
