use crate::QueryErrorKind;
use crate::lexer::{TokenKind, lex};

fn kinds(source: &str) -> Vec<TokenKind> {
    match lex(source) {
        Ok(tokens) => tokens.into_iter().map(|t| t.kind).collect(),
        Err(err) => panic!("{err}"),
    }
}

fn texts(source: &str) -> Vec<&str> {
    match lex(source) {
        Ok(tokens) => tokens.into_iter().map(|t| &source[t.span]).collect(),
        Err(err) => panic!("{err}"),
    }
}

#[test]
fn punctuation_and_names() {
    use TokenKind::*;

    assert_eq!(
        kinds("(binding name: (identifier)* @name !type . _)"),
        [
            ParenOpen, Id, Id, Colon, ParenOpen, Id, ParenClose, Star, Capture, Negation, Id, Dot,
            Id, ParenClose
        ]
    );
    assert_eq!(kinds("[ ] ? +"), [BracketOpen, BracketClose, Question, Plus]);
}

#[test]
fn trivia_is_dropped() {
    let source = "; leading comment\n(a) ; trailing\n\t(b)";
    assert_eq!(texts(source), ["(", "a", ")", "(", "b", ")"]);
}

#[test]
fn captures_predicates_and_strings() {
    assert_eq!(
        texts(r#"@name.inner @a-b (#not-eq? @x "a\"b")"#),
        ["@name.inner", "@a-b", "(", "#not-eq?", "@x", r#""a\"b""#, ")"]
    );
    assert_eq!(kinds("#set! #match?"), [TokenKind::Predicate, TokenKind::Predicate]);
}

#[test]
fn spans_are_byte_ranges() {
    let err = lex("  (héllo)").unwrap_err();
    assert_eq!(err.range(), 4..6);
    assert_eq!(err.message(), "unexpected character `é`");

    let tokens = lex("(x) \"é\"").unwrap();
    assert_eq!(tokens[3].span, 4..8);
}

#[test]
fn unexpected_character() {
    let err = lex("(a) $").unwrap_err();
    assert_eq!(err.kind(), QueryErrorKind::Syntax);
    assert_eq!(err.range(), 4..5);
    assert_eq!(err.message(), "unexpected character `$`");
}

#[test]
fn unterminated_string() {
    let err = lex(r#"(a "abc"#).unwrap_err();
    assert_eq!(err.message(), "unterminated string");
    assert_eq!(err.range().start, 3);
}

#[test]
fn token_descriptions() {
    assert_eq!(TokenKind::ParenClose.describe(), "`)`");
    assert_eq!(TokenKind::Capture.describe(), "capture");
    assert!(TokenKind::Comment.is_trivia());
    assert!(!TokenKind::Dot.is_trivia());
}
