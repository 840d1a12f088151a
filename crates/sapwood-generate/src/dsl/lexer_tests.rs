use super::cst::SyntaxKind::{self, *};
use super::lexer::{lex, token_text};

fn kinds(source: &str) -> Vec<(SyntaxKind, &str)> {
    lex(source)
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .map(|t| (t.kind, token_text(source, t)))
        .collect()
}

#[test]
fn punctuation_and_names() {
    assert_eq!(
        kinds("rule = a | b;"),
        vec![
            (Id, "rule"),
            (Equals, "="),
            (Id, "a"),
            (Pipe, "|"),
            (Id, "b"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn string_literals_with_escapes() {
    assert_eq!(
        kinds(r#""a\"b" 'c'"#),
        vec![(Str, r#""a\"b""#), (Str, "'c'")]
    );
}

#[test]
fn regex_is_not_a_comment() {
    assert_eq!(
        kinds("/[a-z]+/ // trailing"),
        vec![(Regex, "/[a-z]+/")]
    );
}

#[test]
fn regex_with_escaped_slash() {
    assert_eq!(kinds(r"/a\/b/"), vec![(Regex, r"/a\/b/")]);
}

#[test]
fn negative_integer() {
    assert_eq!(
        kinds("prec(-1, x)"),
        vec![
            (Id, "prec"),
            (ParenOpen, "("),
            (Integer, "-1"),
            (Comma, ","),
            (Id, "x"),
            (ParenClose, ")"),
        ]
    );
}

#[test]
fn garbage_is_coalesced() {
    assert_eq!(kinds("a $$$ b"), vec![(Id, "a"), (Garbage, "$$$"), (Id, "b")]);
}

#[test]
fn trailing_garbage() {
    assert_eq!(kinds("a ~~"), vec![(Id, "a"), (Garbage, "~~")]);
}

#[test]
fn unterminated_string_stops_at_end_of_line() {
    assert_eq!(
        kinds("a = \"b c;\nd = e;"),
        vec![
            (Id, "a"),
            (Equals, "="),
            (Unterminated, "\"b c;"),
            (Id, "d"),
            (Equals, "="),
            (Id, "e"),
            (Semicolon, ";"),
        ]
    );
}

#[test]
fn unterminated_regex_at_end_of_input() {
    assert_eq!(
        kinds("@word = /[a-z"),
        vec![(At, "@"), (Id, "word"), (Equals, "="), (Unterminated, "/[a-z")]
    );
}

#[test]
fn garbage_before_unterminated_literal() {
    assert_eq!(
        kinds("$$'x"),
        vec![(Garbage, "$$"), (Unterminated, "'x")]
    );
}

#[test]
fn trivia_is_kept() {
    let tokens = lex("a // c\n");
    let all: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(all, vec![Id, Whitespace, LineComment, Newline]);
}
