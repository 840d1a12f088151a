//! Grammars and a seeded generator shared by the randomized tests.

#![allow(dead_code)]

use indoc::indoc;
use sapwood::{InputEdit, Language};

/// Balanced `a`/`b` nesting.
pub const NESTED: &str = r#"rule = "a" rule? "b";"#;

pub const BINDINGS: &str = indoc! {r#"
    @name = bindings;
    @extras = /\s/;

    program = binding*;
    binding = name: identifier "=" value: _value ";";
    _value = number | identifier;
    identifier = /[a-z]+/;
    number = /[0-9]+/;
"#};

/// `-` has no precedence, so `1 - 2 - 3` forks and both readings survive
/// until the stack versions merge.
pub const EXPRESSIONS: &str = indoc! {r#"
    @name = expressions;
    @extras = /\s/;
    @conflicts = [expr];

    expr = prec.left(1, expr "+" expr)
         | prec.left(2, expr "*" expr)
         | expr "-" expr
         | "(" expr ")"
         | number;
    number = /[0-9]+/;
"#};

pub const NESTED_PIECES: &[&str] = &["a", "b"];
pub const BINDING_PIECES: &[&str] = &["x", "yz", "=", "1", "42", ";", " ", "\n"];
pub const EXPRESSION_PIECES: &[&str] = &["1", "23", "+", "*", "-", "(", ")", " "];
pub const CBNF_PIECES: &[&str] = &[
    "$letter", "word", "{", "}", "'a'", "\"q\"", "or", "except", "nil", "(", ")", ";", " ",
    "\n", "# note\n",
];

pub fn compile(source: &str) -> Language {
    sapwood::compile(source).unwrap_or_else(|err| panic!("grammar failed to compile: {err}"))
}

/// xorshift64*: small, fast and the same on every platform.
pub struct Rng(u64);

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform in `0..=max`.
    pub fn up_to(&mut self, max: usize) -> usize {
        (self.next_u64() % (max as u64 + 1)) as usize
    }

    pub fn pick<'a>(&mut self, pieces: &[&'a str]) -> &'a str {
        pieces[self.up_to(pieces.len() - 1)]
    }

    /// Up to `max_pieces` pieces glued together.
    pub fn document(&mut self, pieces: &[&str], max_pieces: usize) -> String {
        let count = self.up_to(max_pieces);
        (0..count).map(|_| self.pick(pieces)).collect()
    }

    /// An insertion, deletion or replacement somewhere in `text`. Returns the
    /// edit and the edited text. Pieces are ASCII, so every offset is a char
    /// boundary.
    pub fn edit(&mut self, text: &str, pieces: &[&str]) -> (InputEdit, String) {
        let start = self.up_to(text.len());
        let (end, inserted) = match self.up_to(2) {
            0 => (start, self.document(pieces, 3)),
            1 => (start + self.up_to((text.len() - start).min(6)), String::new()),
            _ => (
                start + self.up_to((text.len() - start).min(6)),
                self.document(pieces, 3),
            ),
        };

        let edit = match (end - start, inserted.len()) {
            (0, len) => InputEdit::insert(start, len),
            (_, 0) => InputEdit::delete(start..end),
            (_, len) => InputEdit::replace(start..end, len),
        };
        let new_text = format!("{}{}{}", &text[..start], inserted, &text[end..]);
        (edit, new_text)
    }
}
