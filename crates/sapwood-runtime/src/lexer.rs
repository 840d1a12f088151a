//! Context-aware lexer.
//!
//! The parser asks for one token at a time, passing the lex mode of the
//! current state. External scanners run first, then the terminal DFA.
//! Anonymous and hidden extras are folded into the next token's padding;
//! named extras come back as tokens of their own.

use std::cmp::Reverse;

use sapwood_table::{LexMatch, Symbol, Table};

use crate::language::Language;
use crate::scanner::{ScanInput, ScannerState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub symbol: Symbol,
    pub padding: usize,
    pub size: usize,
    /// How far past the token's end the lexer looked.
    pub lookahead_bytes: usize,
    pub lex_mode: u16,
    /// Scanner state after the token; `Some` for external tokens only.
    pub scanner_state: Option<ScannerState>,
}

impl Token {
    pub fn total_len(&self) -> usize {
        self.padding + self.size
    }
}

/// How a DFA match at the current offset is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Choice {
    Token(Symbol, usize),
    Padding(usize),
}

pub(crate) struct Lexer<'a> {
    table: &'a Table,
    language: &'a Language,
    text: &'a [u8],
    matches: Vec<LexMatch>,
    valid_externals: Vec<bool>,
}

impl<'a> Lexer<'a> {
    pub fn new(language: &'a Language, text: &'a [u8]) -> Self {
        Self {
            table: language.table(),
            language,
            text,
            matches: Vec::new(),
            valid_externals: Vec::new(),
        }
    }

    /// Lexes the token starting at `position`, padding included.
    pub fn lex(&mut self, position: usize, lex_mode: u16, state: &ScannerState) -> Token {
        let mut examined_end = position;

        if let Some(token) = self.lex_external(position, lex_mode, state, &mut examined_end) {
            return token;
        }

        let mut cursor = position;
        loop {
            if cursor >= self.text.len() {
                return Token {
                    symbol: Symbol::END,
                    padding: cursor - position,
                    size: 0,
                    lookahead_bytes: examined_end.saturating_sub(cursor),
                    lex_mode,
                    scanner_state: None,
                };
            }
            self.scan_at(cursor, &mut examined_end);
            match self.choose(lex_mode, cursor == position, true) {
                Some(Choice::Padding(len)) => cursor += len,
                Some(Choice::Token(symbol, size)) => {
                    return self.token(position, cursor, symbol, size, lex_mode, examined_end);
                }
                None => break,
            }
        }

        if let Some(Choice::Token(symbol, size)) =
            self.choose(lex_mode, cursor == position, false)
        {
            return self.token(position, cursor, symbol, size, lex_mode, examined_end);
        }

        // Unrecognized bytes up to the next offset where anything matches.
        let mut end = cursor;
        loop {
            end += utf8_len(self.text[end]).min(self.text.len() - end);
            if end >= self.text.len() {
                break;
            }
            self.scan_at(end, &mut examined_end);
            if !self.matches.is_empty() {
                break;
            }
        }
        self.token(position, cursor, Symbol::ERROR, end - cursor, lex_mode, examined_end)
    }

    fn lex_external(
        &mut self,
        position: usize,
        lex_mode: u16,
        state: &ScannerState,
        examined_end: &mut usize,
    ) -> Option<Token> {
        let mode = self.table.lex_mode(lex_mode);
        if !mode.has_externals {
            return None;
        }
        let scanner = self.language.scanner()?;

        self.valid_externals.clear();
        self.valid_externals
            .extend(self.table.externals().iter().map(|&s| mode.is_valid(s)));

        let input = ScanInput::new(self.text.get(position..).unwrap_or_default());
        let result = scanner.scan(&input, state, &self.valid_externals);
        *examined_end = position + input.examined();

        let result = result?;
        let accepted = result.len > 0
            && self.valid_externals.get(result.token) == Some(&true)
            && result.skipped + result.len <= input.len();
        if !accepted {
            tracing::trace!(token = result.token, "external scanner result rejected");
            return None;
        }

        let end = position + result.skipped + result.len;
        Some(Token {
            symbol: self.table.externals()[result.token],
            padding: result.skipped,
            size: result.len,
            lookahead_bytes: examined_end.saturating_sub(end),
            lex_mode,
            scanner_state: Some(result.state),
        })
    }

    fn scan_at(&mut self, offset: usize, examined_end: &mut usize) {
        self.matches.clear();
        let scanned = self.table.lexer().scan(&self.text[offset..], &mut self.matches);
        *examined_end = (*examined_end).max(offset + scanned);
    }

    /// Picks the winning match among `self.matches`.
    ///
    /// With `restrict`, only terminals valid in the lex mode and extras are
    /// candidates; otherwise every terminal is.
    fn choose(&self, lex_mode: u16, at_start: bool, restrict: bool) -> Option<Choice> {
        let mode = self.table.lex_mode(lex_mode);
        let best = self
            .matches
            .iter()
            .filter_map(|m| {
                let symbol = self.table.pattern_symbol(m.pattern);
                let info = self.table.terminal(symbol)?;
                if symbol.is_end() || (info.immediate && !at_start) {
                    return None;
                }
                let valid = mode.is_valid(symbol);
                let extra = self.table.is_extra(symbol);
                let padding = extra && !valid;
                if restrict && !valid && !extra {
                    return None;
                }
                if !restrict && padding {
                    return None;
                }
                let rank = (
                    info.precedence,
                    m.len,
                    info.is_string,
                    valid && !extra,
                    Reverse(m.pattern),
                );
                Some((rank, symbol, m.len, padding))
            })
            .max_by(|a, b| a.0.cmp(&b.0))?;

        let (_, symbol, len, padding) = best;
        if padding {
            return Some(Choice::Padding(len));
        }
        let (symbol, len) = self.prefer_word(symbol, len);
        Some(Choice::Token(symbol, len))
    }

    /// A keyword loses to the word token when the word matched further.
    fn prefer_word(&self, symbol: Symbol, len: usize) -> (Symbol, usize) {
        let Some(word) = self.table.word() else {
            return (symbol, len);
        };
        if !self.table.terminal(symbol).is_some_and(|t| t.is_keyword) {
            return (symbol, len);
        }
        let word_len = self
            .matches
            .iter()
            .filter(|m| self.table.pattern_symbol(m.pattern) == word)
            .map(|m| m.len)
            .max()
            .unwrap_or(0);
        if word_len > len {
            (word, word_len)
        } else {
            (symbol, len)
        }
    }

    fn token(
        &self,
        position: usize,
        start: usize,
        symbol: Symbol,
        size: usize,
        lex_mode: u16,
        examined_end: usize,
    ) -> Token {
        Token {
            symbol,
            padding: start - position,
            size,
            lookahead_bytes: examined_end.saturating_sub(start + size),
            lex_mode,
            scanner_state: None,
        }
    }
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xF7 => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}
