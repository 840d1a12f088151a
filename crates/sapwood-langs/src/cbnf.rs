//! CBNF, a BNF dialect for describing syntax.
//!
//! ```text
//! # A CBNF document is a list of rules.
//! $letter { 'a' or 'b' }
//! word { $letter ($letter) }
//! text { r#"raw "quoted" text"# except nil }
//! ```
//!
//! Rules are `name { expression }` or a bare `$meta;`. An expression is a
//! list of terms, optionally split by `or`. Raw strings (`r"..."`,
//! `r#"..."#`) have a counted delimiter and come from [`RawStringScanner`].

use sapwood_runtime::{ExternalScanner, Language, ScanInput, ScanResult, ScannerState};

pub const GRAMMAR: &str = r##"
@name = cbnf;
@extras = /[ \t\r\n]/ comment;
@externals = raw_string;
@word = identifier;

syntax = syntax_rule*;

syntax_rule = name: _syntax_name "{" definition: _expression "}"
            | meta ";";

_syntax_name = identifier | meta;
_expression = list | or;
or = list ("or" list)+;
list = _term+;
_term = _atom | _group;
_atom = identifier | meta | string | raw_string | keyword;
_group = "(" _expression? ")";

string = '"' (escape_sequence | token.immediate(/[^"\\\n]/))* token.immediate('"')
       | "'" (escape_sequence | token.immediate(/[^'\\\n]/)) token.immediate("'");

escape_sequence = token.immediate(/\\([^xu]|u[0-9a-fA-F]{4}|u\{[0-9a-fA-F]+\}|x[0-9a-fA-F]{2})/);

keyword = "nil" | "except";

// Below every other token, so `#` inside strings stays text.
comment = token(prec(-1, /#.*/));

identifier = /[a-zA-Z_][a-zA-Z0-9_]*/;
meta = /\$[a-zA-Z_][a-zA-Z0-9_]*/;
"##;

/// Longest delimiter run a raw string may use.
pub const MAX_RAW_HASHES: usize = 255;

/// Compiles [`GRAMMAR`] and attaches [`RawStringScanner`].
pub fn language() -> Language {
    let table = sapwood_generate::compile_source(GRAMMAR).expect("built-in CBNF grammar compiles");
    tracing::debug!(states = table.state_count(), "cbnf language built");
    Language::new(table).with_scanner(RawStringScanner)
}

/// Recognizes `r"..."` and `r#"..."#` with up to [`MAX_RAW_HASHES`]
/// hashes. The closing quote must be followed by as many hashes as the
/// opening one; extra hashes after it are left for the next token.
///
/// The scanner keeps no state between tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawStringScanner;

impl ExternalScanner for RawStringScanner {
    fn scan(
        &self,
        input: &ScanInput<'_>,
        _state: &ScannerState,
        valid: &[bool],
    ) -> Option<ScanResult> {
        if !valid.first().copied().unwrap_or(false) {
            return None;
        }

        let mut skipped = 0;
        while input.get(skipped).is_some_and(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')) {
            skipped += 1;
        }
        if input.get(skipped) != Some(b'r') {
            return None;
        }

        let mut offset = skipped + 1;
        let mut hashes = 0;
        while input.get(offset) == Some(b'#') {
            hashes += 1;
            offset += 1;
        }
        if hashes > MAX_RAW_HASHES || input.get(offset) != Some(b'"') {
            return None;
        }
        offset += 1;

        let end = closing_quote(input, offset, hashes)?;
        Some(ScanResult {
            token: 0,
            skipped,
            len: end - skipped,
            state: ScannerState::default(),
        })
    }
}

/// Offset just past the `"` and `hashes` hashes that close a raw string
/// whose body starts at `offset`.
fn closing_quote(input: &ScanInput<'_>, mut offset: usize, hashes: usize) -> Option<usize> {
    loop {
        let quote = input.find(offset, b"\"")?;
        let mut run = 0;
        while run < hashes && input.get(quote + 1 + run) == Some(b'#') {
            run += 1;
        }
        if run == hashes {
            return Some(quote + 1 + hashes);
        }
        offset = quote + 1;
    }
}
