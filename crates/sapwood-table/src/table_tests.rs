use regex_automata::dfa::{StartKind, dense};
use regex_automata::MatchKind;

use super::*;

fn symbol(name: &str, kind: SymbolKind, named: bool) -> SymbolInfo {
    SymbolInfo {
        name: name.to_string(),
        kind,
        named,
        visible: true,
        extra: false,
        supertype: false,
    }
}

fn lexer_bytes(patterns: &[&str]) -> Vec<u8> {
    dense::Builder::new()
        .configure(
            dense::Config::new()
                .match_kind(MatchKind::All)
                .start_kind(StartKind::Anchored),
        )
        .build_many(patterns)
        .unwrap()
        .to_sparse()
        .unwrap()
        .to_bytes_little_endian()
}

/// Hand-built table for `s = "a" ;`.
fn tiny() -> Table {
    let a = Symbol(1);
    let s = Symbol(2);
    let data = TableData {
        name: "tiny".to_string(),
        symbols: vec![
            symbol("end", SymbolKind::End, false),
            symbol("a", SymbolKind::Terminal, false),
            symbol("s", SymbolKind::Nonterminal, true),
        ],
        terminals: vec![
            TerminalInfo::default(),
            TerminalInfo {
                pattern: Some(0),
                is_string: true,
                ..TerminalInfo::default()
            },
        ],
        fields: vec!["value".to_string()],
        productions: vec![Production {
            lhs: s,
            child_count: 1,
            fields: vec![FieldId::new(1)],
            dynamic_precedence: 0,
        }],
        states: vec![
            ParseState {
                actions: vec![ActionEntry { symbol: a, start: 0, len: 1 }],
                gotos: vec![(s, 2)],
                lex_mode: 0,
            },
            ParseState {
                actions: vec![ActionEntry { symbol: Symbol::END, start: 1, len: 1 }],
                gotos: vec![],
                lex_mode: 1,
            },
            ParseState {
                actions: vec![ActionEntry { symbol: Symbol::END, start: 2, len: 1 }],
                gotos: vec![],
                lex_mode: 1,
            },
        ],
        actions: vec![ParseAction::Shift(1), ParseAction::Reduce(0), ParseAction::Accept],
        lex_modes: vec![
            LexMode {
                valid: vec![a],
                has_externals: false,
            },
            LexMode {
                valid: vec![Symbol::END],
                has_externals: false,
            },
        ],
        externals: vec![],
        extras: vec![],
        word: None,
        start_symbol: s,
        start_state: 0,
        lexer: lexer_bytes(&["a"]),
    };
    Table::new(data).unwrap()
}

#[test]
fn action_and_goto_lookup() {
    let table = tiny();

    assert_eq!(table.actions(0, Symbol(1)), &[ParseAction::Shift(1)]);
    assert_eq!(table.actions(1, Symbol::END), &[ParseAction::Reduce(0)]);
    assert_eq!(table.actions(2, Symbol::END), &[ParseAction::Accept]);
    assert!(table.actions(0, Symbol::END).is_empty());
    assert!(table.actions(99, Symbol(1)).is_empty());

    assert_eq!(table.goto(0, Symbol(2)), Some(2));
    assert_eq!(table.goto(1, Symbol(2)), None);
    assert_eq!(table.expected(0).collect::<Vec<_>>(), vec![Symbol(1)]);
}

#[test]
fn symbol_metadata() {
    let table = tiny();

    assert_eq!(table.symbol_count(), 3);
    assert_eq!(table.terminal_count(), 2);
    assert!(table.is_terminal(Symbol(1)));
    assert!(!table.is_terminal(Symbol(2)));
    assert!(!table.is_terminal(Symbol::ERROR));
    assert_eq!(table.symbol_name(Symbol(2)), "s");
    assert_eq!(table.symbol_name(Symbol::ERROR), "ERROR");
    assert_eq!(table.symbol_for_name("s", true), Some(Symbol(2)));
    assert_eq!(table.symbol_for_name("a", false), Some(Symbol(1)));
    assert_eq!(table.symbol_for_name("a", true), None);
    assert_eq!(table.symbol_for_name("ERROR", true), Some(Symbol::ERROR));
    assert_eq!(table.pattern_symbol(0), Symbol(1));
}

#[test]
fn field_lookup() {
    let table = tiny();
    let id = table.field_id("value").unwrap();
    assert_eq!(id.get(), 1);
    assert_eq!(table.field_name(id), "value");
    assert_eq!(table.field_id("missing"), None);
}

#[test]
fn binary_roundtrip() {
    let table = tiny();
    let bytes = table.to_bytes().unwrap();
    let loaded = Table::from_bytes(&bytes).unwrap();

    assert_eq!(loaded.data(), table.data());
    assert_eq!(loaded.pattern_symbol(0), Symbol(1));
}

#[test]
fn corrupted_payload_is_detected() {
    let mut bytes = tiny().to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = Table::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, LoadError::ChecksumMismatch { .. }));
}

#[test]
fn header_errors() {
    let bytes = tiny().to_bytes().unwrap();

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        Table::from_bytes(&bad_magic),
        Err(LoadError::InvalidMagic)
    ));

    let mut bad_version = bytes.clone();
    bad_version[4..8].copy_from_slice(&99u32.to_le_bytes());
    assert!(matches!(
        Table::from_bytes(&bad_version),
        Err(LoadError::UnsupportedVersion(99))
    ));

    assert!(matches!(
        Table::from_bytes(&bytes[..bytes.len() - 3]),
        Err(LoadError::SizeMismatch { .. })
    ));
    assert!(matches!(
        Table::from_bytes(&bytes[..10]),
        Err(LoadError::TooSmall(10))
    ));
}

#[test]
fn load_error_display() {
    assert_eq!(LoadError::InvalidMagic.to_string(), "invalid magic: expected SAPT");
    let err = LoadError::SizeMismatch {
        header: 100,
        actual: 50,
    };
    assert!(err.to_string().contains("100"));
    assert!(err.to_string().contains("50"));
}
