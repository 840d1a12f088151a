//! The compiled table and its binary form.

use serde::{Deserialize, Serialize};

use sapwood_core::{FieldId, StateId};

use super::header::{HEADER_SIZE, Header};
use super::lex_dfa::LexDfa;
use super::symbol::{Symbol, SymbolInfo, SymbolKind};
use super::LoadError;

/// One parser action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseAction {
    Shift(StateId),
    Reduce(u16),
    Accept,
}

/// Actions of a state for one terminal: `actions[start..start + len]`.
///
/// More than one action means an unresolved conflict the parser forks on.
/// Shifts come first, then reduces ordered by production id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub symbol: Symbol,
    pub start: u32,
    pub len: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseState {
    /// Sorted by symbol.
    pub actions: Vec<ActionEntry>,
    /// Sorted by symbol.
    pub gotos: Vec<(Symbol, StateId)>,
    pub lex_mode: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: Symbol,
    pub child_count: u16,
    /// Field of each child, `None` for unlabeled children.
    pub fields: Vec<Option<FieldId>>,
    pub dynamic_precedence: i32,
}

/// Terminals the lexer may return in a state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LexMode {
    /// Sorted. Includes named extras and valid externals.
    pub valid: Vec<Symbol>,
    pub has_externals: bool,
}

impl LexMode {
    #[inline]
    pub fn is_valid(&self, symbol: Symbol) -> bool {
        self.valid.binary_search(&symbol).is_ok()
    }
}

/// Lexical properties of a terminal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalInfo {
    /// Index into the lexer DFA patterns, `None` for externals and END.
    pub pattern: Option<u32>,
    /// Lexical precedence from `token(prec(n, ...))`.
    pub precedence: i32,
    /// May only match with no padding before it.
    pub immediate: bool,
    /// Literal string terminal (wins ties against patterns).
    pub is_string: bool,
    /// String matched in full by the word rule.
    pub is_keyword: bool,
}

/// Serializable table contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub name: String,
    pub symbols: Vec<SymbolInfo>,
    /// `terminals[sym]` for every terminal symbol, END included.
    pub terminals: Vec<TerminalInfo>,
    /// `fields[id - 1]` is the name of field `id`.
    pub fields: Vec<String>,
    pub productions: Vec<Production>,
    pub states: Vec<ParseState>,
    pub actions: Vec<ParseAction>,
    pub lex_modes: Vec<LexMode>,
    /// External terminals in scanner order.
    pub externals: Vec<Symbol>,
    pub extras: Vec<Symbol>,
    pub word: Option<Symbol>,
    pub start_symbol: Symbol,
    pub start_state: StateId,
    /// Sparse DFA over all lexical patterns, little-endian.
    pub lexer: Vec<u8>,
}

/// A compiled grammar table. Immutable; share it through `Arc`.
#[derive(Clone, Debug)]
pub struct Table {
    data: TableData,
    /// Pattern index to terminal.
    patterns: Vec<Symbol>,
    dfa: LexDfa,
}

impl Table {
    pub fn new(data: TableData) -> Result<Self, LoadError> {
        let dfa = LexDfa::from_bytes(&data.lexer).map_err(LoadError::Dfa)?;
        let mut patterns = vec![Symbol::END; dfa.pattern_len()];
        for (id, terminal) in data.terminals.iter().enumerate() {
            if let Some(p) = terminal.pattern
                && let Some(slot) = patterns.get_mut(p as usize)
            {
                *slot = Symbol(id as u16);
            }
        }
        Ok(Self {
            data,
            patterns,
            dfa,
        })
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    // ===== Symbols

    pub fn symbol_count(&self) -> usize {
        self.data.symbols.len()
    }

    /// Number of terminal symbols, END included.
    pub fn terminal_count(&self) -> usize {
        self.data.terminals.len()
    }

    pub fn symbol_info(&self, symbol: Symbol) -> Option<&SymbolInfo> {
        self.data.symbols.get(symbol.index())
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        if symbol.is_error() {
            return "ERROR";
        }
        self.symbol_info(symbol).map_or("<unknown>", |info| info.name.as_str())
    }

    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        !symbol.is_error() && symbol.index() < self.data.terminals.len()
    }

    pub fn is_named(&self, symbol: Symbol) -> bool {
        symbol.is_error() || self.symbol_info(symbol).is_some_and(|s| s.named)
    }

    pub fn is_visible(&self, symbol: Symbol) -> bool {
        symbol.is_error() || self.symbol_info(symbol).is_some_and(|s| s.visible)
    }

    pub fn is_extra(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol).is_some_and(|s| s.extra)
    }

    pub fn is_external(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol)
            .is_some_and(|s| s.kind == SymbolKind::External)
    }

    /// Looks up a visible symbol by name and namedness.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        if named && name == "ERROR" {
            return Some(Symbol::ERROR);
        }
        self.data
            .symbols
            .iter()
            .position(|s| s.visible && s.named == named && s.name == name)
            .map(|i| Symbol(i as u16))
    }

    pub fn terminal(&self, symbol: Symbol) -> Option<&TerminalInfo> {
        if symbol.is_error() {
            return None;
        }
        self.data.terminals.get(symbol.index())
    }

    pub fn extras(&self) -> &[Symbol] {
        &self.data.extras
    }

    pub fn externals(&self) -> &[Symbol] {
        &self.data.externals
    }

    pub fn external_index(&self, symbol: Symbol) -> Option<usize> {
        self.data.externals.iter().position(|&s| s == symbol)
    }

    pub fn word(&self) -> Option<Symbol> {
        self.data.word
    }

    pub fn start_symbol(&self) -> Symbol {
        self.data.start_symbol
    }

    // ===== Fields

    pub fn field_count(&self) -> usize {
        self.data.fields.len()
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        self.data
            .fields
            .get(id.get() as usize - 1)
            .map_or("<unknown>", String::as_str)
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        let index = self.data.fields.iter().position(|f| f == name)?;
        FieldId::new(index as u16 + 1)
    }

    // ===== Automaton

    pub fn production(&self, id: u16) -> &Production {
        &self.data.productions[id as usize]
    }

    pub fn production_count(&self) -> usize {
        self.data.productions.len()
    }

    pub fn state_count(&self) -> usize {
        self.data.states.len()
    }

    pub fn start_state(&self) -> StateId {
        self.data.start_state
    }

    /// Actions for `symbol` in `state`; empty when the symbol is unexpected.
    pub fn actions(&self, state: StateId, symbol: Symbol) -> &[ParseAction] {
        let Some(parse_state) = self.data.states.get(state as usize) else {
            return &[];
        };
        match parse_state
            .actions
            .binary_search_by_key(&symbol, |entry| entry.symbol)
        {
            Ok(i) => {
                let entry = parse_state.actions[i];
                let start = entry.start as usize;
                &self.data.actions[start..start + entry.len as usize]
            }
            Err(_) => &[],
        }
    }

    pub fn has_action(&self, state: StateId, symbol: Symbol) -> bool {
        !self.actions(state, symbol).is_empty()
    }

    /// Terminals with at least one action in `state`.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = Symbol> + '_ {
        self.data
            .states
            .get(state as usize)
            .into_iter()
            .flat_map(|s| s.actions.iter().map(|entry| entry.symbol))
    }

    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        let gotos = &self.data.states.get(state as usize)?.gotos;
        gotos
            .binary_search_by_key(&symbol, |&(sym, _)| sym)
            .ok()
            .map(|i| gotos[i].1)
    }

    pub fn lex_mode_id(&self, state: StateId) -> u16 {
        self.data
            .states
            .get(state as usize)
            .map_or(0, |s| s.lex_mode)
    }

    pub fn lex_mode(&self, id: u16) -> &LexMode {
        &self.data.lex_modes[id as usize]
    }

    // ===== Lexer

    pub fn lexer(&self) -> &LexDfa {
        &self.dfa
    }

    /// Terminal for a lexer DFA pattern.
    pub fn pattern_symbol(&self, pattern: u32) -> Symbol {
        self.patterns
            .get(pattern as usize)
            .copied()
            .unwrap_or(Symbol::END)
    }

    // ===== Binary layout

    /// Serialize to the versioned binary layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        let payload = postcard::to_allocvec(&self.data)?;
        let header = Header {
            checksum: crc32fast::hash(&payload),
            payload_size: payload.len() as u32,
            symbol_count: self.data.symbols.len() as u16,
            state_count: self.data.states.len() as u16,
            production_count: self.data.productions.len() as u16,
            field_count: self.data.fields.len() as u16,
            ..Header::default()
        };

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Load a table, validating header, size and checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() < HEADER_SIZE {
            return Err(LoadError::TooSmall(bytes.len()));
        }
        let header = Header::from_bytes(bytes);
        if !header.validate_magic() {
            return Err(LoadError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(LoadError::UnsupportedVersion(header.version));
        }

        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != header.payload_size as usize {
            return Err(LoadError::SizeMismatch {
                header: header.payload_size,
                actual: payload.len(),
            });
        }
        let actual = crc32fast::hash(payload);
        if actual != header.checksum {
            return Err(LoadError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        let data: TableData = postcard::from_bytes(payload)?;
        Self::new(data)
    }
}
