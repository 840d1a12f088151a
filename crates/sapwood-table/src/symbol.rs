//! Grammar symbols.

use serde::{Deserialize, Serialize};

/// Index into a table's symbol list.
///
/// `0` is end-of-input, terminals come next (lexical, then external), then
/// nonterminals. [`Symbol::ERROR`] sits outside the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub u16);

impl Symbol {
    pub const END: Symbol = Symbol(0);
    pub const ERROR: Symbol = Symbol(u16::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self == Self::END
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_error() {
            f.write_str("ERROR")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    End,
    Terminal,
    External,
    Nonterminal,
}

/// Per-symbol metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Display name. Anonymous terminals use their literal text.
    pub name: String,
    pub kind: SymbolKind,
    /// Named symbols come from rule names; anonymous ones from string literals.
    pub named: bool,
    /// Hidden symbols (`_rule`, repetition helpers, inline patterns) are
    /// flattened away by the node API.
    pub visible: bool,
    pub extra: bool,
    pub supertype: bool,
}

impl SymbolInfo {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal | SymbolKind::External)
    }
}
