//! Syntax kinds for the grammar DSL.
//!
//! `SyntaxKind` serves as both token kind (from the lexer) and node kind
//! (from the parser). Logos derives token recognition; node kinds carry no
//! token attributes. `GrammarLang` implements Rowan's `Language`.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then nodes, then `__LAST`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("=")]
    Equals = 0,

    #[token(";")]
    Semicolon,

    #[token("|")]
    Pipe,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[regex(r"-?[0-9]+")]
    Integer,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    Str,

    /// Regex literal. Never starts with `/` so `//` stays a comment.
    #[regex(r"/(?:[^/\\\n]|\\.)(?:[^/\\\n]|\\.)*/")]
    Regex,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Id,

    #[regex(r"[ \t\r]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    /// String or regex literal missing its closing delimiter, up to the end of the line
    Unterminated,
    /// Coalesced unrecognized characters
    Garbage,
    Error,

    // --- Node kinds ---
    Root,
    Rule,
    Directive,
    Alt,
    Seq,
    Quantified,
    Field,
    Call,
    Group,
    SymbolRef,
    StrLit,
    RegexLit,
    IntLit,
    ConflictSet,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage | Unterminated)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarLang {}

impl Language for GrammarLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: bounds checked above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<GrammarLang>;
pub type SyntaxToken = rowan::SyntaxToken<GrammarLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 64-bit bitset of `SyntaxKind`s.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..(__LAST as u16).min(64) {
            if self.0 & (1 << i) != 0 {
                // SAFETY: i < __LAST
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

pub mod token_sets {
    use super::*;

    /// FIRST set of an item.
    pub const ITEM_FIRST: TokenSet = TokenSet::new(&[Id, Str, Regex, Unterminated, ParenOpen]);

    pub const QUANTIFIERS: TokenSet = TokenSet::new(&[Question, Star, Plus]);

    /// Tokens that end a sequence.
    pub const SEQ_END: TokenSet =
        TokenSet::new(&[Pipe, ParenClose, Comma, Semicolon, BracketClose]);

    /// Synchronization points at the top level.
    pub const ROOT_RECOVERY: TokenSet = TokenSet::new(&[At, Semicolon]);
}
