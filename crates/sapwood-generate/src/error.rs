//! Grammar compilation errors.

use crate::diagnostics::Diagnostics;

/// A grammar that cannot be compiled. Parsing never starts with one of these.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarCompileError {
    #[error("grammar source has {} errors", .0.error_count())]
    Syntax(Diagnostics),

    #[error("grammar has no rules")]
    NoRules,

    #[error("rule `{0}` is defined more than once")]
    DuplicateRule(String),

    #[error("undefined symbol `{symbol}` referenced in {context}")]
    UndefinedSymbol { symbol: String, context: String },

    #[error("rule `{0}` is unreachable from the start rule")]
    UnreachableRule(String),

    #[error("precedences {0} form a cycle")]
    ConflictingPrecedence(String),

    #[error("precedence `{0}` is used but never declared in @precedences")]
    UndeclaredPrecedence(String),

    #[error("symbol `{symbol}` is referenced inside a token in rule `{rule}`")]
    SymbolInToken { rule: String, symbol: String },

    #[error("inline rule `{0}` is recursive")]
    RecursiveInline(String),

    #[error("extra `{0}` is not a token")]
    NonTerminalExtra(String),

    #[error("token in rule `{0}` matches the empty string")]
    EmptyToken(String),

    #[error("invalid pattern /{pattern}/ in rule `{rule}`: {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    #[error("unsupported grammar feature: {0}")]
    Unsupported(String),

    #[error("automaton exceeds {limit} states")]
    TooManyStates { limit: usize },

    #[error("lexer construction failed: {0}")]
    Lexer(String),
}

impl From<sapwood_core::GrammarError> for GrammarCompileError {
    fn from(err: sapwood_core::GrammarError) -> Self {
        GrammarCompileError::Unsupported(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GrammarCompileError>;
