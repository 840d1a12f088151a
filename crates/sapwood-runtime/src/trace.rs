//! Parser instrumentation.
//!
//! The parser is generic over [`Tracer`]. With [`NoopTracer`] every call is
//! an inlined empty function and compiles away. [`LogTracer`] forwards events
//! to `tracing` at trace level, with symbol names resolved.

use sapwood_table::{StateId, Symbol};

use crate::language::Language;

/// Error-recovery strategy taken at a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// A zero-width token was inserted.
    Missing(Symbol),
    /// Subtrees were popped into an `ERROR` node.
    PopBack { trees: usize },
    /// The lookahead was wrapped in an `ERROR` node.
    Skip(Symbol),
    /// Nothing fit at end of input; the stack became an `ERROR` root.
    ErrorRoot,
}

/// Receives raw parser events. Name resolution is up to the implementation.
pub trait Tracer {
    /// A token came out of the lexer.
    fn trace_lex(&mut self, position: usize, symbol: Symbol, size: usize);

    /// A subtree of the previous tree was taken over.
    fn trace_reuse(&mut self, position: usize, symbol: Symbol, len: usize);

    fn trace_shift(&mut self, version: usize, state: StateId, symbol: Symbol);

    fn trace_reduce(&mut self, version: usize, symbol: Symbol, child_count: usize);

    /// `version` split off `new_version` on a conflict.
    fn trace_fork(&mut self, version: usize, new_version: usize);

    /// Live versions after a step.
    fn trace_versions(&mut self, count: usize);

    fn trace_recover(&mut self, position: usize, recovery: Recovery);

    fn trace_accept(&mut self, error_cost: u32);
}

/// Tracer that compiles to nothing.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_lex(&mut self, _position: usize, _symbol: Symbol, _size: usize) {}

    #[inline(always)]
    fn trace_reuse(&mut self, _position: usize, _symbol: Symbol, _len: usize) {}

    #[inline(always)]
    fn trace_shift(&mut self, _version: usize, _state: StateId, _symbol: Symbol) {}

    #[inline(always)]
    fn trace_reduce(&mut self, _version: usize, _symbol: Symbol, _child_count: usize) {}

    #[inline(always)]
    fn trace_fork(&mut self, _version: usize, _new_version: usize) {}

    #[inline(always)]
    fn trace_versions(&mut self, _count: usize) {}

    #[inline(always)]
    fn trace_recover(&mut self, _position: usize, _recovery: Recovery) {}

    #[inline(always)]
    fn trace_accept(&mut self, _error_cost: u32) {}
}

/// Forwards parser events to `tracing`.
pub struct LogTracer {
    language: Language,
}

impl LogTracer {
    pub fn new(language: &Language) -> Self {
        Self {
            language: language.clone(),
        }
    }

    fn name(&self, symbol: Symbol) -> &str {
        self.language.symbol_name(symbol)
    }
}

impl Tracer for LogTracer {
    fn trace_lex(&mut self, position: usize, symbol: Symbol, size: usize) {
        tracing::trace!(position, size, symbol = self.name(symbol), "lex");
    }

    fn trace_reuse(&mut self, position: usize, symbol: Symbol, len: usize) {
        tracing::trace!(position, len, symbol = self.name(symbol), "reuse");
    }

    fn trace_shift(&mut self, version: usize, state: StateId, symbol: Symbol) {
        tracing::trace!(version, state, symbol = self.name(symbol), "shift");
    }

    fn trace_reduce(&mut self, version: usize, symbol: Symbol, child_count: usize) {
        tracing::trace!(version, child_count, symbol = self.name(symbol), "reduce");
    }

    fn trace_fork(&mut self, version: usize, new_version: usize) {
        tracing::trace!(version, new_version, "fork");
    }

    fn trace_versions(&mut self, count: usize) {
        tracing::trace!(count, "versions");
    }

    fn trace_recover(&mut self, position: usize, recovery: Recovery) {
        match recovery {
            Recovery::Missing(symbol) | Recovery::Skip(symbol) => {
                tracing::trace!(position, ?recovery, symbol = self.name(symbol), "recover");
            }
            Recovery::PopBack { .. } | Recovery::ErrorRoot => {
                tracing::trace!(position, ?recovery, "recover");
            }
        }
    }

    fn trace_accept(&mut self, error_cost: u32) {
        tracing::trace!(error_cost, "accept");
    }
}
