use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Limits that stop a parse early.
///
/// A stopped parse still returns a tree covering the consumed prefix, as
/// [`ParseOutcome::Cancelled`](super::ParseOutcome::Cancelled).
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    pub(crate) max_tokens: Option<u32>,
    pub(crate) deadline: Option<Instant>,
    pub(crate) cancel_flag: Option<Arc<AtomicBool>>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after lexing this many tokens.
    ///
    /// Only tokens the lexer produces count. Leaves and subtrees reused from
    /// the old tree during an incremental parse are free, so the same limit
    /// lets a reparse cover far more text than a fresh parse.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Stop once this instant has passed.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop as soon as the flag is set, from any thread.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn get_max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }
    pub fn get_deadline(&self) -> Option<Instant> {
        self.deadline
    }
    pub fn get_cancel_flag(&self) -> Option<&Arc<AtomicBool>> {
        self.cancel_flag.as_ref()
    }

    pub(crate) fn should_stop(&self, lexed_tokens: u32) -> bool {
        if self.max_tokens.is_some_and(|max| lexed_tokens >= max) {
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return true;
        }
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Counters for the last parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Tokens produced by the lexer (reused leaves excluded).
    pub lexed_tokens: u32,
    /// Subtrees taken over from the previous tree, leaves included.
    pub reused_subtrees: u32,
    pub reused_bytes: usize,
    /// Most stack versions alive at once.
    pub max_versions: usize,
    pub recoveries: u32,
}
