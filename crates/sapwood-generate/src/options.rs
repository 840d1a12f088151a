//! Compilation options.

/// Limits and switches for grammar compilation.
///
/// ```
/// use sapwood_generate::CompileOptions;
///
/// let options = CompileOptions::new().max_states(10_000).minimize_lexer(false);
/// assert_eq!(options.get_max_states(), 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    max_states: usize,
    minimize_lexer: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            // State ids are u16.
            max_states: u16::MAX as usize,
            minimize_lexer: true,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails compilation with `TooManyStates` above this many LR states.
    pub fn max_states(mut self, limit: usize) -> Self {
        self.max_states = limit.min(u16::MAX as usize);
        self
    }

    /// Minimize the lexical DFA. Slower builds, smaller tables.
    pub fn minimize_lexer(mut self, value: bool) -> Self {
        self.minimize_lexer = value;
        self
    }

    pub fn get_max_states(&self) -> usize {
        self.max_states
    }

    pub fn get_minimize_lexer(&self) -> bool {
        self.minimize_lexer
    }
}
