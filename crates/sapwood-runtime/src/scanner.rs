//! External scanners.
//!
//! Some tokens cannot be described by a regular pattern (heredocs, raw
//! strings with a counted delimiter, indentation). A grammar lists them under
//! `@externals` and a [`Language`](crate::Language) supplies an
//! [`ExternalScanner`] that recognizes them.
//!
//! Scanners are pure: the result depends only on the remaining input and the
//! explicit [`ScannerState`] handed in. The parser keeps one state per stack
//! version and records it on every token, so incremental reparsing can tell
//! whether a cached token was lexed in the same context.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

/// Serialized scanner state. Cheap to clone; compared bytewise.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ScannerState(Arc<[u8]>);

impl ScannerState {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScannerState({:?})", &*self.0)
    }
}

/// A token recognized by an external scanner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanResult {
    /// Index into the grammar's `@externals` list.
    pub token: usize,
    /// Bytes skipped before the token, reported as its padding.
    pub skipped: usize,
    /// Token length after the skipped bytes. Must be nonzero.
    pub len: usize,
    /// State after the token.
    pub state: ScannerState,
}

/// Remaining input, as seen by a scanner.
///
/// Every read goes through an accessor so the lexer knows how far the
/// scanner looked. That distance becomes the token's lookahead and decides
/// which edits invalidate it.
pub struct ScanInput<'a> {
    bytes: &'a [u8],
    examined: Cell<usize>,
}

impl<'a> ScanInput<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            examined: Cell::new(0),
        }
    }

    /// Byte at `offset`, or `None` at end of input.
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.touch(offset + 1);
        self.bytes.get(offset).copied()
    }

    pub fn is_eof(&self, offset: usize) -> bool {
        self.touch(offset + 1);
        offset >= self.bytes.len()
    }

    pub fn starts_with(&self, offset: usize, needle: &[u8]) -> bool {
        self.touch(offset + needle.len());
        self.bytes
            .get(offset..)
            .is_some_and(|rest| rest.starts_with(needle))
    }

    /// Offset of the first occurrence of `needle` at or after `from`.
    ///
    /// Marks everything up to the match (or the whole input) as examined.
    pub fn find(&self, from: usize, needle: &[u8]) -> Option<usize> {
        let rest = self.bytes.get(from..)?;
        let found = rest
            .windows(needle.len().max(1))
            .position(|w| w == needle)
            .map(|i| from + i);
        match found {
            Some(at) => self.touch(at + needle.len()),
            None => self.touch(self.bytes.len() + 1),
        }
        found
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// One past the furthest byte looked at.
    pub(crate) fn examined(&self) -> usize {
        self.examined.get()
    }

    fn touch(&self, end: usize) {
        if end > self.examined.get() {
            self.examined.set(end);
        }
    }
}

/// Recognizes the grammar's external tokens.
///
/// `valid[i]` tells whether external `i` is acceptable in the current parse
/// state. Results for invalid tokens, empty tokens and spans running past the
/// input are ignored.
pub trait ExternalScanner: Send + Sync {
    fn scan(
        &self,
        input: &ScanInput<'_>,
        state: &ScannerState,
        valid: &[bool],
    ) -> Option<ScanResult>;
}
