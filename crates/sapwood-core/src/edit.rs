//! Byte-level edit descriptions.

use std::ops::Range;

/// A single text modification: bytes `start_byte..old_end_byte` of the old
/// text were replaced by `start_byte..new_end_byte` of the new text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
}

impl InputEdit {
    pub fn new(start_byte: usize, old_end_byte: usize, new_end_byte: usize) -> Self {
        debug_assert!(start_byte <= old_end_byte && start_byte <= new_end_byte);
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
        }
    }

    /// Insert `len` bytes at `at`.
    pub fn insert(at: usize, len: usize) -> Self {
        Self::new(at, at, at + len)
    }

    /// Delete `range` from the old text.
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, range.start)
    }

    /// Replace `range` with `len` new bytes.
    pub fn replace(range: Range<usize>, len: usize) -> Self {
        Self::new(range.start, range.end, range.start + len)
    }

    /// Computes the edit that turns `old` into `new` by trimming the common
    /// prefix and suffix.
    pub fn diff(old: &[u8], new: &[u8]) -> Self {
        let prefix = old
            .iter()
            .zip(new.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        Self::new(prefix, old.len() - suffix, new.len() - suffix)
    }

    /// Whether no bytes of the old text are removed.
    #[inline]
    pub fn is_insertion(&self) -> bool {
        self.start_byte == self.old_end_byte
    }

    #[inline]
    pub fn is_noop(&self) -> bool {
        self.start_byte == self.old_end_byte && self.start_byte == self.new_end_byte
    }

    #[inline]
    pub fn inserted_len(&self) -> usize {
        self.new_end_byte - self.start_byte
    }

    #[inline]
    pub fn deleted_len(&self) -> usize {
        self.old_end_byte - self.start_byte
    }

    /// Maps an offset in the old text to the new text. Offsets inside the
    /// replaced span collapse to the end of the inserted text.
    pub fn map_offset(&self, offset: usize) -> usize {
        if offset <= self.start_byte {
            offset
        } else if offset >= self.old_end_byte {
            offset - self.old_end_byte + self.new_end_byte
        } else {
            self.new_end_byte
        }
    }
}
