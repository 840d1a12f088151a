//! Fixed-size bitset over terminal symbols.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerminalSet {
    words: Vec<u64>,
}

impl TerminalSet {
    pub fn new(terminal_count: usize) -> Self {
        Self {
            words: vec![0; terminal_count.div_ceil(64)],
        }
    }

    pub fn insert(&mut self, terminal: usize) -> bool {
        let (word, bit) = (terminal / 64, 1u64 << (terminal % 64));
        let added = self.words[word] & bit == 0;
        self.words[word] |= bit;
        added
    }

    /// Returns whether anything was added.
    pub fn union(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| i * 64 + bit)
        })
    }
}
