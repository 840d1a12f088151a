//! Cursor over the previous tree, used to find subtrees that can be spliced
//! into the new parse.

use crate::subtree::Subtree;

#[derive(Clone, Debug)]
struct Entry {
    subtree: Subtree,
    /// Absolute offset where the subtree's padding starts.
    start: usize,
    /// Index among its parent's children.
    child_index: usize,
}

/// Preorder position in an (edited) old tree. The stack holds the path from
/// the root to the current candidate.
#[derive(Clone, Debug)]
pub(super) struct ReusableNode {
    stack: Vec<Entry>,
}

impl ReusableNode {
    /// Candidates start at the root's children; the root itself is rebuilt
    /// on every parse.
    pub fn new(root: &Subtree) -> Self {
        let mut cursor = Self {
            stack: vec![Entry {
                subtree: root.clone(),
                start: 0,
                child_index: 0,
            }],
        };
        if !cursor.descend() {
            cursor.stack.clear();
        }
        cursor
    }

    pub fn current(&self) -> Option<(&Subtree, usize)> {
        self.stack.last().map(|e| (&e.subtree, e.start))
    }

    /// Moves to the first child of the current subtree.
    pub fn descend(&mut self) -> bool {
        let Some(top) = self.stack.last() else {
            return false;
        };
        let Some(first) = top.subtree.children().first() else {
            return false;
        };
        let entry = Entry {
            subtree: first.clone(),
            start: top.start,
            child_index: 0,
        };
        self.stack.push(entry);
        true
    }

    /// Skips the current subtree: moves to its next sibling, or to the next
    /// sibling of the nearest ancestor that has one.
    pub fn advance(&mut self) {
        while let Some(entry) = self.stack.pop() {
            let end = entry.start + entry.subtree.total_len();
            let Some(parent) = self.stack.last() else {
                return;
            };
            let next = entry.child_index + 1;
            if let Some(sibling) = parent.subtree.children().get(next) {
                let sibling = Entry {
                    subtree: sibling.clone(),
                    start: end,
                    child_index: next,
                };
                self.stack.push(sibling);
                return;
            }
        }
    }

    /// Are the leaves after the current subtree, up to and including the
    /// first non-extra token, untouched by edits?
    pub fn following_tokens_unchanged(&self) -> bool {
        let mut ahead = self.clone();
        ahead.advance();
        while let Some((tree, _)) = ahead.current() {
            if !tree.is_leaf() {
                if !ahead.descend() {
                    ahead.advance();
                }
                continue;
            }
            if tree.has_changes() {
                return false;
            }
            if !tree.is_extra() && tree.size() > 0 {
                return true;
            }
            ahead.advance();
        }
        true
    }
}
