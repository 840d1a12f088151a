//! Finished syntax trees and edits.

use std::fmt;

use sapwood_core::InputEdit;

use crate::cursor::TreeCursor;
use crate::language::Language;
use crate::node::Node;
use crate::subtree::Subtree;

/// An immutable syntax tree.
///
/// Cloning is cheap. Editing returns a new tree that shares every subtree
/// the edit did not reach.
#[derive(Clone)]
pub struct Tree {
    root: Subtree,
    language: Language,
}

impl Tree {
    pub(crate) fn new(root: Subtree, language: Language) -> Self {
        Self { root, language }
    }

    pub fn root_node(&self) -> Node<'_> {
        Node::root(self)
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Length of the parsed text.
    pub fn len(&self) -> usize {
        self.root.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether error recovery ran anywhere in the tree.
    pub fn has_error(&self) -> bool {
        self.root.has_error()
    }

    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    pub(crate) fn root_subtree(&self) -> &Subtree {
        &self.root
    }

    /// Applies an edit, returning a tree whose lengths describe the new text.
    ///
    /// Every subtree whose bytes or lookahead overlap the edit is copied and
    /// marked changed; the rest is shared. Pass the result to
    /// [`Parser::parse`](crate::Parser::parse) with the new text to reparse.
    pub fn edit(&self, edit: &InputEdit) -> Tree {
        if edit.is_noop() {
            return self.clone();
        }
        let mut inserted = false;
        let mut root = edit_subtree(&self.root, 0, edit, &mut inserted);
        if root.padding() > 0 {
            // The root starts at byte 0 and counts leading padding in its size.
            root = root.edited(0, root.total_len(), root.children().to_vec());
        }
        Tree {
            root,
            language: self.language.clone(),
        }
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("len", &self.len())
            .field("has_error", &self.has_error())
            .finish()
    }
}

/// Does an edit touch bytes `[start, start + total + lookahead)`?
fn affects(edit: &InputEdit, start: usize, tree: &Subtree) -> bool {
    let reach = start + tree.total_len() + tree.lookahead_bytes();
    let s = edit.start_byte;
    if edit.is_insertion() {
        (start < s || (s == 0 && start == 0)) && s <= reach
    } else {
        s < reach && edit.old_end_byte > start
    }
}

fn overlap(a: (usize, usize), b: (usize, usize)) -> usize {
    a.1.min(b.1).saturating_sub(a.0.max(b.0))
}

fn edit_subtree(tree: &Subtree, start: usize, edit: &InputEdit, inserted: &mut bool) -> Subtree {
    if !affects(edit, start, tree) {
        return tree.clone();
    }

    if tree.is_leaf() {
        let token_start = start + tree.padding();
        let end = token_start + tree.size();
        let deleted = (edit.start_byte, edit.old_end_byte);

        let mut padding = tree.padding() - overlap(deleted, (start, token_start));
        let mut size = tree.size() - overlap(deleted, (token_start, end));

        // New bytes go to the first leaf in preorder that the edit lands in.
        let owns = (start < edit.start_byte && edit.start_byte <= end)
            || (edit.start_byte == 0 && start == 0)
            || overlap(deleted, (start, end)) > 0;
        if owns && !*inserted {
            *inserted = true;
            let before_token = edit.start_byte < token_start
                || (edit.is_insertion() && edit.start_byte == token_start);
            if before_token {
                padding += edit.inserted_len();
            } else {
                size += edit.inserted_len();
            }
        }
        return tree.edited(padding, size, Vec::new());
    }

    let mut offset = start;
    let children: Vec<Subtree> = tree
        .children()
        .iter()
        .map(|child| {
            let edited = edit_subtree(child, offset, edit, inserted);
            offset += child.total_len();
            edited
        })
        .collect();

    let padding = children.first().map_or(0, Subtree::padding);
    let total: usize = children.iter().map(Subtree::total_len).sum();
    tree.edited(padding, total - padding, children)
}
