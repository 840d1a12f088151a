//! Read-only view of a syntax tree.
//!
//! [`Node`] is a small `Copy` handle: a subtree reference plus its absolute
//! offset. Hidden symbols (`_rule`, repetition helpers, anonymous tokens
//! matched by hidden patterns) are flattened away, so a node's children are
//! its nearest visible descendants. A field on a hidden node applies to the
//! visible nodes it contains unless they carry a field of their own.

use std::fmt;
use std::ops::Range;
use std::str::Utf8Error;

use sapwood_table::{FieldId, Symbol};

use crate::cursor::TreeCursor;
use crate::subtree::Subtree;
use crate::tree::Tree;

#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    subtree: &'t Subtree,
    /// Offset where the node's padding starts.
    start: usize,
}

/// Self-contained snapshot of a node and its visible descendants.
///
/// Two trees describe the same parse when their root views are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeView {
    pub kind_id: u16,
    pub start_byte: usize,
    pub end_byte: usize,
    pub field_id: Option<FieldId>,
    pub children: Vec<NodeView>,
}

impl<'t> Node<'t> {
    pub(crate) fn root(tree: &'t Tree) -> Self {
        Self {
            tree,
            subtree: tree.root_subtree(),
            start: 0,
        }
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn symbol(&self) -> Symbol {
        self.subtree.symbol()
    }

    pub fn kind_id(&self) -> u16 {
        self.subtree.symbol().0
    }

    pub fn kind(&self) -> &'t str {
        self.tree.language().symbol_name(self.subtree.symbol())
    }

    pub fn is_named(&self) -> bool {
        self.subtree.is_named()
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    pub fn is_error(&self) -> bool {
        self.subtree.symbol().is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.subtree.is_missing()
    }

    /// Whether this node or a descendant is an error or missing node.
    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    pub fn start_byte(&self) -> usize {
        self.start + self.subtree.padding()
    }

    pub fn end_byte(&self) -> usize {
        self.start + self.subtree.total_len()
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }

    pub fn utf8_text<'a>(&self, source: &'a [u8]) -> Result<&'a str, Utf8Error> {
        std::str::from_utf8(&source[self.byte_range()])
    }

    // ===== Children

    /// Visible children paired with their field.
    pub fn children_with_fields(
        &self,
    ) -> impl Iterator<Item = (Node<'t>, Option<FieldId>)> + use<'t> {
        Children {
            tree: self.tree,
            stack: vec![Frame {
                parent: self.subtree,
                index: 0,
                offset: self.start,
                inherited: None,
            }],
        }
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children_with_fields().map(|(node, _)| node)
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(Node::is_named)
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.children().nth(index)
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'t>> {
        self.named_children().nth(index)
    }

    pub fn child_by_field_id(&self, field: FieldId) -> Option<Node<'t>> {
        self.children_with_fields()
            .find(|&(_, f)| f == Some(field))
            .map(|(node, _)| node)
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<Node<'t>> {
        let field = self.tree.language().field_id(name)?;
        self.child_by_field_id(field)
    }

    pub fn children_by_field_name(&self, name: &str) -> impl Iterator<Item = Node<'t>> + use<'t> {
        let field = self.tree.language().field_id(name);
        self.children_with_fields()
            .filter(move |&(_, f)| field.is_some() && f == field)
            .map(|(node, _)| node)
    }

    pub fn field_name_for_child(&self, index: usize) -> Option<&'t str> {
        let (_, field) = self.children_with_fields().nth(index)?;
        Some(self.tree.language().field_name(field?))
    }

    // ===== Navigation

    pub fn parent(&self) -> Option<Node<'t>> {
        let root = self.tree.root_node();
        if *self == root {
            return None;
        }
        find_parent(root, self)
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut siblings = parent.children().skip_while(|n| n != self);
        siblings.next()?;
        siblings.next()
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        parent.children().take_while(|n| n != self).last()
    }

    pub fn next_named_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let mut siblings = parent.children().skip_while(|n| n != self);
        siblings.next()?;
        siblings.find(Node::is_named)
    }

    pub fn prev_named_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        parent
            .children()
            .take_while(|n| n != self)
            .filter(Node::is_named)
            .last()
    }

    pub fn walk(&self) -> TreeCursor<'t> {
        TreeCursor::new(*self)
    }

    // ===== Rendering

    /// S-expression of the named structure, e.g. `(rule (rule) (MISSING "b"))`.
    ///
    /// Anonymous nodes are left out unless they are missing.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        if self.is_missing() {
            if self.is_named() {
                out.push_str(&format!("(MISSING {})", self.kind()));
            } else {
                out.push_str(&format!("(MISSING {:?})", self.kind()));
            }
            return;
        }
        out.push('(');
        out.push_str(self.kind());
        for (child, field) in self.children_with_fields() {
            if !child.is_named() && !child.is_missing() {
                continue;
            }
            out.push(' ');
            if let Some(field) = field {
                out.push_str(self.tree.language().field_name(field));
                out.push_str(": ");
            }
            child.write_sexp(out);
        }
        out.push(')');
    }

    pub fn view(&self) -> NodeView {
        self.view_with_field(None)
    }

    fn view_with_field(&self, field_id: Option<FieldId>) -> NodeView {
        NodeView {
            kind_id: self.kind_id(),
            start_byte: self.start_byte(),
            end_byte: self.end_byte(),
            field_id,
            children: self
                .children_with_fields()
                .map(|(child, field)| child.view_with_field(field))
                .collect(),
        }
    }

    fn contains(&self, other: &Node<'_>) -> bool {
        self.start <= other.start && other.end_byte() <= self.end_byte()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.subtree.ptr_eq(other.subtree) && self.start == other.start
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind(), self.byte_range())
    }
}

fn find_parent<'t>(node: Node<'t>, target: &Node<'t>) -> Option<Node<'t>> {
    for child in node.children() {
        if child == *target {
            return Some(node);
        }
        if child.contains(target)
            && let Some(parent) = find_parent(child, target)
        {
            return Some(parent);
        }
    }
    None
}

struct Frame<'t> {
    parent: &'t Subtree,
    index: usize,
    offset: usize,
    inherited: Option<FieldId>,
}

/// Visible descendants in order, descending through hidden nodes.
struct Children<'t> {
    tree: &'t Tree,
    stack: Vec<Frame<'t>>,
}

impl<'t> Iterator for Children<'t> {
    type Item = (Node<'t>, Option<FieldId>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let parent = frame.parent;
            let Some(child) = parent.children().get(frame.index) else {
                self.stack.pop();
                continue;
            };
            let start = frame.offset;
            let field = parent.field_at(frame.index).or(frame.inherited);
            frame.index += 1;
            frame.offset += child.total_len();

            if child.is_visible() {
                let node = Node {
                    tree: self.tree,
                    subtree: child,
                    start,
                };
                return Some((node, field));
            }
            if !child.is_leaf() {
                self.stack.push(Frame {
                    parent: child,
                    index: 0,
                    offset: start,
                    inherited: field,
                });
            }
        }
    }
}
