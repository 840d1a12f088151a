//! Stateful walk over visible nodes.

use sapwood_table::FieldId;

use crate::node::Node;

#[derive(Clone)]
struct Level<'t> {
    siblings: Vec<(Node<'t>, Option<FieldId>)>,
    index: usize,
}

/// A cursor that moves between parent, children and siblings without
/// searching from the root, as [`Node::parent`] has to.
#[derive(Clone)]
pub struct TreeCursor<'t> {
    levels: Vec<Level<'t>>,
}

impl<'t> TreeCursor<'t> {
    pub fn new(node: Node<'t>) -> Self {
        Self {
            levels: vec![Level {
                siblings: vec![(node, None)],
                index: 0,
            }],
        }
    }

    /// Restart at `node`.
    pub fn reset(&mut self, node: Node<'t>) {
        *self = Self::new(node);
    }

    pub fn node(&self) -> Node<'t> {
        self.current().0
    }

    pub fn field_id(&self) -> Option<FieldId> {
        self.current().1
    }

    pub fn field_name(&self) -> Option<&'t str> {
        let (node, field) = self.current();
        Some(node.tree().language().field_name(field?))
    }

    /// The current node's siblings with their fields, itself included, and
    /// its index among them. At the starting node this is just that node.
    pub fn siblings(&self) -> (&[(Node<'t>, Option<FieldId>)], usize) {
        let level = self.levels.last().expect("cursor always has a level");
        (&level.siblings, level.index)
    }

    /// Depth below the starting node.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn goto_first_child(&mut self) -> bool {
        let siblings: Vec<_> = self.node().children_with_fields().collect();
        if siblings.is_empty() {
            return false;
        }
        self.levels.push(Level { siblings, index: 0 });
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let level = self.top_mut();
        if level.index + 1 >= level.siblings.len() {
            return false;
        }
        level.index += 1;
        true
    }

    pub fn goto_prev_sibling(&mut self) -> bool {
        let level = self.top_mut();
        if level.index == 0 {
            return false;
        }
        level.index -= 1;
        true
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.levels.len() == 1 {
            return false;
        }
        self.levels.pop();
        true
    }

    fn current(&self) -> (Node<'t>, Option<FieldId>) {
        let level = self.levels.last().expect("cursor always has a level");
        level.siblings[level.index]
    }

    fn top_mut(&mut self) -> &mut Level<'t> {
        self.levels.last_mut().expect("cursor always has a level")
    }
}
