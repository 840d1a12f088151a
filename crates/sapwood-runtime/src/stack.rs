//! Graph-structured parse stack.
//!
//! Each stack version is a head pointer into a DAG of immutable nodes. Forks
//! share everything below the fork point; merging two heads with the same
//! state and position produces a node with several incoming links, so one
//! head can stand for several parses of the same prefix.

use std::sync::Arc;

use sapwood_table::StateId;

use crate::scanner::ScannerState;
use crate::subtree::{Subtree, select_tree};

/// Pops explore at most this many paths through merged nodes.
const MAX_POP_PATHS: usize = 16;

#[derive(Debug)]
pub(crate) struct StackNode {
    pub state: StateId,
    /// Byte offset after everything below and including this node.
    pub position: usize,
    pub error_cost: u32,
    pub dynamic_precedence: i32,
    pub scanner_state: ScannerState,
    pub links: Vec<StackLink>,
}

#[derive(Clone, Debug)]
pub(crate) struct StackLink {
    pub node: Arc<StackNode>,
    pub subtree: Subtree,
    pub is_extra: bool,
}

/// Subtrees popped along one path, bottom to top, with their extra flags.
#[derive(Debug)]
pub(crate) struct StackPath {
    pub base: Arc<StackNode>,
    pub subtrees: Vec<(Subtree, bool)>,
}

impl StackNode {
    pub fn bottom(state: StateId) -> Arc<Self> {
        Arc::new(Self {
            state,
            position: 0,
            error_cost: 0,
            dynamic_precedence: 0,
            scanner_state: ScannerState::default(),
            links: Vec::new(),
        })
    }

    pub fn push(self: &Arc<Self>, subtree: Subtree, is_extra: bool, state: StateId) -> Arc<Self> {
        Arc::new(Self {
            state,
            position: self.position + subtree.total_len(),
            error_cost: self.error_cost + subtree.error_cost(),
            dynamic_precedence: self.dynamic_precedence + subtree.dynamic_precedence(),
            scanner_state: subtree.scanner_after().clone(),
            links: vec![StackLink {
                node: Arc::clone(self),
                subtree,
                is_extra,
            }],
        })
    }

    /// Top link of the preferred path.
    pub fn best_link(&self) -> Option<&StackLink> {
        self.links
            .iter()
            .min_by_key(|link| link.node.error_cost + link.subtree.error_cost())
    }

    /// Pops `count` non-extra subtrees along every path (up to a bound).
    ///
    /// Extras above and between the popped subtrees come along; extras below
    /// the last one stay on the stack. Paths that hit the bottom early are
    /// dropped.
    pub fn pop(self: &Arc<Self>, count: usize) -> Vec<StackPath> {
        let mut paths = Vec::new();
        let mut work = vec![(Arc::clone(self), Vec::new(), count)];

        while let Some((node, collected, remaining)) = work.pop() {
            if remaining == 0 {
                let mut subtrees: Vec<(Subtree, bool)> = collected;
                subtrees.reverse();
                paths.push(StackPath {
                    base: node,
                    subtrees,
                });
                if paths.len() >= MAX_POP_PATHS {
                    break;
                }
                continue;
            }
            for link in node.links.iter().rev() {
                let mut next = collected.clone();
                next.push((link.subtree.clone(), link.is_extra));
                let left = if link.is_extra { remaining } else { remaining - 1 };
                work.push((Arc::clone(&link.node), next, left));
            }
        }
        paths
    }

    /// Every subtree on the preferred path down to the bottom, bottom first.
    pub fn pop_all(self: &Arc<Self>) -> Vec<(Subtree, bool)> {
        let mut subtrees = Vec::new();
        let mut node = Arc::clone(self);
        while let Some(link) = node.best_link() {
            subtrees.push((link.subtree.clone(), link.is_extra));
            let next = Arc::clone(&link.node);
            node = next;
        }
        subtrees.reverse();
        subtrees
    }

    /// Combines two heads with the same state, position and scanner state.
    ///
    /// Links to the same predecessor collapse into one, keeping the subtree
    /// [`select_tree`] prefers.
    pub fn merge(left: &Arc<Self>, right: &Arc<Self>) -> Arc<Self> {
        debug_assert_eq!(left.state, right.state);
        debug_assert_eq!(left.position, right.position);

        let mut links = left.links.clone();
        for link in &right.links {
            let same = links
                .iter_mut()
                .find(|l| Arc::ptr_eq(&l.node, &link.node) && l.is_extra == link.is_extra);
            match same {
                Some(existing) => {
                    if select_tree(&existing.subtree, &link.subtree) {
                        existing.subtree = link.subtree.clone();
                    }
                }
                None => links.push(link.clone()),
            }
        }

        Arc::new(Self {
            state: left.state,
            position: left.position,
            error_cost: left.error_cost.min(right.error_cost),
            dynamic_precedence: left.dynamic_precedence.max(right.dynamic_precedence),
            scanner_state: left.scanner_state.clone(),
            links,
        })
    }

    /// Can two heads be merged into one?
    pub fn mergeable(left: &Self, right: &Self) -> bool {
        left.state == right.state
            && left.position == right.position
            && left.scanner_state == right.scanner_state
    }
}
