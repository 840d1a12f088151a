//! Matching patterns against a tree.
//!
//! A child list is matched left to right. A step may start at any later
//! sibling unless an anchor asks for adjacency, in which case only anonymous
//! nodes may sit in between. Quantified steps repeat greedily; after the
//! first repetition, each further one starts at the next sibling that
//! matches. Every way of matching the rest of a list is computed once per
//! position and memoized, keeping the preferred way to reach each end
//! position.

use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use sapwood_runtime::{FieldId, Node, TreeCursor};

use crate::Query;
use crate::pattern::{CaptureId, Expr, Item, NodeTest, Pattern, Step};

type Sibling<'t> = (Node<'t>, Option<FieldId>);

/// One node bound to a capture name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'q, 't> {
    pub index: usize,
    pub name: &'q str,
    pub node: Node<'t>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'q, 't> {
    pub pattern_index: usize,
    /// In document order; a quantified capture appears once per node.
    pub captures: Vec<QueryCapture<'q, 't>>,
}

impl<'q, 't> QueryMatch<'q, 't> {
    /// First node captured as `name`.
    pub fn capture(&self, name: &str) -> Option<Node<'t>> {
        self.nodes_for_capture(name).next()
    }

    pub fn nodes_for_capture(&self, name: &str) -> impl Iterator<Item = Node<'t>> {
        self.captures
            .iter()
            .filter(move |capture| capture.name == name)
            .map(|capture| capture.node)
    }
}

/// Lazy matches of a query in preorder. Cloning restarts from the clone's
/// position.
#[derive(Clone)]
pub struct QueryMatches<'q, 't> {
    query: &'q Query,
    text: &'q [u8],
    cursor: TreeCursor<'t>,
    /// Next pattern to try at the cursor's node.
    pattern: usize,
    done: bool,
}

impl<'q, 't> QueryMatches<'q, 't> {
    pub(crate) fn new(query: &'q Query, root: Node<'t>, text: &'q [u8]) -> Self {
        Self {
            query,
            text,
            cursor: root.walk(),
            pattern: 0,
            done: false,
        }
    }

    fn advance(&mut self) {
        if self.cursor.goto_first_child() {
            return;
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return;
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return;
            }
        }
    }
}

impl<'q, 't> Iterator for QueryMatches<'q, 't> {
    type Item = QueryMatch<'q, 't>;

    fn next(&mut self) -> Option<Self::Item> {
        let query = self.query;
        while !self.done {
            while let Some(pattern) = query.patterns.get(self.pattern) {
                let pattern_index = self.pattern;
                self.pattern += 1;

                let (siblings, at) = self.cursor.siblings();
                let Some(captures) = pattern.match_at(siblings, at, self.text) else {
                    continue;
                };
                tracing::trace!(
                    pattern = pattern_index,
                    start = siblings[at].0.start_byte(),
                    captures = captures.len(),
                    "query match"
                );
                return Some(QueryMatch {
                    pattern_index,
                    captures: captures
                        .into_iter()
                        .map(|(index, node)| QueryCapture {
                            index,
                            name: &query.capture_names[index],
                            node,
                        })
                        .collect(),
                });
            }
            self.pattern = 0;
            self.advance();
        }
        None
    }
}

impl Pattern {
    /// The preferred match starting at `siblings[at]` whose predicates hold.
    pub(crate) fn match_at<'t>(
        &self,
        siblings: &[Sibling<'t>],
        at: usize,
        text: &[u8],
    ) -> Option<Vec<(CaptureId, Node<'t>)>> {
        let mut list = ListMatcher::new(siblings);
        let branches = list.repeat(&self.root, false, &[], at, Gap::Exact, &[]);
        branches
            .iter()
            .filter(|branch| branch.end > at)
            .map(|branch| branch.captures.to_vec())
            .find(|captures| self.predicates.iter().all(|p| p.holds(captures, text)))
    }
}

/// Whether `node` satisfies `test`; on success, the captures made inside it.
fn match_node<'t>(test: &NodeTest, node: Node<'t>) -> Option<Captures<'t>> {
    if !test.kind.accepts(node) {
        return None;
    }
    if test.negated.iter().any(|&field| node.child_by_field_id(field).is_some()) {
        return None;
    }
    if test.children.is_empty() {
        return Some(Captures::default());
    }

    let children: Vec<Sibling<'t>> = node.children_with_fields().collect();
    let mut list = ListMatcher::new(&children);
    let branches = list.seq(&test.children, 0, Gap::Any, &[]);
    branches.first().map(|branch| branch.captures.clone())
}

/// Captures as a shared list, so the many ways of matching a list prefix
/// share the suffix they continue with.
#[derive(Clone, Default)]
struct Captures<'t>(Option<Rc<Link<'t>>>);

struct Link<'t> {
    capture: CaptureId,
    node: Node<'t>,
    next: Captures<'t>,
}

impl<'t> Captures<'t> {
    fn push_front(self, capture: CaptureId, node: Node<'t>) -> Self {
        Captures(Some(Rc::new(Link {
            capture,
            node,
            next: self,
        })))
    }

    /// `head` followed by `self`.
    fn after(self, head: &Captures<'t>) -> Self {
        head.to_vec()
            .into_iter()
            .rev()
            .fold(self, |list, (capture, node)| list.push_front(capture, node))
    }

    fn to_vec(&self) -> Vec<(CaptureId, Node<'t>)> {
        let mut out = Vec::new();
        let mut link = self.0.as_deref();
        while let Some(current) = link {
            out.push((current.capture, current.node));
            link = current.next.0.as_deref();
        }
        out
    }
}

/// One way of matching: where it ended and what it captured.
#[derive(Clone)]
struct Branch<'t> {
    end: usize,
    captures: Captures<'t>,
}

/// What may be skipped before the next step starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Gap {
    Any,
    /// After an anchor: anonymous nodes only.
    Anonymous,
    /// Nothing; the step starts right here.
    Exact,
}

/// Memo keys. Steps and item lists are identified by address; they live in
/// the query for the whole match.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    Seq { items: usize, len: usize, pos: usize, gap: Gap },
    Repeat { step: usize, more: bool, pos: usize, gap: Gap },
    Single { step: usize, at: usize },
}

type Branches<'t> = Rc<[Branch<'t>]>;

/// Matches steps against one list of siblings.
struct ListMatcher<'a, 't> {
    siblings: &'a [Sibling<'t>],
    memo: HashMap<Key, Branches<'t>>,
}

impl<'a, 't> ListMatcher<'a, 't> {
    fn new(siblings: &'a [Sibling<'t>]) -> Self {
        Self {
            siblings,
            memo: HashMap::new(),
        }
    }

    /// Every way `items` can match from `pos` on.
    fn seq(&mut self, items: &[Item], pos: usize, gap: Gap, outer: &[CaptureId]) -> Branches<'t> {
        let key = Key::Seq {
            items: items.as_ptr() as usize,
            len: items.len(),
            pos,
            gap,
        };
        if let Some(hit) = self.memo.get(&key) {
            return Rc::clone(hit);
        }

        let branches = match items.split_first() {
            None => self.end_of_list(pos, gap),
            Some((Item::Anchor, rest)) => self.seq(rest, pos, Gap::Anonymous, outer),
            Some((Item::Step(step), rest)) => self.repeat(step, false, rest, pos, gap, outer),
        };
        self.memo.insert(key, Rc::clone(&branches));
        branches
    }

    /// A trailing anchor only lets anonymous nodes follow.
    fn end_of_list(&self, pos: usize, gap: Gap) -> Branches<'t> {
        if gap == Gap::Anonymous && self.siblings[pos..].iter().any(|(node, _)| node.is_named()) {
            return Vec::new().into();
        }
        vec![Branch {
            end: pos,
            captures: Captures::default(),
        }]
        .into()
    }

    /// `step` followed by `rest`. `more` is set once `step` has matched at
    /// least once.
    fn repeat(
        &mut self,
        step: &Step,
        more: bool,
        rest: &[Item],
        pos: usize,
        gap: Gap,
        outer: &[CaptureId],
    ) -> Branches<'t> {
        let key = Key::Repeat {
            step: step as *const Step as usize,
            more,
            pos,
            gap,
        };
        if let Some(hit) = self.memo.get(&key) {
            return Rc::clone(hit);
        }

        let mut branches = Vec::new();
        if !more || step.quantifier.repeats() {
            for start in self.starts(pos, gap) {
                let heads = self.single(step, start, outer);
                let mut matched = false;
                for head in heads.iter().filter(|head| head.end > start) {
                    matched = true;
                    let tails = self.repeat(step, true, rest, head.end, Gap::Any, outer);
                    branches.extend(tails.iter().map(|tail| Branch {
                        end: tail.end,
                        captures: tail.captures.clone().after(&head.captures),
                    }));
                }
                if matched && more {
                    break;
                }
            }
        }
        if more || step.quantifier.min() == 0 {
            branches.extend(self.seq(rest, pos, gap, outer).iter().cloned());
        }

        let branches = dedup(branches, self.siblings.len());
        self.memo.insert(key, Rc::clone(&branches));
        branches
    }

    /// Every way `step` matches starting exactly at `siblings[at]`.
    fn single(&mut self, step: &Step, at: usize, outer: &[CaptureId]) -> Branches<'t> {
        let key = Key::Single {
            step: step as *const Step as usize,
            at,
        };
        if let Some(hit) = self.memo.get(&key) {
            return Rc::clone(hit);
        }
        let branches = self.single_uncached(step, at, outer);
        self.memo.insert(key, Rc::clone(&branches));
        branches
    }

    fn single_uncached(&mut self, step: &Step, at: usize, outer: &[CaptureId]) -> Branches<'t> {
        let Some(&(node, field)) = self.siblings.get(at) else {
            return Vec::new().into();
        };
        if step.field.is_some() && step.field != field {
            return Vec::new().into();
        }
        let captures: Vec<CaptureId> = outer.iter().chain(&step.captures).copied().collect();

        match &step.expr {
            Expr::Node(test) => match match_node(test, node) {
                Some(inner) => vec![Branch {
                    end: at + 1,
                    captures: captures
                        .iter()
                        .rev()
                        .fold(inner, |list, &capture| list.push_front(capture, node)),
                }]
                .into(),
                None => Vec::new().into(),
            },
            Expr::Alt(alternatives) => {
                let mut branches = Vec::new();
                for alternative in alternatives {
                    let matched = self.repeat(alternative, false, &[], at, Gap::Exact, &captures);
                    branches.extend(matched.iter().cloned());
                }
                dedup(branches, self.siblings.len())
            }
            Expr::Group(items) => self.seq(items, at, Gap::Exact, &captures),
        }
    }

    fn starts(&self, pos: usize, gap: Gap) -> Range<usize> {
        let len = self.siblings.len();
        match gap {
            Gap::Any => pos..len,
            Gap::Exact => pos..(pos + 1).min(len),
            Gap::Anonymous => {
                let stop = self.siblings[pos..]
                    .iter()
                    .position(|(node, _)| node.is_named())
                    .map_or(len, |i| pos + i + 1);
                pos..stop
            }
        }
    }
}

/// Keeps the first branch reaching each end position.
fn dedup<'t>(branches: Vec<Branch<'t>>, len: usize) -> Branches<'t> {
    let mut seen = vec![false; len + 1];
    branches
        .into_iter()
        .filter(|branch| !std::mem::replace(&mut seen[branch.end], true))
        .collect()
}
