//! The tree of sections discovered while replaying a test body.

use crate::test::Location;
use std::collections::HashSet;

/// Index of a section node in its [`SectionTree`].
pub(crate) type NodeId = usize;

#[derive(Debug, Copy, Clone, PartialEq)]
enum SectionState {
    Found,
    Completed,
}

/// An assertion outcome within the scope of a section.
///
/// `occurrence` tells apart the evaluations of the same assertion in a
/// single replay of the scope, e.g. inside a loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct AssertionSite {
    pub(crate) location: Location,
    pub(crate) occurrence: usize,
    pub(crate) passed: bool,
}

#[derive(Debug)]
struct SectionData {
    description: String,
    state: SectionState,
    children: Vec<NodeId>,
    visits: usize,
    reported: HashSet<AssertionSite>,
}

impl SectionData {
    fn new(description: &str) -> Self {
        Self {
            description: description.to_owned(),
            state: SectionState::Found,
            children: vec![],
            visits: 0,
            reported: HashSet::new(),
        }
    }
}

/// Sections of a single test, keyed by their declaration order.
///
/// Nodes are never removed while the test runs. A child is identified by its
/// position among the sections declared in its parent, so the description
/// passed to a section may change between replays without creating a new node.
#[derive(Debug)]
pub(crate) struct SectionTree {
    nodes: Vec<SectionData>,
}

impl SectionTree {
    pub(crate) const ROOT: NodeId = 0;

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![SectionData::new("")],
        }
    }

    /// Return the `index`-th child of `parent`, creating it on first encounter.
    pub(crate) fn child(&mut self, parent: NodeId, index: usize, description: &str) -> NodeId {
        let existing = self.nodes[parent].children.get(index).copied();
        if let Some(id) = existing {
            let data = &mut self.nodes[id];
            if data.description != description {
                data.description.clear();
                data.description.push_str(description);
            }
            return id;
        }

        debug_assert_eq!(self.nodes[parent].children.len(), index);
        let id = self.nodes.len();
        self.nodes.push(SectionData::new(description));
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn description(&self, id: NodeId) -> &str {
        &self.nodes[id].description
    }

    pub(crate) fn num_children(&self, id: NodeId) -> usize {
        self.nodes[id].children.len()
    }

    pub(crate) fn is_completed(&self, id: NodeId) -> bool {
        self.nodes[id].state == SectionState::Completed
    }

    /// Record that the body of `id` is being executed, returning the number
    /// of replays that have executed it so far (including this one).
    pub(crate) fn visit(&mut self, id: NodeId) -> usize {
        let data = &mut self.nodes[id];
        data.visits += 1;
        data.visits
    }

    /// Remember an assertion outcome of the scope `id`, returning `false`
    /// if an earlier replay already reported it.
    pub(crate) fn report(&mut self, id: NodeId, site: AssertionSite) -> bool {
        self.nodes[id].reported.insert(site)
    }

    pub(crate) fn mark_completed(&mut self, id: NodeId) {
        self.nodes[id].state = SectionState::Completed;
    }

    /// Mark `id` as completed if all of its known children are.
    pub(crate) fn check_completed(&mut self, id: NodeId) -> bool {
        let completed = self.nodes[id]
            .children
            .iter()
            .all(|&child| self.nodes[child].state == SectionState::Completed);
        if completed {
            self.mark_completed(id);
        }
        completed
    }
}
