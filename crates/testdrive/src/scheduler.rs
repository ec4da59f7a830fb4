//! Selection of the path executed by each replay of a test body.

use crate::{
    context::{Context, RunState},
    report::TestSummary,
    reporter::Reporter,
    section::{AssertionSite, NodeId, SectionTree},
    test::{Location, Test},
};
use maybe_unwind::maybe_unwind;
use std::{collections::HashMap, mem, panic::AssertUnwindSafe};

/// Traversal state of one nesting level during the running replay.
#[derive(Debug)]
struct Cursor {
    node: NodeId,
    seen: usize,
    target: Option<usize>,
    occurrences: HashMap<Location, usize>,
}

impl Cursor {
    fn new(node: NodeId) -> Self {
        Self {
            node,
            seen: 0,
            target: None,
            occurrences: HashMap::new(),
        }
    }
}

/// The decision taken for a section declaration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Selection {
    pub(crate) node: NodeId,
    pub(crate) index: usize,
    pub(crate) enter: bool,
}

/// Chooses which section is entered at each level and tracks exploration.
///
/// Every replay enters, at each level it reaches, the first child whose
/// subtree has not been fully explored yet and skips the others. A level is
/// fully explored once all of its known children are, or immediately if the
/// replay did not enter any child of it.
#[derive(Debug)]
pub(crate) struct Scheduler {
    tree: SectionTree,
    cursor: Cursor,
    parents: Vec<Cursor>,
    replays: usize,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            tree: SectionTree::new(),
            cursor: Cursor::new(SectionTree::ROOT),
            parents: vec![],
            replays: 0,
        }
    }

    /// Return whether every leaf of the test has been visited.
    pub(crate) fn is_completed(&self) -> bool {
        self.tree.is_completed(SectionTree::ROOT)
    }

    pub(crate) fn replays(&self) -> usize {
        self.replays
    }

    /// Nesting depth of the running scope, `0` for the test body itself.
    pub(crate) fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Position of the next section declared in the running scope.
    pub(crate) fn next_index(&self) -> usize {
        self.cursor.seen
    }

    /// Register an assertion outcome in the running scope, returning whether
    /// an earlier replay already reported the same outcome for it.
    pub(crate) fn is_recount(&mut self, location: Location, passed: bool) -> bool {
        let occurrence = self.cursor.occurrences.entry(location).or_insert(0);
        let site = AssertionSite {
            location,
            occurrence: *occurrence,
            passed,
        };
        *occurrence += 1;
        !self.tree.report(self.cursor.node, site)
    }

    /// Description of the innermost running section, if any.
    pub(crate) fn current_section(&self) -> Option<&str> {
        if self.parents.is_empty() {
            None
        } else {
            Some(self.tree.description(self.cursor.node))
        }
    }

    pub(crate) fn begin_replay(&mut self) {
        debug_assert!(self.parents.is_empty());
        self.replays += 1;
        self.cursor = Cursor::new(SectionTree::ROOT);
        self.tree.visit(SectionTree::ROOT);
        log::trace!("starting replay #{}", self.replays);
    }

    /// Finish the running replay, returning whether the test is completed.
    pub(crate) fn end_replay(&mut self) -> bool {
        debug_assert!(self.parents.is_empty());
        self.finish_level();
        let completed = self.is_completed();
        if completed {
            log::debug!("all sections explored after {} replays", self.replays);
        }
        completed
    }

    /// Decide whether the next section declared in the running scope is entered.
    pub(crate) fn select(&mut self, description: &str) -> Selection {
        let index = self.cursor.seen;
        self.cursor.seen += 1;

        let node = self.tree.child(self.cursor.node, index, description);
        let enter = self.cursor.target.is_none() && !self.tree.is_completed(node);
        if enter {
            self.cursor.target = Some(index);
        }
        log::trace!(
            "{} section #{} {:?}",
            if enter { "entering" } else { "skipping" },
            index,
            description
        );

        Selection { node, index, enter }
    }

    /// Start executing the body of a selected section, returning the number of
    /// replays that have executed it so far.
    pub(crate) fn push(&mut self, node: NodeId) -> usize {
        let parent = mem::replace(&mut self.cursor, Cursor::new(node));
        self.parents.push(parent);
        self.tree.visit(node)
    }

    /// Leave the body of the innermost section, returning whether its subtree
    /// is now fully explored.
    pub(crate) fn pop(&mut self) -> bool {
        let completed = self.finish_level();
        if let Some(parent) = self.parents.pop() {
            self.cursor = parent;
        }
        completed
    }

    fn finish_level(&mut self) -> bool {
        let node = self.cursor.node;
        let completed = match self.cursor.target {
            Some(..) => self.tree.check_completed(node),
            None => {
                self.tree.mark_completed(node);
                true
            }
        };
        if completed {
            log::debug!(
                "section {:?} is fully explored ({} children)",
                self.tree.description(node),
                self.tree.num_children(node)
            );
        }
        completed
    }
}

/// Replay the body of `test` until every leaf section has been visited.
///
/// A panic escaping the body fails the test and stops its replays, unless
/// it comes from exceeding a structural limit, which is raised again.
pub(crate) fn drive(test: &Test, reporter: &mut dyn Reporter, state: &mut RunState) -> TestSummary {
    reporter.test_starting(test.desc());

    loop {
        state.begin_replay();
        let panicked = {
            let mut ctx = Context::new(state, &mut *reporter);
            match maybe_unwind(AssertUnwindSafe(|| test.call(&mut ctx))) {
                Ok(result) => {
                    ctx.settle(result);
                    false
                }
                Err(unwind) => {
                    ctx.panicked(&unwind);
                    true
                }
            }
        };
        if panicked || state.end_replay() {
            break;
        }
    }

    let summary = state.summary(test.desc());
    reporter.test_ended(&summary);
    summary
}
