use crate::{
    assertion::{Abort, AssertionOutcome},
    config::Config,
    report::TestSummary,
    reporter::{Reporter, SectionInfo},
    scheduler::Scheduler,
    test::{Location, TestDesc},
};
use maybe_unwind::Unwind;
use std::fmt;

/// The state of a test run shared by all of its replays.
#[derive(Debug)]
pub(crate) struct RunState {
    scheduler: Scheduler,
    config: Config,
    aborting: bool,
    overflow: Option<String>,
    replay_assertions: usize,
    successful: usize,
    total: usize,
    failed: bool,
}

impl RunState {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            scheduler: Scheduler::new(),
            config: config.clone(),
            aborting: false,
            overflow: None,
            replay_assertions: 0,
            successful: 0,
            total: 0,
            failed: false,
        }
    }

    pub(crate) fn begin_replay(&mut self) {
        self.aborting = false;
        self.replay_assertions = 0;
        self.scheduler.begin_replay();
    }

    pub(crate) fn end_replay(&mut self) -> bool {
        self.scheduler.end_replay()
    }

    pub(crate) fn summary(&self, desc: &TestDesc) -> TestSummary {
        TestSummary {
            desc: desc.clone(),
            passed: !self.failed,
            replays: self.scheduler.replays(),
            successful: self.successful,
            total: self.total,
        }
    }

    fn record(&mut self, passed: bool, recount: bool) {
        if !passed {
            self.failed = true;
        }
        if !recount {
            self.total += 1;
            if passed {
                self.successful += 1;
            }
        }
    }

    /// Stop the run after a structural limit was exceeded.
    fn overflow(&mut self, message: String) -> ! {
        self.overflow = Some(message.clone());
        panic!("{}", message);
    }
}

/// Context values while running a test body.
///
/// A `Context` is handed to the test body on every replay and to the body
/// of every entered section. It is the only way to declare sections and
/// evaluate assertions.
pub struct Context<'a> {
    run: &'a mut RunState,
    reporter: &'a mut dyn Reporter,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.run.scheduler.depth())
            .field("current_section", &self.run.scheduler.current_section())
            .field("aborting", &self.run.aborting)
            .finish()
    }
}

impl<'a> Context<'a> {
    pub(crate) fn new(run: &'a mut RunState, reporter: &'a mut dyn Reporter) -> Self {
        Self { run, reporter }
    }

    /// Declare a section.
    ///
    /// The body is executed only when the current replay is scheduled to go
    /// through this section; otherwise it is dropped without being called.
    /// An [`Abort`] returned from the body stops the body and is absorbed
    /// here, so the code following the section keeps running.
    ///
    /// # Panics
    ///
    /// Panics if the enclosing scope declares more sections than
    /// [`Config::max_sections`].
    pub fn section<F>(&mut self, description: &str, body: F)
    where
        F: FnOnce(&mut Context<'_>) -> Result<(), Abort>,
    {
        if self.run.aborting {
            return;
        }

        let index = self.run.scheduler.next_index();
        if index >= self.run.config.max_sections {
            self.run.overflow(format!(
                "too many sections: declaring {:?} exceeds the limit of {} sections per scope",
                description, self.run.config.max_sections
            ));
        }

        let depth = self.run.scheduler.depth() + 1;
        let selection = self.run.scheduler.select(description);
        if !selection.enter {
            self.reporter.section_skipped(&SectionInfo {
                description,
                index: selection.index,
                depth,
                first_entry: false,
            });
            return;
        }

        let visits = self.run.scheduler.push(selection.node);
        let info = SectionInfo {
            description,
            index: selection.index,
            depth,
            first_entry: visits == 1,
        };
        self.reporter.section_entered(&info);

        let result = body(self);
        self.settle(result);

        let completed = self.run.scheduler.pop();
        self.reporter.section_exited(&info, completed);
    }

    /// Assert that `condition` holds.
    ///
    /// On failure, the outcome is reported and `Err(Abort)` is returned,
    /// which should be propagated with `?`.
    ///
    /// # Panics
    ///
    /// Panics if the replay evaluates more assertions than
    /// [`Config::max_assertions`].
    pub fn require(&mut self, condition: bool, expr: &str, location: Location) -> Result<(), Abort> {
        self.evaluate(condition, false, expr, location)
    }

    /// Assert that `condition` does *not* hold, then stop the running scope.
    ///
    /// The outcome is reported as with [`require`](Context::require), but
    /// `Err(Abort)` is returned whether the assertion succeeded or not, so
    /// this should be the last statement of the scope.
    ///
    /// # Panics
    ///
    /// Panics if the replay evaluates more assertions than
    /// [`Config::max_assertions`].
    pub fn require_fail(
        &mut self,
        condition: bool,
        expr: &str,
        location: Location,
    ) -> Result<(), Abort> {
        self.evaluate(condition, true, expr, location)
    }

    /// Report an unconditional failure with the given message and stop the
    /// running scope.
    pub fn fail(&mut self, message: fmt::Arguments<'_>, location: Location) -> Result<(), Abort> {
        let message = message.to_string();
        self.evaluate(false, false, &message, location)
    }

    /// Return the description of the innermost running section, or `None`
    /// while running the test body outside of any section.
    pub fn current_section(&self) -> Option<&str> {
        self.run.scheduler.current_section()
    }

    /// Return the nesting depth of the running scope, `0` for the test body.
    pub fn depth(&self) -> usize {
        self.run.scheduler.depth()
    }

    fn evaluate(
        &mut self,
        condition: bool,
        inverted: bool,
        expr: &str,
        location: Location,
    ) -> Result<(), Abort> {
        if self.run.aborting {
            return Err(Abort::new());
        }

        if self.run.replay_assertions >= self.run.config.max_assertions {
            self.run.overflow(format!(
                "too many assertions: {} at {} exceeds the limit of {} assertions per replay",
                expr, location, self.run.config.max_assertions
            ));
        }
        self.run.replay_assertions += 1;

        let passed = condition != inverted;
        let outcome = AssertionOutcome {
            expr,
            location,
            condition,
            inverted,
            recount: self.run.scheduler.is_recount(location, passed),
        };
        self.reporter.assertion_attempted(&outcome);

        self.run.record(passed, outcome.recount);
        if passed {
            self.reporter.assertion_passed(&outcome);
        } else {
            log::debug!("assertion failed: {} ({})", expr, location);
            self.reporter.assertion_failed(&outcome);
        }

        if passed && !inverted {
            Ok(())
        } else {
            self.run.aborting = true;
            Err(Abort::new())
        }
    }

    /// Absorb the result of a body at its frame boundary.
    pub(crate) fn settle(&mut self, result: Result<(), Abort>) {
        if let Err(abort) = result {
            if let Some(err) = abort.into_error() {
                log::debug!("section body returned an error: {}", err);
                self.run.record(false, false);
                self.reporter.error_raised(&err);
            }
        }
        self.run.aborting = false;
    }

    /// Report a panic escaping the body of the running replay.
    pub(crate) fn panicked(&mut self, unwind: &Unwind) {
        if let Some(message) = self.run.overflow.take() {
            panic!("{}", message);
        }
        let err = anyhow::anyhow!("test panicked: {}", unwind);
        log::debug!("{}", err);
        self.run.record(false, false);
        self.reporter.error_raised(&err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        report::Summary,
        reporter::SectionInfo,
        test::{Test, TestDesc},
        Session,
    };
    use std::{
        cell::{Cell, RefCell},
        io,
        rc::Rc,
    };

    type History = Rc<RefCell<Vec<(&'static str, Option<String>)>>>;

    fn append_history(history: &History, ctx: &Context<'_>, msg: &'static str) {
        let current_section = ctx.current_section().map(ToOwned::to_owned);
        history.borrow_mut().push((msg, current_section));
    }

    fn loc() -> Location {
        Location {
            file: "context.rs",
            line: 1,
            column: 1,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Entered(String, bool),
        Skipped(String),
        Exited(String, bool),
        Attempted(String),
        Passed(String, bool),
        Failed(String),
        Errored(String),
        Ended(bool, usize),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Reporter for Recorder {
        fn test_starting(&mut self, _: &TestDesc) {}

        fn section_entered(&mut self, section: &SectionInfo<'_>) {
            self.events
                .push(Event::Entered(section.description.into(), section.first_entry));
        }

        fn section_skipped(&mut self, section: &SectionInfo<'_>) {
            self.events.push(Event::Skipped(section.description.into()));
        }

        fn section_exited(&mut self, section: &SectionInfo<'_>, completed: bool) {
            self.events
                .push(Event::Exited(section.description.into(), completed));
        }

        fn assertion_attempted(&mut self, assertion: &AssertionOutcome<'_>) {
            self.events.push(Event::Attempted(assertion.expr.into()));
        }

        fn assertion_passed(&mut self, assertion: &AssertionOutcome<'_>) {
            self.events
                .push(Event::Passed(assertion.expr.into(), assertion.recount));
        }

        fn assertion_failed(&mut self, assertion: &AssertionOutcome<'_>) {
            self.events.push(Event::Failed(assertion.expr.into()));
        }

        fn error_raised(&mut self, error: &anyhow::Error) {
            self.events.push(Event::Errored(error.to_string()));
        }

        fn test_ended(&mut self, summary: &TestSummary) {
            self.events
                .push(Event::Ended(summary.is_passed(), summary.replays()));
        }
    }

    fn run(test: &Test) -> (TestSummary, Vec<Event>) {
        run_with_config(test, Config::default())
    }

    fn run_with_config(test: &Test, config: Config) -> (TestSummary, Vec<Event>) {
        let mut recorder = Recorder::default();
        let summary = {
            let mut sess = Session::with_reporter(&mut recorder);
            sess.set_config(config);
            sess.run_test(test);
            let Summary { mut passed, mut failed, .. } = sess.into_summary();
            passed.pop().or_else(|| failed.pop()).unwrap()
        };
        (summary, recorder.events)
    }

    fn count_of(events: &[Event], target: &Event) -> usize {
        events.iter().filter(|event| *event == target).count()
    }

    #[test]
    fn no_section() {
        let history = History::default();
        let test = Test::new("no_section", "no section", {
            let history = history.clone();
            move |ctx| {
                append_history(&history, ctx, "test");
                Ok(())
            }
        });

        let (summary, _) = run(&test);
        assert!(summary.is_passed());
        assert_eq!(summary.replays(), 1);
        assert_eq!(*history.borrow(), vec![("test", None)]);
    }

    #[test]
    fn one_section() {
        let history = History::default();
        let test = Test::new("one_section", "one section", {
            let history = history.clone();
            move |ctx| {
                append_history(&history, ctx, "setup");
                ctx.section("section1", |ctx| {
                    append_history(&history, ctx, "section1");
                    Ok(())
                });
                append_history(&history, ctx, "teardown");
                Ok(())
            }
        });

        let (summary, _) = run(&test);
        assert_eq!(summary.replays(), 1);
        assert_eq!(
            *history.borrow(),
            vec![
                ("setup", None),
                ("section1", Some("section1".into())),
                ("teardown", None),
            ]
        );
    }

    #[test]
    fn multi_section() {
        let history = History::default();
        let test = Test::new("multi_section", "multi section", {
            let history = history.clone();
            move |ctx| {
                append_history(&history, ctx, "setup");
                ctx.section("section1", |ctx| {
                    append_history(&history, ctx, "section1");
                    Ok(())
                });
                ctx.section("section2", |ctx| {
                    append_history(&history, ctx, "section2");
                    Ok(())
                });
                append_history(&history, ctx, "teardown");
                Ok(())
            }
        });

        let (summary, _) = run(&test);
        assert_eq!(summary.replays(), 2);
        assert_eq!(
            *history.borrow(),
            vec![
                // replay 1
                ("setup", None),
                ("section1", Some("section1".into())),
                ("teardown", None),
                // replay 2
                ("setup", None),
                ("section2", Some("section2".into())),
                ("teardown", None),
            ]
        );
    }

    #[test]
    fn nested_section() {
        let history = History::default();
        let test = Test::new("nested_section", "nested section", {
            let history = history.clone();
            move |ctx| {
                append_history(&history, ctx, "setup");
                ctx.section("section1", |ctx| {
                    append_history(&history, ctx, "section1:setup");
                    ctx.section("section2", |ctx| {
                        append_history(&history, ctx, "section2");
                        Ok(())
                    });
                    ctx.section("section3", |ctx| {
                        append_history(&history, ctx, "section3");
                        Ok(())
                    });
                    append_history(&history, ctx, "section1:teardown");
                    Ok(())
                });
                ctx.section("section4", |ctx| {
                    append_history(&history, ctx, "section4");
                    Ok(())
                });
                append_history(&history, ctx, "teardown");
                Ok(())
            }
        });

        let (summary, _) = run(&test);
        assert_eq!(summary.replays(), 3);
        assert_eq!(
            *history.borrow(),
            vec![
                // replay 1
                ("setup", None),
                ("section1:setup", Some("section1".into())),
                ("section2", Some("section2".into())),
                ("section1:teardown", Some("section1".into())),
                ("teardown", None),
                // replay 2
                ("setup", None),
                ("section1:setup", Some("section1".into())),
                ("section3", Some("section3".into())),
                ("section1:teardown", Some("section1".into())),
                ("teardown", None),
                // replay 3
                ("setup", None),
                ("section4", Some("section4".into())),
                ("teardown", None),
            ]
        );
    }

    #[test]
    fn uneven_depth_replays_once_per_leaf() {
        let setups = Rc::new(RefCell::new(0));
        let test = Test::new("uneven", "uneven depth", {
            let setups = setups.clone();
            move |ctx| {
                *setups.borrow_mut() += 1;
                ctx.section("shallow", |_| Ok(()));
                ctx.section("deep", |ctx| {
                    ctx.section("a", |ctx| {
                        ctx.section("a1", |_| Ok(()));
                        ctx.section("a2", |_| Ok(()));
                        Ok(())
                    });
                    ctx.section("b", |_| Ok(()));
                    Ok(())
                });
                Ok(())
            }
        });

        // leaves: shallow, deep/a/a1, deep/a/a2, deep/b
        let (summary, _) = run(&test);
        assert_eq!(summary.replays(), 4);
        assert_eq!(*setups.borrow(), 4);
    }

    #[test]
    fn shared_setup_runs_once_per_leaf_beneath() {
        let counts = Rc::new(RefCell::new((0, 0)));
        let test = Test::new("setup", "shared setup", {
            let counts = counts.clone();
            move |ctx| {
                ctx.section("outer", |ctx| {
                    counts.borrow_mut().0 += 1;
                    ctx.section("x", |_| Ok(()));
                    ctx.section("y", |_| Ok(()));
                    ctx.section("z", |_| Ok(()));
                    counts.borrow_mut().1 += 1;
                    Ok(())
                });
                ctx.section("other", |_| Ok(()));
                Ok(())
            }
        });

        let (summary, _) = run(&test);
        assert_eq!(summary.replays(), 4);
        assert_eq!(*counts.borrow(), (3, 3));
    }

    #[test]
    fn skipped_sections_emit_no_assertions() {
        let test = Test::new("skip", "skip purity", |ctx| {
            ctx.section("a", |ctx| ctx.require(true, "in a", loc()));
            ctx.section("b", |ctx| ctx.require(true, "in b", loc()));
            Ok(())
        });

        let (_, events) = run(&test);
        assert_eq!(
            events,
            vec![
                // replay 1
                Event::Entered("a".into(), true),
                Event::Attempted("in a".into()),
                Event::Passed("in a".into(), false),
                Event::Exited("a".into(), true),
                Event::Skipped("b".into()),
                // replay 2
                Event::Skipped("a".into()),
                Event::Entered("b".into(), true),
                Event::Attempted("in b".into()),
                Event::Passed("in b".into(), false),
                Event::Exited("b".into(), true),
                Event::Ended(true, 2),
            ]
        );
    }

    #[test]
    fn failure_is_contained_in_its_section() {
        let reached = Rc::new(RefCell::new(vec![]));
        let test = Test::new("contain", "abort containment", {
            let reached = reached.clone();
            move |ctx| {
                ctx.section("outer", |ctx| {
                    ctx.section("failing", |ctx| {
                        ctx.require(false, "false", loc())?;
                        reached.borrow_mut().push("after failure");
                        Ok(())
                    });
                    ctx.section("sibling", |_| {
                        reached.borrow_mut().push("sibling");
                        Ok(())
                    });
                    reached.borrow_mut().push("outer:teardown");
                    Ok(())
                });
                ctx.section("uncle", |_| {
                    reached.borrow_mut().push("uncle");
                    Ok(())
                });
                Ok(())
            }
        });

        let (summary, events) = run(&test);
        assert!(!summary.is_passed());
        assert_eq!(summary.replays(), 3);
        assert_eq!(
            *reached.borrow(),
            vec!["outer:teardown", "sibling", "outer:teardown", "uncle"]
        );
        assert_eq!(count_of(&events, &Event::Failed("false".into())), 1);
    }

    #[test]
    fn failure_before_nested_section_leaves_it_unvisited() {
        let reached = Rc::new(RefCell::new(vec![]));
        let test = Test::new("scenario_b", "nested sections after a failure", {
            let reached = reached.clone();
            move |ctx| {
                ctx.section("B", |ctx| {
                    ctx.section("B.A", |ctx| {
                        ctx.require(false, "false", loc())?;
                        ctx.section("B.A.A", |_| {
                            reached.borrow_mut().push("B.A.A");
                            Ok(())
                        });
                        Ok(())
                    });
                    ctx.section("B.B", |_| {
                        reached.borrow_mut().push("B.B");
                        Ok(())
                    });
                    Ok(())
                });
                Ok(())
            }
        });

        let (summary, events) = run(&test);
        // leaves of the discovered tree: B.A and B.B
        assert_eq!(summary.replays(), 2);
        assert_eq!(*reached.borrow(), vec!["B.B"]);
        assert_eq!(count_of(&events, &Event::Failed("false".into())), 1);
        assert_eq!(count_of(&events, &Event::Exited("B.A".into(), true)), 1);
        assert!(!events.contains(&Event::Entered("B.A.A".into(), true)));
    }

    #[test]
    fn sections_after_a_failure_in_the_same_scope_are_never_discovered() {
        let reached = Rc::new(RefCell::new(vec![]));
        let test = Test::new("after", "sections after a failure", {
            let reached = reached.clone();
            move |ctx| {
                ctx.section("first", |_| {
                    reached.borrow_mut().push("first");
                    Ok(())
                });
                ctx.require(false, "false", loc())?;
                ctx.section("second", |_| {
                    reached.borrow_mut().push("second");
                    Ok(())
                });
                Ok(())
            }
        });

        let (summary, _) = run(&test);
        assert_eq!(summary.replays(), 1);
        assert_eq!(*reached.borrow(), vec!["first"]);
    }

    #[test]
    fn require_fail_records_success_and_aborts() {
        let reached = Rc::new(RefCell::new(vec![]));
        let test = Test::new("scenario_c", "inverted assertion", {
            let reached = reached.clone();
            move |ctx| {
                ctx.section("a", |ctx| {
                    ctx.require_fail(false, "false", loc())?;
                    reached.borrow_mut().push("after require_fail");
                    Ok(())
                });
                reached.borrow_mut().push("teardown");
                Ok(())
            }
        });

        let (summary, events) = run(&test);
        assert!(summary.is_passed());
        assert_eq!(summary.assertions(), (1, 1));
        assert_eq!(*reached.borrow(), vec!["teardown"]);
        assert!(events.contains(&Event::Passed("false".into(), false)));
    }

    #[test]
    fn require_fail_with_true_condition_fails() {
        let test = Test::new("inverted", "inverted failure", |ctx| {
            ctx.require_fail(true, "true", loc())
        });

        let (summary, events) = run(&test);
        assert!(!summary.is_passed());
        assert_eq!(summary.assertions(), (0, 1));
        assert!(events.contains(&Event::Failed("true".into())));
    }

    #[test]
    fn swallowed_abort_still_stops_the_scope() {
        let reached = Rc::new(RefCell::new(vec![]));
        let test = Test::new("swallow", "swallowed abort", {
            let reached = reached.clone();
            move |ctx| {
                ctx.section("a", |ctx| {
                    let _ = ctx.require(false, "first", loc());
                    let second = ctx.require(true, "second", loc());
                    assert!(second.is_err());
                    ctx.section("nested", |_| {
                        reached.borrow_mut().push("nested");
                        Ok(())
                    });
                    Ok(())
                });
                ctx.section("b", |ctx| ctx.require(true, "in b", loc()));
                Ok(())
            }
        });

        let (summary, events) = run(&test);
        assert_eq!(summary.replays(), 2);
        assert!(reached.borrow().is_empty());
        assert!(!events.contains(&Event::Attempted("second".into())));
        assert!(events.contains(&Event::Passed("in b".into(), false)));
    }

    #[test]
    fn shared_assertions_are_counted_once() {
        let test = Test::new("recount", "recount", |ctx| {
            ctx.require(true, "shared", loc())?;
            ctx.section("a", |ctx| ctx.require(true, "in a", loc()));
            ctx.section("b", |ctx| ctx.require(true, "in b", loc()));
            Ok(())
        });

        let (summary, events) = run(&test);
        assert_eq!(summary.assertions(), (3, 3));
        assert_eq!(count_of(&events, &Event::Passed("shared".into(), false)), 1);
        assert_eq!(count_of(&events, &Event::Passed("shared".into(), true)), 1);
    }

    #[test]
    fn conditional_assertions_are_counted_when_first_reached() {
        let test = Test::new("conditional", "conditional assertion", |ctx| {
            let hit = Cell::new(false);
            ctx.section("a", |ctx| {
                ctx.section("a1", |_| {
                    hit.set(true);
                    Ok(())
                });
                ctx.section("a2", |_| Ok(()));
                Ok(())
            });
            if !hit.get() {
                ctx.require(true, "only without a1", loc())?;
            }
            Ok(())
        });

        let (summary, events) = run(&test);
        assert_eq!(summary.replays(), 2);
        assert_eq!(summary.assertions(), (1, 1));
        assert_eq!(
            count_of(&events, &Event::Passed("only without a1".into(), false)),
            1
        );
    }

    #[test]
    fn failing_teardown_is_counted_once() {
        let test = Test::new("teardown", "failing teardown", |ctx| {
            ctx.section("a", |_| Ok(()));
            ctx.section("b", |_| Ok(()));
            ctx.section("c", |_| Ok(()));
            ctx.require(false, "teardown", loc())
        });

        let (summary, events) = run(&test);
        assert!(!summary.is_passed());
        assert_eq!(summary.replays(), 3);
        assert_eq!(summary.assertions(), (0, 1));
        assert_eq!(count_of(&events, &Event::Failed("teardown".into())), 3);
    }

    #[test]
    fn outcome_changes_are_counted_per_outcome() {
        let test = Test::new("flaky", "outcome change across replays", |ctx| {
            let in_b = Cell::new(false);
            ctx.section("a", |_| Ok(()));
            ctx.section("b", |_| {
                in_b.set(true);
                Ok(())
            });
            ctx.require(!in_b.get(), "not in b", loc())
        });

        let (summary, _) = run(&test);
        assert!(!summary.is_passed());
        assert_eq!(summary.assertions(), (1, 2));
    }

    #[test]
    fn panics_fail_the_test_and_stop_its_replays() {
        let reached = Rc::new(RefCell::new(vec![]));
        let test = Test::new("panic", "panicking body", {
            let reached = reached.clone();
            move |ctx| {
                ctx.section("a", |_| {
                    reached.borrow_mut().push("a");
                    panic!("boom");
                });
                ctx.section("b", |_| {
                    reached.borrow_mut().push("b");
                    Ok(())
                });
                Ok(())
            }
        });

        let (summary, events) = run(&test);
        assert!(!summary.is_passed());
        assert_eq!(summary.replays(), 1);
        assert_eq!(summary.assertions(), (0, 1));
        assert_eq!(*reached.borrow(), vec!["a"]);
        assert!(events.iter().any(|event| match event {
            Event::Errored(msg) => msg.starts_with("test panicked"),
            _ => false,
        }));
        assert_eq!(events.last(), Some(&Event::Ended(false, 1)));
    }

    fn load_fixture() -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
    }

    #[test]
    fn errors_are_reported_and_fail_the_test() {
        let test = Test::new("errors", "user errors", |ctx| {
            ctx.section("io", |_| {
                load_fixture()?;
                Ok(())
            });
            ctx.section("next", |ctx| ctx.require(true, "next", loc()));
            Ok(())
        });

        let (summary, events) = run(&test);
        assert!(!summary.is_passed());
        assert_eq!(summary.replays(), 2);
        assert_eq!(summary.assertions(), (1, 2));
        assert!(events.contains(&Event::Errored("disk on fire".into())));
    }

    #[test]
    fn fail_reports_its_message() {
        let test = Test::new("fail", "explicit failure", |ctx| {
            ctx.fail(format_args!("unreachable state {}", 42), loc())
        });

        let (summary, events) = run(&test);
        assert!(!summary.is_passed());
        assert!(events.contains(&Event::Failed("unreachable state 42".into())));
    }

    #[test]
    fn description_changes_do_not_create_sections() {
        let replay = Rc::new(RefCell::new(0));
        let test = Test::new("descriptions", "changing descriptions", {
            let replay = replay.clone();
            move |ctx| {
                *replay.borrow_mut() += 1;
                let n = *replay.borrow();
                ctx.section(&format!("a (replay {})", n), |_| Ok(()));
                ctx.section(&format!("b (replay {})", n), |_| Ok(()));
                Ok(())
            }
        });

        let (summary, events) = run(&test);
        assert_eq!(summary.replays(), 2);
        assert!(events.contains(&Event::Entered("b (replay 2)".into(), true)));
    }

    #[test]
    fn runs_are_deterministic() {
        let test = Test::new("determinism", "determinism", |ctx| {
            ctx.require(true, "setup", loc())?;
            ctx.section("a", |ctx| {
                ctx.section("a1", |ctx| ctx.require(false, "a1", loc()));
                ctx.section("a2", |ctx| ctx.require(true, "a2", loc()));
                Ok(())
            });
            ctx.section("b", |ctx| ctx.require_fail(false, "b", loc()));
            Ok(())
        });

        let (first, first_events) = run(&test);
        let (second, second_events) = run(&test);
        assert_eq!(first_events, second_events);
        assert_eq!(first.replays(), second.replays());
        assert_eq!(first.assertions(), second.assertions());
    }

    #[test]
    #[should_panic(expected = "too many assertions")]
    fn assertion_overflow_panics() {
        let test = Test::new("overflow", "assertion overflow", |ctx| {
            for _ in 0..3 {
                ctx.require(true, "again", loc())?;
            }
            Ok(())
        });
        let config = Config {
            max_assertions: 2,
            ..Config::default()
        };
        let _ = run_with_config(&test, config);
    }

    #[test]
    #[should_panic(expected = "too many sections")]
    fn section_overflow_panics() {
        let test = Test::new("overflow", "section overflow", |ctx| {
            for _ in 0..3 {
                ctx.section("again", |_| Ok(()));
            }
            Ok(())
        });
        let config = Config {
            max_sections: 2,
            ..Config::default()
        };
        let _ = run_with_config(&test, config);
    }
}
