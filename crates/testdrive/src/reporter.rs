//! Observers of test execution.

mod console;
mod log;

pub use self::{console::ConsoleReporter, log::LogReporter};

use crate::{
    assertion::AssertionOutcome,
    report::{Summary, TestSummary},
    test::{Test, TestDesc},
};

/// Information about a section passed to [`Reporter`] callbacks.
#[derive(Debug, Copy, Clone)]
#[non_exhaustive]
pub struct SectionInfo<'a> {
    /// The description given to the section in this replay.
    pub description: &'a str,

    /// The position of the section among those declared in its parent scope.
    pub index: usize,

    /// The nesting depth of the section, `1` for sections declared in the
    /// test body.
    pub depth: usize,

    /// Whether this is the first replay that enters the section.
    pub first_entry: bool,
}

/// The receiver of events emitted while running tests.
///
/// Events of a test are delivered in execution order: `test_starting`,
/// then for every replay the section and assertion events in the order
/// the test body reaches them, and finally `test_ended`. Section events
/// are properly nested.
///
/// Reporters only observe the run; they cannot alter which sections
/// are executed.
pub trait Reporter {
    /// Called before the tests of a session are run.
    fn run_starting(&mut self, tests: &[&Test]) {
        let _ = tests;
    }

    /// Called after all tests of a session were run.
    fn run_ended(&mut self, summary: &Summary) {
        let _ = summary;
    }

    /// Called before the first replay of a test.
    fn test_starting(&mut self, desc: &TestDesc);

    /// Called when a replay enters the body of a section.
    fn section_entered(&mut self, section: &SectionInfo<'_>);

    /// Called when a replay skips the body of a section.
    fn section_skipped(&mut self, section: &SectionInfo<'_>);

    /// Called when the body of an entered section has returned.
    ///
    /// `completed` is `true` if all leaves below the section have been
    /// visited, in which case the section will not be entered again.
    fn section_exited(&mut self, section: &SectionInfo<'_>, completed: bool);

    /// Called before the outcome of an assertion is reported.
    fn assertion_attempted(&mut self, assertion: &AssertionOutcome<'_>);

    /// Called when an assertion succeeded.
    fn assertion_passed(&mut self, assertion: &AssertionOutcome<'_>);

    /// Called when an assertion failed.
    fn assertion_failed(&mut self, assertion: &AssertionOutcome<'_>);

    /// Called when a test or section body returned an error.
    fn error_raised(&mut self, error: &anyhow::Error);

    /// Called after the last replay of a test.
    fn test_ended(&mut self, summary: &TestSummary);
}

macro_rules! impl_reporter_body {
    () => {
        fn run_starting(&mut self, tests: &[&Test]) {
            (**self).run_starting(tests)
        }

        fn run_ended(&mut self, summary: &Summary) {
            (**self).run_ended(summary)
        }

        fn test_starting(&mut self, desc: &TestDesc) {
            (**self).test_starting(desc)
        }

        fn section_entered(&mut self, section: &SectionInfo<'_>) {
            (**self).section_entered(section)
        }

        fn section_skipped(&mut self, section: &SectionInfo<'_>) {
            (**self).section_skipped(section)
        }

        fn section_exited(&mut self, section: &SectionInfo<'_>, completed: bool) {
            (**self).section_exited(section, completed)
        }

        fn assertion_attempted(&mut self, assertion: &AssertionOutcome<'_>) {
            (**self).assertion_attempted(assertion)
        }

        fn assertion_passed(&mut self, assertion: &AssertionOutcome<'_>) {
            (**self).assertion_passed(assertion)
        }

        fn assertion_failed(&mut self, assertion: &AssertionOutcome<'_>) {
            (**self).assertion_failed(assertion)
        }

        fn error_raised(&mut self, error: &anyhow::Error) {
            (**self).error_raised(error)
        }

        fn test_ended(&mut self, summary: &TestSummary) {
            (**self).test_ended(summary)
        }
    };
}

impl<R: ?Sized> Reporter for &mut R
where
    R: Reporter,
{
    impl_reporter_body!();
}

impl<R: ?Sized> Reporter for Box<R>
where
    R: Reporter,
{
    impl_reporter_body!();
}
