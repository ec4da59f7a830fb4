use super::{Reporter, SectionInfo};
use crate::{
    assertion::AssertionOutcome,
    report::{Summary, TestSummary},
    test::{Test, TestDesc},
};

/// A reporter that forwards the events to the `log` facade.
///
/// Passing assertions and skipped sections are logged at the `trace` level.
#[derive(Debug, Clone)]
pub struct LogReporter {
    _p: (),
}

impl LogReporter {
    /// Create a new `LogReporter`.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { _p: () }
    }
}

impl Reporter for LogReporter {
    fn run_starting(&mut self, tests: &[&Test]) {
        let suffix = match tests.len() {
            1 => "",
            _ => "s",
        };
        log::info!("running {} test{}", tests.len(), suffix);
    }

    fn run_ended(&mut self, summary: &Summary) {
        if summary.is_passed() {
            log::info!("test status: ok");
        } else {
            log::error!("test status: FAILED");
        }
    }

    fn test_starting(&mut self, desc: &TestDesc) {
        log::info!("start: {}", desc.name());
    }

    fn section_entered(&mut self, section: &SectionInfo<'_>) {
        log::debug!(
            "enter section {:?} (depth = {}, index = {})",
            section.description,
            section.depth,
            section.index
        );
    }

    fn section_skipped(&mut self, section: &SectionInfo<'_>) {
        log::trace!("skip section {:?}", section.description);
    }

    fn section_exited(&mut self, section: &SectionInfo<'_>, completed: bool) {
        log::debug!(
            "exit section {:?} (completed = {})",
            section.description,
            completed
        );
    }

    fn assertion_attempted(&mut self, _: &AssertionOutcome<'_>) {}

    fn assertion_passed(&mut self, assertion: &AssertionOutcome<'_>) {
        log::trace!("passed: {} ({})", assertion.expr, assertion.location);
    }

    fn assertion_failed(&mut self, assertion: &AssertionOutcome<'_>) {
        log::error!("failed: {} ({})", assertion.expr, assertion.location);
    }

    fn error_raised(&mut self, error: &anyhow::Error) {
        log::error!("error: {:#}", error);
    }

    fn test_ended(&mut self, summary: &TestSummary) {
        let (successful, total) = summary.assertions();
        if summary.is_passed() {
            log::info!(
                "{}: ok ({}/{} assertions)",
                summary.desc().name(),
                successful,
                total
            );
        } else {
            log::error!(
                "{}: FAILED ({}/{} assertions)",
                summary.desc().name(),
                successful,
                total
            );
        }
    }
}
