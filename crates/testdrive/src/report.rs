use crate::{cli::ExitStatus, test::TestDesc};

/// The result of running a single test.
#[derive(Debug, Clone)]
pub struct TestSummary {
    pub(crate) desc: TestDesc,
    pub(crate) passed: bool,
    pub(crate) replays: usize,
    pub(crate) successful: usize,
    pub(crate) total: usize,
}

impl TestSummary {
    /// Return the metadata of the test.
    #[inline]
    pub fn desc(&self) -> &TestDesc {
        &self.desc
    }

    /// Return whether no assertion failed and no error was raised.
    #[inline]
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    /// Return the number of times the test body was executed.
    #[inline]
    pub fn replays(&self) -> usize {
        self.replays
    }

    /// Return the numbers of successful and counted assertions.
    ///
    /// Each outcome of an assertion is counted once even if the scope
    /// containing it was replayed several times. Errors and panics are
    /// counted as failures every time they are raised.
    #[inline]
    pub fn assertions(&self) -> (usize, usize) {
        (self.successful, self.total)
    }
}

/// The results of a test session.
#[derive(Debug, Default)]
pub struct Summary {
    pub(crate) passed: Vec<TestSummary>,
    pub(crate) failed: Vec<TestSummary>,
    pub(crate) filtered_out: usize,
}

impl Summary {
    /// Return whether all tests run in the session passed.
    #[inline]
    pub fn is_passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Return the tests that passed.
    #[inline]
    pub fn passed(&self) -> &[TestSummary] {
        &self.passed
    }

    /// Return the tests that failed.
    #[inline]
    pub fn failed(&self) -> &[TestSummary] {
        &self.failed
    }

    /// Return the number of tests excluded by name filters.
    #[inline]
    pub fn filtered_out(&self) -> usize {
        self.filtered_out
    }

    /// Return the exit status corresponding to this summary.
    pub fn status(&self) -> ExitStatus {
        if self.is_passed() {
            ExitStatus::OK
        } else {
            ExitStatus::FAILED
        }
    }

    pub(crate) fn append(&mut self, result: TestSummary) {
        if result.passed {
            self.passed.push(result);
        } else {
            self.failed.push(result);
        }
    }
}
