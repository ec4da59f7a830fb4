use crate::{
    config::Config,
    context::RunState,
    report::Summary,
    reporter::{ConsoleReporter, Reporter},
    scheduler,
    test::Test,
};
use std::fmt;
use termcolor::ColorChoice;

/// A series of test runs sharing a reporter and a configuration.
///
/// Each test is run with its own section tree, so results never leak from
/// one test into another.
pub struct Session<'r> {
    reporter: Box<dyn Reporter + 'r>,
    config: Config,
    summary: Summary,
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("summary", &self.summary)
            .finish()
    }
}

impl Default for Session<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Session<'_> {
    /// Create a session reporting to the standard output.
    pub fn new() -> Self {
        Self::with_reporter(ConsoleReporter::stdout(ColorChoice::Auto))
    }
}

impl<'r> Session<'r> {
    /// Create a session reporting to `reporter`.
    pub fn with_reporter<R>(reporter: R) -> Self
    where
        R: Reporter + 'r,
    {
        Self {
            reporter: Box::new(reporter),
            config: Config::default(),
            summary: Summary::default(),
        }
    }

    /// Replace the reporter used by the tests run after this call.
    pub fn set_reporter<R>(&mut self, reporter: R)
    where
        R: Reporter + 'r,
    {
        self.reporter = Box::new(reporter);
    }

    /// Replace the configuration used by the tests run after this call.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Return the configuration of this session.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a test until all of its leaf sections have been visited.
    ///
    /// Returns whether the test passed.
    ///
    /// # Panics
    ///
    /// Panics if the test exceeds one of the limits of the configuration,
    /// or if the test body panics.
    pub fn run_test(&mut self, test: &Test) -> bool {
        let mut state = RunState::new(&self.config);
        let summary = scheduler::drive(test, &mut *self.reporter, &mut state);
        let passed = summary.is_passed();
        self.summary.append(summary);
        passed
    }

    /// Run the given tests in order, surrounding them with the
    /// `run_starting` and `run_ended` reporter events.
    pub fn run(&mut self, tests: &[&Test]) -> &Summary {
        self.reporter.run_starting(tests);
        for test in tests {
            self.run_test(test);
        }
        self.reporter.run_ended(&self.summary);
        &self.summary
    }

    /// Return the results of the tests run so far.
    #[inline]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Consume the session, returning the results of the tests run.
    #[inline]
    pub fn into_summary(self) -> Summary {
        self.summary
    }

    pub(crate) fn set_filtered_out(&mut self, filtered_out: usize) {
        self.summary.filtered_out = filtered_out;
    }
}

/// Run a single test, reporting to the standard output.
///
/// Returns whether the test passed.
pub fn run_test(test: &Test) -> bool {
    Session::new().run_test(test)
}
