/// Structural limits applied while running a test.
///
/// Exceeding either limit is treated as an authoring error and stops the
/// test run with a panic instead of silently truncating the results.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The maximum number of sections declared directly in one scope.
    pub max_sections: usize,

    /// The maximum number of assertions evaluated during one replay.
    pub max_assertions: usize,
}

impl Config {
    /// The default value of `max_sections`.
    pub const DEFAULT_MAX_SECTIONS: usize = 128;

    /// The default value of `max_assertions`.
    pub const DEFAULT_MAX_ASSERTIONS: usize = 256;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_sections: Self::DEFAULT_MAX_SECTIONS,
            max_assertions: Self::DEFAULT_MAX_ASSERTIONS,
        }
    }
}
