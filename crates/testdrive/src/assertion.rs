use crate::test::Location;
use std::{error, fmt};

/// The signal that stops the section body currently being executed.
///
/// Values of this type are returned by the assertion methods of
/// [`Context`](crate::Context) and are meant to be propagated with `?` up to
/// the closure passed to [`Context::section`](crate::Context::section) or to
/// [`Test::new`](crate::Test::new). The engine absorbs them there, so the
/// scope enclosing the aborted section keeps running.
///
/// Any error type can be converted into `Abort` with `?`, in which case the
/// error is reported and the test is marked as failed.
pub struct Abort {
    error: Option<anyhow::Error>,
}

impl Abort {
    pub(crate) fn new() -> Self {
        Self { error: None }
    }

    /// Create an `Abort` carrying an arbitrary error value.
    pub fn error(err: impl Into<anyhow::Error>) -> Self {
        Self {
            error: Some(err.into()),
        }
    }

    pub(crate) fn into_error(self) -> Option<anyhow::Error> {
        self.error
    }
}

impl fmt::Debug for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error {
            Some(ref err) => f.debug_tuple("Abort").field(err).finish(),
            None => f.write_str("Abort"),
        }
    }
}

impl<E> From<E> for Abort
where
    E: error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::error(err)
    }
}

/// The result of evaluating an assertion.
#[derive(Debug, Copy, Clone)]
#[non_exhaustive]
pub struct AssertionOutcome<'a> {
    /// The textual form of the asserted condition.
    pub expr: &'a str,

    /// Where the assertion is written.
    pub location: Location,

    /// The value the condition evaluated to.
    pub condition: bool,

    /// Whether the assertion expects the condition to be `false`.
    pub inverted: bool,

    /// Whether an earlier replay already reported the same outcome for this
    /// assertion, identified by its location and its order of evaluation in
    /// the enclosing scope.
    pub recount: bool,
}

impl AssertionOutcome<'_> {
    /// Return whether the assertion succeeded.
    #[inline]
    pub fn passed(&self) -> bool {
        self.condition != self.inverted
    }
}
