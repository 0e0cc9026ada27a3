//! The two-valued test verdict.

/// Result of running the interestingness test against some content.
///
/// There is no third persisted value: `Option<Outcome>` is used in transit
/// to mean "not yet known" (a cache miss, or a test still in flight), never
/// stored as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The test passed: the phenomenon we are minimizing toward is absent.
    Pass,
    /// The test failed: the input still reproduces the phenomenon.
    Fail,
}

impl Outcome {
    /// `true` for [`Outcome::Fail`].
    pub fn is_fail(self) -> bool {
        matches!(self, Outcome::Fail)
    }

    /// `true` for [`Outcome::Pass`].
    pub fn is_pass(self) -> bool {
        matches!(self, Outcome::Pass)
    }

    /// Map a test-command exit status to an outcome, by the conventional
    /// delta-debugging contract: exit 0 means "interesting" (the defect
    /// reproduces), any other exit code means "not interesting".
    pub fn from_exit_success(success: bool) -> Self {
        if success { Outcome::Fail } else { Outcome::Pass }
    }
}
