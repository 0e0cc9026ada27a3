//! Reduction error types.

use crate::config::Configuration;

/// Error taxonomy for the reducer.
///
/// `Stopped` and `Exception` both carry the best failing configuration
/// found so far, so a driver can write partial progress even on abnormal
/// termination. `Configuration` errors are surfaced at startup, before any
/// reduction begins, and carry nothing reduction-related.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReductionError {
    /// The stop predicate tripped (deadline or max-test budget exhausted).
    /// Treated as clean termination by the driver: exit code 0, best-known
    /// output written anyway.
    #[error("reduction stopped: {reason}")]
    Stopped {
        reason: String,
        best: Configuration,
    },

    /// Any other early termination: a tester-side error, or an I/O failure
    /// while building/staging test content. Treated as abnormal exit by the
    /// driver.
    #[error("reduction aborted: {source}")]
    Exception {
        best: Configuration,
        #[source]
        source: anyhow::Error,
    },

    /// Invalid arguments: missing input, unknown encoding, unknown strategy
    /// name, non-executable tester. Raised at startup, never mid-reduction.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ReductionError {
    /// Whether this is a clean stop (exit code 0) as opposed to an abnormal
    /// one.
    pub fn is_clean_stop(&self) -> bool {
        matches!(self, ReductionError::Stopped { .. })
    }

    /// The best failing configuration known at the time of the error, if
    /// any (absent only for startup [`ReductionError::Configuration`]
    /// errors).
    pub fn best_known(&self) -> Option<&Configuration> {
        match self {
            ReductionError::Stopped { best, .. } => Some(best),
            ReductionError::Exception { best, .. } => Some(best),
            ReductionError::Configuration(_) => None,
        }
    }
}

/// Result type alias for reduction operations.
pub type Result<T> = std::result::Result<T, ReductionError>;
