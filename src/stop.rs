//! Wall-clock/test-count reduction budget.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::Configuration;
use crate::error::ReductionError;

/// Polled before every dispatch and before every greedy-merge probe.
///
/// Carries an optional wall-clock deadline and an optional max-test count;
/// either or both may be set. When triggered, [`StopPredicate::check`]
/// returns a [`ReductionError::Stopped`] carrying the best-known failing
/// configuration so the caller can unwind cleanly.
#[derive(Debug)]
pub struct StopPredicate {
    deadline: Option<Instant>,
    max_tests: Option<u64>,
    tests_run: AtomicU64,
}

impl StopPredicate {
    pub fn new() -> Self {
        Self {
            deadline: None,
            max_tests: None,
            tests_run: AtomicU64::new(0),
        }
    }

    /// Stop the reduction after `duration` has elapsed since this call.
    pub fn deadline(mut self, duration: Duration) -> Self {
        self.deadline = Some(Instant::now() + duration);
        self
    }

    /// Stop the reduction after `max` test dispatches (cached lookups do
    /// not count against this budget; only executed tests do).
    pub fn max_tests(mut self, max: u64) -> Self {
        self.max_tests = Some(max);
        self
    }

    /// Record that one test was executed (not a cache hit).
    pub fn record_test(&self) {
        self.tests_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Check the budget, raising [`ReductionError::Stopped`] if tripped.
    pub fn check(&self, best: &Configuration) -> Result<(), ReductionError> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ReductionError::Stopped {
                    reason: "deadline exceeded".to_string(),
                    best: best.clone(),
                });
            }
        }
        if let Some(max) = self.max_tests {
            if self.tests_run.load(Ordering::Relaxed) >= max {
                return Err(ReductionError::Stopped {
                    reason: format!("test budget of {max} exhausted"),
                    best: best.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for StopPredicate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_predicate_never_trips() {
        let stop = StopPredicate::new();
        for _ in 0..1000 {
            stop.record_test();
        }
        assert!(stop.check(&Configuration::empty()).is_ok());
    }

    #[test]
    fn max_tests_trips_after_budget() {
        let stop = StopPredicate::new().max_tests(2);
        stop.record_test();
        assert!(stop.check(&Configuration::empty()).is_ok());
        stop.record_test();
        let err = stop.check(&Configuration::empty()).unwrap_err();
        assert!(err.is_clean_stop());
    }

    #[test]
    fn deadline_trips_immediately_when_zero() {
        let stop = StopPredicate::new().deadline(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(5));
        assert!(stop.check(&Configuration::empty()).is_err());
    }
}
