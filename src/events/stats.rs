//! Counter-based statistics collector, exportable as JSON.
//!
//! Grounded on picire's `events/stats.py`: a handler that tallies tests,
//! cache hits/misses, and successful reductions as the reduction runs,
//! serializable for `--statistics FILE`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::EventHandler;
use crate::config::{ConfigId, Configuration};
use crate::outcome::Outcome;

/// Atomic counters accumulated over a reduction run.
///
/// Safe to share across the parallel reducer's worker threads: every field
/// is an independently-updated atomic, no cross-field invariant is
/// maintained under concurrent access.
#[derive(Default)]
pub struct Statistics {
    tests_executed: AtomicU64,
    tests_passed: AtomicU64,
    tests_failed: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    successful_reductions: AtomicU64,
    configuration_splits: AtomicU64,
}

/// Snapshot of [`Statistics`], the shape written to `--statistics FILE`.
#[derive(Debug, Serialize)]
pub struct StatisticsSnapshot {
    pub tests_executed: u64,
    pub tests_passed: u64,
    pub tests_failed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub successful_reductions: u64,
    pub configuration_splits: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            tests_executed: self.tests_executed.load(Ordering::Relaxed),
            tests_passed: self.tests_passed.load(Ordering::Relaxed),
            tests_failed: self.tests_failed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            successful_reductions: self.successful_reductions.load(Ordering::Relaxed),
            configuration_splits: self.configuration_splits.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl EventHandler for Statistics {
    fn test_finished(&self, _configuration: &Configuration, _config_id: &ConfigId, outcome: Outcome) {
        self.tests_executed.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Outcome::Pass => self.tests_passed.fetch_add(1, Ordering::Relaxed),
            Outcome::Fail => self.tests_failed.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn cache_lookup(&self, _config_id: &ConfigId, outcome: Option<Outcome>) {
        match outcome {
            Some(_) => self.cache_hits.fetch_add(1, Ordering::Relaxed),
            None => self.cache_misses.fetch_add(1, Ordering::Relaxed),
        };
    }

    fn successful_reduction(&self, _configuration: &Configuration) {
        self.successful_reductions.fetch_add(1, Ordering::Relaxed);
    }

    fn configuration_split(&self, _configuration: &Configuration) {
        self.configuration_splits.fetch_add(1, Ordering::Relaxed);
    }
}
