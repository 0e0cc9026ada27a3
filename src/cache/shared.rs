//! Thread-safe wrapper interposing a mutex on every cache operation.
//!
//! One mutex guarding the whole cache is sufficient — contention is
//! acceptable because test latency dominates, not lock hold time. No
//! lock-free reads are permitted: `lookup` takes the same lock as `add`.

use std::sync::{Arc, Mutex};

use super::OutcomeCache;
use crate::builder::TestBuilder;
use crate::config::Configuration;
use crate::outcome::Outcome;

/// Wraps any [`OutcomeCache`] behind a [`Mutex`], making it safe to share
/// between the sequential reducer's thread and
/// [`crate::parallel_dd::ParallelDd`]'s worker pool.
pub struct SharedCache {
    inner: Mutex<Box<dyn OutcomeCache>>,
}

impl SharedCache {
    pub fn new(cache: Box<dyn OutcomeCache>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    pub fn set_test_builder(&self, builder: Arc<dyn TestBuilder>) {
        self.inner.lock().unwrap().set_test_builder(builder);
    }

    pub fn add(&self, config: &Configuration, outcome: Outcome) {
        self.inner.lock().unwrap().add(config, outcome);
    }

    pub fn lookup(&self, config: &Configuration) -> Option<Outcome> {
        self.inner.lock().unwrap().lookup(config)
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn clean(&self, config: &Configuration) {
        self.inner.lock().unwrap().clean(config);
    }

    pub fn get_size(&self) -> (usize, usize) {
        self.inner.lock().unwrap().get_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, ConfigTupleCache};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn serializes_concurrent_access() {
        let cache = Arc::new(SharedCache::new(Box::new(ConfigTupleCache::new(
            CacheConfig::new(),
        ))));

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = cache.clone();
            handles.push(thread::spawn(move || {
                let config = Configuration::new(vec![i]);
                cache.add(&config, Outcome::Pass);
                cache.lookup(&config)
            }));
        }
        for h in handles {
            assert_eq!(h.join().unwrap(), Some(Outcome::Pass));
        }
    }
}
