//! Flat-map cache keyed on the full configuration as an immutable sequence.

use std::collections::HashMap;
use std::sync::Arc;

use super::{CacheConfig, OutcomeCache};
use crate::builder::TestBuilder;
use crate::config::Configuration;
use crate::outcome::Outcome;

#[derive(Debug)]
pub struct ConfigTupleCache {
    cache_fail: bool,
    evict_after_fail: bool,
    measure_memory: bool,
    container: HashMap<Vec<usize>, Outcome>,
}

impl ConfigTupleCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache_fail: config.cache_fail,
            evict_after_fail: config.evict_after_fail,
            measure_memory: config.measure_memory,
            container: HashMap::new(),
        }
    }
}

impl OutcomeCache for ConfigTupleCache {
    fn set_test_builder(&mut self, _builder: Arc<dyn TestBuilder>) {}

    fn add(&mut self, config: &Configuration, outcome: Outcome) {
        if outcome == Outcome::Pass || self.cache_fail {
            self.container.insert(config.as_slice().to_vec(), outcome);
        }
    }

    fn lookup(&self, config: &Configuration) -> Option<Outcome> {
        self.container.get(config.as_slice()).copied()
    }

    fn clear(&mut self) {
        self.container.clear();
    }

    fn clean(&mut self, config: &Configuration) {
        if !self.evict_after_fail {
            return;
        }
        let len = config.len();
        self.container.retain(|key, _| key.len() <= len);
    }

    fn get_size(&self) -> (usize, usize) {
        if !self.measure_memory {
            return (0, 0);
        }
        let bytes: usize = self
            .container
            .keys()
            .map(|k| k.len() * std::mem::size_of::<usize>())
            .sum();
        (bytes, self.container.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_pass_outcomes() {
        let mut cache = ConfigTupleCache::new(CacheConfig::new());
        let config = Configuration::new(vec![1, 2]);
        cache.add(&config, Outcome::Pass);
        assert_eq!(cache.lookup(&config), Some(Outcome::Pass));
        assert_eq!(cache.lookup(&Configuration::new(vec![1, 3])), None);
    }

    #[test]
    fn clean_removes_only_longer_keys() {
        let mut cache = ConfigTupleCache::new(CacheConfig::new());
        cache.add(&Configuration::new(vec![1]), Outcome::Pass);
        cache.add(&Configuration::new(vec![1, 2, 3]), Outcome::Pass);
        cache.clean(&Configuration::new(vec![9]));
        assert_eq!(cache.lookup(&Configuration::new(vec![1])), Some(Outcome::Pass));
        assert_eq!(cache.lookup(&Configuration::new(vec![1, 2, 3])), None);
    }
}
