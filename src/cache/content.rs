//! Flat-map cache keyed on the *built content* of a configuration rather
//! than the configuration itself.

use std::collections::HashMap;
use std::sync::Arc;

use super::{CacheConfig, OutcomeCache};
use crate::builder::TestBuilder;
use crate::config::Configuration;
use crate::outcome::Outcome;

#[derive(Default)]
pub struct ContentCache {
    cache_fail: bool,
    evict_after_fail: bool,
    measure_memory: bool,
    container: HashMap<String, Outcome>,
    test_builder: Option<Arc<dyn TestBuilder>>,
}

impl ContentCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache_fail: config.cache_fail,
            evict_after_fail: config.evict_after_fail,
            measure_memory: config.measure_memory,
            container: HashMap::new(),
            test_builder: None,
        }
    }
}

impl OutcomeCache for ContentCache {
    fn set_test_builder(&mut self, builder: Arc<dyn TestBuilder>) {
        self.test_builder = Some(builder);
    }

    fn add(&mut self, config: &Configuration, outcome: Outcome) {
        let Some(builder) = &self.test_builder else {
            return;
        };
        if outcome == Outcome::Pass || self.cache_fail {
            self.container.insert(builder.build(config), outcome);
        }
    }

    fn lookup(&self, config: &Configuration) -> Option<Outcome> {
        let builder = self.test_builder.as_ref()?;
        self.container.get(&builder.build(config)).copied()
    }

    fn clear(&mut self) {
        self.container.clear();
    }

    fn clean(&mut self, config: &Configuration) {
        if !self.evict_after_fail {
            return;
        }
        let Some(builder) = &self.test_builder else {
            return;
        };
        let length = builder.build(config).len();
        self.container.retain(|content, _| content.len() <= length);
    }

    fn get_size(&self) -> (usize, usize) {
        if !self.measure_memory {
            return (0, 0);
        }
        let bytes: usize = self.container.keys().map(|c| c.len()).sum();
        (bytes, self.container.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::AtomArray;
    use crate::builder::ConcatTestBuilder;

    fn builder() -> Arc<dyn TestBuilder> {
        Arc::new(ConcatTestBuilder::new(AtomArray::lines("a\nb\nc\n")))
    }

    #[test]
    fn keys_on_built_content_not_raw_config() {
        let mut cache = ContentCache::new(CacheConfig::new());
        cache.set_test_builder(builder());
        let config = Configuration::new(vec![0]);
        cache.add(&config, Outcome::Pass);
        // Different config, same built content, should hit.
        assert_eq!(cache.lookup(&Configuration::new(vec![0])), Some(Outcome::Pass));
    }

    #[test]
    fn miss_before_test_builder_is_set() {
        let mut cache = ContentCache::new(CacheConfig::new());
        let config = Configuration::new(vec![0]);
        cache.add(&config, Outcome::Pass);
        assert_eq!(cache.lookup(&config), None);
    }

    #[test]
    fn clean_evicts_by_built_content_length() {
        let mut cache = ContentCache::new(CacheConfig::new());
        cache.set_test_builder(builder());
        cache.add(&Configuration::new(vec![0]), Outcome::Pass);
        cache.add(&Configuration::new(vec![0, 1, 2]), Outcome::Pass);
        cache.clean(&Configuration::new(vec![0])); // build -> "a\n", length 2
        assert_eq!(cache.lookup(&Configuration::new(vec![0])), Some(Outcome::Pass));
        assert_eq!(cache.lookup(&Configuration::new(vec![0, 1, 2])), None);
    }
}
