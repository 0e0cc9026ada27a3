//! Flat-map cache keyed on a 32-byte BLAKE3 digest of the built content.
//!
//! Caching by hashed content is only safe if `Fail` outcomes are never
//! stored — a collision on a cached `Fail` would mask a real failure — so
//! `cache_fail` is forced off regardless of the passed [`CacheConfig`].
//! BLAKE3 is used here rather than picire's SHA3-256: both are
//! collision-resistant fixed-size digests, and BLAKE3 is the faster choice
//! already in use elsewhere in this crate's neighborhood (content-addressed
//! caching in `harborgrid-justin-caddy`, `logannye-tinyzkp`).

use std::collections::HashMap;
use std::sync::Arc;

use super::{CacheConfig, OutcomeCache};
use crate::builder::TestBuilder;
use crate::config::Configuration;
use crate::outcome::Outcome;

type Digest = [u8; 32];

#[derive(Default)]
pub struct ContentHashCache {
    evict_after_fail: bool,
    measure_memory: bool,
    container: HashMap<Digest, (Outcome, usize)>,
    test_builder: Option<Arc<dyn TestBuilder>>,
}

impl ContentHashCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            evict_after_fail: config.evict_after_fail,
            measure_memory: config.measure_memory,
            container: HashMap::new(),
            test_builder: None,
        }
    }

    fn hash(content: &str) -> Digest {
        *blake3::hash(content.as_bytes()).as_bytes()
    }
}

impl OutcomeCache for ContentHashCache {
    fn set_test_builder(&mut self, builder: Arc<dyn TestBuilder>) {
        self.test_builder = Some(builder);
    }

    fn add(&mut self, config: &Configuration, outcome: Outcome) {
        if outcome != Outcome::Pass {
            return;
        }
        let Some(builder) = &self.test_builder else {
            return;
        };
        let content = builder.build(config);
        let length = content.len();
        self.container.insert(Self::hash(&content), (outcome, length));
    }

    fn lookup(&self, config: &Configuration) -> Option<Outcome> {
        let builder = self.test_builder.as_ref()?;
        let content = builder.build(config);
        self.container.get(&Self::hash(&content)).map(|(o, _)| *o)
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
        self.container.retain(|_, (_, l)| *l <= length);
    }

    fn get_size(&self) -> (usize, usize) {
        if !self.measure_memory {
            return (0, 0);
        }
        let bytes = self.container.len() * (32 + std::mem::size_of::<(Outcome, usize)>());
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
    fn fail_outcomes_are_never_cached() {
        let mut cache = ContentHashCache::new(CacheConfig {
            cache_fail: true, // ignored
            ..CacheConfig::new()
        });
        cache.set_test_builder(builder());
        let config = Configuration::new(vec![0]);
        cache.add(&config, Outcome::Fail);
        assert_eq!(cache.lookup(&config), None);
    }

    #[test]
    fn pass_round_trips_through_hash() {
        let mut cache = ContentHashCache::new(CacheConfig::new());
        cache.set_test_builder(builder());
        let config = Configuration::new(vec![0, 1]);
        cache.add(&config, Outcome::Pass);
        assert_eq!(cache.lookup(&config), Some(Outcome::Pass));
    }

    #[test]
    fn clean_evicts_by_stored_length() {
        let mut cache = ContentHashCache::new(CacheConfig::new());
        cache.set_test_builder(builder());
        cache.add(&Configuration::new(vec![0]), Outcome::Pass);
        cache.add(&Configuration::new(vec![0, 1, 2]), Outcome::Pass);
        cache.clean(&Configuration::new(vec![0]));
        assert_eq!(cache.lookup(&Configuration::new(vec![0])), Some(Outcome::Pass));
        assert_eq!(cache.lookup(&Configuration::new(vec![0, 1, 2])), None);
    }
}
