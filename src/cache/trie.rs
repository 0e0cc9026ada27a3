//! Re-implementation of Zeller's original caching approach: configurations
//! are associated with their outcomes using a trie keyed on successive
//! indices.
//!
//! ```text
//! ([1, 2, 3], Pass), ([1, 2], Fail), ([1, 4, 5], Fail):
//!
//!      (2, Fail)──(3, Pass)
//!     /
//! (1, None)
//!     \
//!      (4, None)──(5, Fail)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::{CacheConfig, OutcomeCache};
use crate::builder::TestBuilder;
use crate::config::Configuration;
use crate::outcome::Outcome;

#[derive(Debug, Default)]
struct Node {
    result: Option<Outcome>,
    tail: HashMap<usize, Node>,
}

#[derive(Debug)]
pub struct ConfigCache {
    cache_fail: bool,
    evict_after_fail: bool,
    measure_memory: bool,
    root: Node,
}

impl ConfigCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache_fail: config.cache_fail,
            evict_after_fail: config.evict_after_fail,
            measure_memory: config.measure_memory,
            root: Node::default(),
        }
    }

    fn evict(node: &mut Node, remaining: usize) {
        if remaining == 0 {
            node.tail.clear();
        } else {
            for child in node.tail.values_mut() {
                Self::evict(child, remaining - 1);
            }
        }
    }

    fn traverse(node: &Node, tsize: &mut usize, tcount: &mut usize) {
        *tsize += std::mem::size_of::<Node>()
            + node.tail.capacity() * std::mem::size_of::<(usize, Node)>();
        *tcount += 1;
        for child in node.tail.values() {
            Self::traverse(child, tsize, tcount);
        }
    }
}

impl OutcomeCache for ConfigCache {
    fn set_test_builder(&mut self, _builder: Arc<dyn TestBuilder>) {}

    fn add(&mut self, config: &Configuration, outcome: Outcome) {
        if outcome == Outcome::Fail && !self.cache_fail {
            return;
        }
        let mut node = &mut self.root;
        for &index in config.as_slice() {
            node = node.tail.entry(index).or_default();
        }
        node.result = Some(outcome);
    }

    fn lookup(&self, config: &Configuration) -> Option<Outcome> {
        let mut node = &self.root;
        for &index in config.as_slice() {
            node = node.tail.get(&index)?;
        }
        node.result
    }

    fn clear(&mut self) {
        self.root = Node::default();
    }

    fn clean(&mut self, config: &Configuration) {
        if !self.evict_after_fail {
            return;
        }
        Self::evict(&mut self.root, config.len());
    }

    fn get_size(&self) -> (usize, usize) {
        if !self.measure_memory {
            return (0, 0);
        }
        let (mut tsize, mut tcount) = (0, 0);
        Self::traverse(&self.root, &mut tsize, &mut tcount);
        (tsize, tcount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_on_absent_edge() {
        let cache = ConfigCache::new(CacheConfig::new());
        assert_eq!(cache.lookup(&Configuration::new(vec![1, 2])), None);
    }

    #[test]
    fn add_then_lookup_round_trips() {
        let mut cache = ConfigCache::new(CacheConfig::new());
        let config = Configuration::new(vec![1, 2, 3]);
        cache.add(&config, Outcome::Pass);
        assert_eq!(cache.lookup(&config), Some(Outcome::Pass));
        assert_eq!(cache.lookup(&Configuration::new(vec![1, 2])), None);
    }

    #[test]
    fn fail_not_cached_unless_cache_fail_set() {
        let mut cache = ConfigCache::new(CacheConfig::new());
        let config = Configuration::new(vec![1]);
        cache.add(&config, Outcome::Fail);
        assert_eq!(cache.lookup(&config), None);

        let mut config_with_fail = CacheConfig::new();
        config_with_fail.cache_fail = true;
        let mut cache = ConfigCache::new(config_with_fail);
        cache.add(&config, Outcome::Fail);
        assert_eq!(cache.lookup(&config), Some(Outcome::Fail));
    }

    #[test]
    fn clean_evicts_strictly_longer_keys_everywhere() {
        let mut cache = ConfigCache::new(CacheConfig::new());
        cache.add(&Configuration::new(vec![1, 2, 3]), Outcome::Pass);
        cache.add(&Configuration::new(vec![1, 2]), Outcome::Pass);
        cache.add(&Configuration::new(vec![1, 4, 5]), Outcome::Pass);

        cache.clean(&Configuration::new(vec![9, 9])); // length 2

        assert_eq!(cache.lookup(&Configuration::new(vec![1, 2])), Some(Outcome::Pass));
        assert_eq!(cache.lookup(&Configuration::new(vec![1, 2, 3])), None);
        assert_eq!(cache.lookup(&Configuration::new(vec![1, 4, 5])), None);
    }

    #[test]
    fn clean_is_noop_when_evict_after_fail_disabled() {
        let mut config = CacheConfig::new();
        config.evict_after_fail = false;
        let mut cache = ConfigCache::new(config);
        cache.add(&Configuration::new(vec![1, 2, 3]), Outcome::Pass);
        cache.clean(&Configuration::new(vec![9]));
        assert_eq!(
            cache.lookup(&Configuration::new(vec![1, 2, 3])),
            Some(Outcome::Pass)
        );
    }
}
