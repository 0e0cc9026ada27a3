//! Sequential ddmin / dd-star reducer.
//!
//! Implements the algorithm in spec §4.4: subsets are tried before
//! complements (per the configured [`CombinedIterator`]), the first FAIL
//! found in cycle order wins, granularity resets to 2 after a subset
//! reduction or drops by one after a complement reduction, and escalates
//! (doubles, capped at `|c|`) when a full cycle finds nothing. dd-star
//! repeats the whole thing from a smaller granularity until a fixed point.

use std::sync::Arc;

use crate::builder::TestBuilder;
use crate::cache::OutcomeCache;
use crate::config::{ConfigId, Configuration};
use crate::error::ReductionError;
use crate::events::EventSink;
use crate::iterator::{CombinedIterator, complement_slot, is_subset};
use crate::outcome::Outcome;
use crate::splitter::Splitter;
use crate::stop::StopPredicate;
use crate::tester::Tester;

/// Sequential ddmin/dd-star reducer.
pub struct Dd {
    splitter: Box<dyn Splitter>,
    config_iterator: CombinedIterator,
    cache: Box<dyn OutcomeCache>,
    builder: Arc<dyn TestBuilder>,
    tester: Box<dyn Tester>,
    id_prefix: Vec<String>,
    dd_star: bool,
    stop: Option<StopPredicate>,
    events: EventSink,
}

impl Dd {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        splitter: Box<dyn Splitter>,
        config_iterator: CombinedIterator,
        mut cache: Box<dyn OutcomeCache>,
        builder: Arc<dyn TestBuilder>,
        tester: Box<dyn Tester>,
        id_prefix: Vec<String>,
        dd_star: bool,
        stop: Option<StopPredicate>,
        events: EventSink,
    ) -> Self {
        cache.set_test_builder(builder.clone());
        Self {
            splitter,
            config_iterator,
            cache,
            builder,
            tester,
            id_prefix,
            dd_star,
            stop,
            events,
        }
    }

    /// Dispatch one test, consulting the cache first. Cache hits are
    /// distinguishable from executed tests in the emitted events, but both
    /// count as "progress" for the algorithm.
    fn test_config(&mut self, config: &Configuration, config_id: &ConfigId) -> Result<Outcome, ReductionError> {
        let content = self.builder.build(config);
        let cached = self.cache.lookup(config);
        self.events.cache_lookup(config_id, cached);
        if let Some(outcome) = cached {
            return Ok(outcome);
        }

        if let Some(stop) = &self.stop {
            stop.check(config)?;
        }

        self.events.test_started(config, config_id);
        let outcome = self
            .tester
            .test(&content, config_id)
            .map_err(|source| ReductionError::Exception {
                best: config.clone(),
                source,
            })?;
        self.events.test_finished(config, config_id, outcome);
        if let Some(stop) = &self.stop {
            stop.record_test();
        }

        self.cache.add(config, outcome);
        self.events.cache_insert(config_id, outcome);
        Ok(outcome)
    }

    /// Run dd-star to a fixed point starting from `config` at granularity
    /// `initial_n` (typically 2).
    pub fn reduce(&mut self, config: Configuration, initial_n: usize) -> Result<Configuration, ReductionError> {
        let mut c = config;
        let mut n = initial_n.max(2);
        loop {
            let before = c.len();
            c = self.ddmin_once(c, n)?;
            let reduced = c.len() < before;
            if self.dd_star && reduced {
                n = n.max(2).min(c.len().max(2));
            } else {
                break;
            }
        }
        self.events.finished("fixed point", &c);
        Ok(c)
    }

    fn ddmin_once(&mut self, mut c: Configuration, mut n: usize) -> Result<Configuration, ReductionError> {
        self.events.iteration_started(0, &c);
        let mut complement_offset: usize = 0;

        'cycle: loop {
            if c.is_empty() {
                return Ok(c);
            }
            // Floor only, never cap to `|c|`: when `|c| < n` the splitter
            // yields empty chunks (spec §3), and testing them is how a
            // singleton (or smaller) configuration gets to shrink further,
            // down to the empty configuration itself.
            n = n.max(2);
            self.events.cycle_started(0, 0, &c);
            let subsets = self.splitter.split(&c, n);

            for index in self.config_iterator.iter(n).collect::<Vec<_>>() {
                if let Some(stop) = &self.stop {
                    stop.check(&c)?;
                }

                let (candidate, config_id, is_subset_fail) = if is_subset(index) {
                    let i = index as usize;
                    let candidate = subsets[i].clone();
                    let id = ConfigId::new(self.id_prefix.clone()).with_suffix(format!("s{i}"));
                    (candidate, id, true)
                } else {
                    let logical = complement_slot(index);
                    let physical = (logical + complement_offset) % n;
                    let candidate: Configuration = subsets
                        .iter()
                        .enumerate()
                        .filter(|(si, _)| *si != physical)
                        .flat_map(|(_, s)| s.as_slice().to_vec())
                        .collect();
                    let id = ConfigId::new(self.id_prefix.clone()).with_suffix(format!("c{physical}"));
                    (candidate, id, false)
                };

                let outcome = self.test_config(&candidate, &config_id)?;
                // A FAIL only counts as progress if it's strictly smaller than
                // `c`. When `n > |c|` some subset/complement can coincide with
                // `c` itself (same content, same known verdict); accepting
                // that as a "reduction" would just spin the cycle in place.
                if outcome == Outcome::Fail && candidate.len() < c.len() {
                    self.events.successful_reduction(&candidate);
                    self.cache.clean(&candidate);
                    c = candidate;
                    if is_subset_fail {
                        n = 2;
                        complement_offset = 0;
                    } else {
                        let removed = (complement_slot(index) + complement_offset) % n;
                        n = (n - 1).max(2);
                        complement_offset = removed;
                    }
                    continue 'cycle;
                }
            }

            // No FAIL this cycle.
            if n < c.len() {
                n = (n * 2).min(c.len());
                complement_offset = 0;
                self.events.configuration_split(&c);
                continue 'cycle;
            }

            return Ok(c);
        }
    }
}
