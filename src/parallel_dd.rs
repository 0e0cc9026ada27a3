//! Bounded-concurrency ddmin overlay.
//!
//! Runs up to `jobs` subset/complement tests of the current cycle
//! concurrently instead of sequentially. As soon as any dispatch reports
//! `Fail`, the remaining in-flight dispatches for that cycle are left to
//! finish (their results still feed the greedy merge below) but no new ones
//! are started. Correctness is identical to the sequential reducer — only
//! the number and ordering of tests performed differs, per spec §4.5.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::builder::TestBuilder;
use crate::cache::SharedCache;
use crate::config::{ConfigId, Configuration};
use crate::error::ReductionError;
use crate::events::EventSink;
use crate::iterator::{CombinedIterator, complement_slot, is_subset};
use crate::outcome::Outcome;
use crate::splitter::Splitter;
use crate::stop::StopPredicate;
use crate::tester::Tester;

/// One dispatch's outcome, tagged with enough to place it back into the
/// greedy merge: its combined-iterator position (for ordering) and the
/// "interesting index" value the merge keys on — a subset's raw slot
/// (`0..n`) or a complement's offset-resolved physical slot, encoded
/// `-physical - 1`.
struct Probe {
    /// Position in this cycle's candidate list, i.e. the configured
    /// iterator's emission order — used to find the earliest FAIL
    /// regardless of completion order.
    seq: usize,
    /// The greedy-merge "interesting index": `>= 0` for a subset slot,
    /// `< 0` (`-physical - 1`) for a complement's offset-resolved slot.
    value: isize,
    /// Length of the candidate this probe tested, so a FAIL that merely
    /// reproduces the whole current configuration (possible when `n > |c|`)
    /// can be told apart from a genuine reduction.
    len: usize,
    outcome: Outcome,
}

/// Concurrent ddmin/dd-star reducer sharing the sequential reducer's
/// collaborators, but requiring a [`SharedCache`] (the cache is accessed
/// from multiple worker tasks within one cycle) and an owned, `Clone`-cheap
/// [`TestBuilder`]/[`Tester`] pair so each task can dispatch independently.
pub struct ParallelDd {
    splitter: Box<dyn Splitter>,
    config_iterator: CombinedIterator,
    cache: Arc<SharedCache>,
    builder: Arc<dyn TestBuilder>,
    tester: Arc<dyn Tester>,
    id_prefix: Vec<String>,
    dd_star: bool,
    stop: Option<Arc<StopPredicate>>,
    events: EventSink,
    jobs: usize,
    /// Whether to run the greedy merge over concurrently discovered FAILs
    /// (spec §4.5). When `false`, the cycle falls back to classical
    /// first-FAIL-wins: the earliest interesting index in iteration order
    /// is adopted outright.
    greedy: bool,
}

impl ParallelDd {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        splitter: Box<dyn Splitter>,
        config_iterator: CombinedIterator,
        cache: Arc<SharedCache>,
        builder: Arc<dyn TestBuilder>,
        tester: Arc<dyn Tester>,
        id_prefix: Vec<String>,
        dd_star: bool,
        stop: Option<Arc<StopPredicate>>,
        events: EventSink,
        jobs: usize,
        greedy: bool,
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
            jobs: jobs.max(1),
            greedy,
        }
    }

    pub async fn reduce(&mut self, config: Configuration, initial_n: usize) -> Result<Configuration, ReductionError> {
        let mut c = config;
        let mut n = initial_n.max(2);
        loop {
            let before = c.len();
            c = self.ddmin_once(c, n).await?;
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

    async fn ddmin_once(&mut self, mut c: Configuration, mut n: usize) -> Result<Configuration, ReductionError> {
        self.events.iteration_started(0, &c);
        let mut complement_offset: usize = 0;

        loop {
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
            let candidates = self.build_candidates(&subsets, n, complement_offset);

            let interesting = self.dispatch_cycle(candidates, c.len()).await?;

            if interesting.is_empty() {
                if n < c.len() {
                    n = (n * 2).min(c.len());
                    complement_offset = 0;
                    self.events.configuration_split(&c);
                    continue;
                }
                return Ok(c);
            }

            let (merged, fvalue, last_was_subset) = self.greedy_search(&subsets, n, &interesting, false).await?;
            let new_c: Configuration = merged.iter().flat_map(|s| s.as_slice().to_vec()).collect();
            self.events.successful_reduction(&new_c);
            self.cache.clean(&new_c);

            if last_was_subset {
                n = 2;
                complement_offset = 0;
            } else {
                n = merged.len().max(2);
                complement_offset = fvalue;
            }
            c = new_c;
        }
    }

    /// Materialize the candidate configuration for every index this cycle
    /// will test, in iterator order, alongside the greedy-merge "value"
    /// each would contribute if it turns out to be interesting.
    fn build_candidates(
        &self,
        subsets: &[Configuration],
        n: usize,
        complement_offset: usize,
    ) -> Vec<(usize, isize, Configuration, ConfigId)> {
        self.config_iterator
            .iter(n)
            .enumerate()
            .map(|(seq, index)| {
                if is_subset(index) {
                    let i = index as usize;
                    let id = ConfigId::new(self.id_prefix.clone()).with_suffix(format!("s{i}"));
                    (seq, index, subsets[i].clone(), id)
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
                    // Encode as the offset-resolved physical slot, not the
                    // raw iterator index, so the greedy merge can key
                    // directly into `subsets` without redoing the offset
                    // arithmetic.
                    (seq, -(physical as isize) - 1, candidate, id)
                }
            })
            .collect()
    }

    /// Run every candidate of one cycle through a bounded worker pool.
    /// Returns the FAIL "interesting indices" in iterator order (possibly
    /// more than one, since concurrently-dispatched work can surface
    /// several failing slices in a single cycle) — empty if every
    /// candidate passed.
    ///
    /// Workers beyond the first FAIL are not cancelled — they were already
    /// admitted through the semaphore — but no further tasks are spawned
    /// once a FAIL has been observed, so the cycle winds down quickly.
    async fn dispatch_cycle(
        &self,
        candidates: Vec<(usize, isize, Configuration, ConfigId)>,
        total_len: usize,
    ) -> Result<Vec<isize>, ReductionError> {
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let found_fail = Arc::new(AtomicBool::new(false));
        let mut tasks: JoinSet<Result<Probe, ReductionError>> = JoinSet::new();
        let mut stopped: Option<ReductionError> = None;

        for (seq, value, candidate, config_id) in candidates {
            if found_fail.load(Ordering::Acquire) {
                break;
            }
            if let Some(stop) = &self.stop {
                if let Err(err) = stop.check(&candidate) {
                    stopped = Some(err);
                    break;
                }
            }

            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let cache = self.cache.clone();
            let builder = self.builder.clone();
            let tester = self.tester.clone();
            let stop = self.stop.clone();
            let events = self.events.clone();
            let found_fail = found_fail.clone();
            let len = candidate.len();

            tasks.spawn(async move {
                let _permit = permit;
                let content = builder.build(&candidate);
                let cached = cache.lookup(&candidate);
                events.cache_lookup(&config_id, cached);

                let outcome = if let Some(outcome) = cached {
                    outcome
                } else {
                    if let Some(stop) = &stop {
                        stop.check(&candidate)?;
                    }
                    events.test_started(&candidate, &config_id);
                    let outcome = tester
                        .test(&content, &config_id)
                        .map_err(|source| ReductionError::Exception {
                            best: candidate.clone(),
                            source,
                        })?;
                    events.test_finished(&candidate, &config_id, outcome);
                    if let Some(stop) = &stop {
                        stop.record_test();
                    }
                    cache.add(&candidate, outcome);
                    events.cache_insert(&config_id, outcome);
                    outcome
                };

                if outcome == Outcome::Fail {
                    found_fail.store(true, Ordering::Release);
                }

                Ok(Probe { seq, value, len, outcome })
            });
        }

        // Outstanding jobs are awaited, never aborted, even once a FAIL or a
        // stop-predicate trip means no further work will be submitted — a
        // dropped `JoinSet` would cancel tasks still mid-flight.
        let mut probes = Vec::new();
        let mut task_error: Option<ReductionError> = None;
        while let Some(result) = tasks.join_next().await {
            match result.expect("reducer task panicked") {
                Ok(probe) => probes.push(probe),
                Err(err) => {
                    if task_error.is_none() {
                        task_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = task_error {
            return Err(err);
        }
        if let Some(err) = stopped {
            return Err(err);
        }

        probes.sort_by_key(|p| p.seq);
        Ok(probes
            .into_iter()
            // A FAIL only counts as progress if it's strictly smaller than
            // the current configuration; when `n > |c|` a subset/complement
            // can coincide with `c` itself, which would otherwise spin the
            // cycle in place.
            .filter(|p| p.outcome == Outcome::Fail && p.len < total_len)
            .map(|p| p.value)
            .collect())
    }

    /// Map one "interesting index" value to the subset list it proposes
    /// (always relative to the cycle's *original* subsets, per spec §4.5)
    /// and the `complement_offset`/subset-ness that goes with it.
    ///
    /// Returns `(candidate_subsets, fvalue, is_subset)`.
    fn candidate_for_value(orig_subsets: &[Configuration], value: isize, n: usize) -> (Vec<Configuration>, usize, bool) {
        if value < 0 {
            let physical = complement_slot(value);
            let mut remaining = orig_subsets[..physical].to_vec();
            remaining.extend_from_slice(&orig_subsets[physical + 1..]);
            (remaining, physical, false)
        } else {
            debug_assert!((value as usize) < n);
            (vec![orig_subsets[value as usize].clone()], 0, true)
        }
    }

    /// Test a candidate accumulation directly (bypassing the main cycle's
    /// concurrency), consulting the cache first. Used only by the greedy
    /// merge's intermediate/final re-test probes.
    async fn perform_test(&self, subsets: &[Configuration], probe_index: usize, fvalue: usize) -> Result<Outcome, ReductionError> {
        let candidate: Configuration = subsets.iter().flat_map(|s| s.as_slice().to_vec()).collect();
        if let Some(stop) = &self.stop {
            stop.check(&candidate)?;
        }
        let config_id = ConfigId::new(self.id_prefix.clone()).with_suffix(format!("d{probe_index}-f{fvalue}"));
        let content = self.builder.build(&candidate);
        let cached = self.cache.lookup(&candidate);
        self.events.cache_lookup(&config_id, cached);
        if let Some(outcome) = cached {
            return Ok(outcome);
        }

        self.events.test_started(&candidate, &config_id);
        let outcome = self
            .tester
            .test(&content, &config_id)
            .map_err(|source| ReductionError::Exception {
                best: candidate.clone(),
                source,
            })?;
        self.events.test_finished(&candidate, &config_id, outcome);
        if let Some(stop) = &self.stop {
            stop.record_test();
        }
        self.cache.add(&candidate, outcome);
        self.events.cache_insert(&config_id, outcome);
        Ok(outcome)
    }

    /// Greedily accumulate the cycle's interesting indices into the
    /// smallest failing subset list, per spec §4.5.
    ///
    /// With `greedy` off, the first interesting index wins outright
    /// (classical first-FAIL-wins). With `greedy` on, later indices are
    /// adopted only if retesting their candidate (when `retest` is `true`)
    /// still fails; the first index is always adopted without a retest,
    /// since it already failed during the cycle's own dispatch. If, after
    /// walking every index without per-step retesting, the final
    /// accumulation as a whole passes, the merge restarts with
    /// `retest = true` (spec's documented intent for the ambiguous
    /// argument order between the two `_perform_test`-equivalent calls —
    /// see `DESIGN.md`).
    ///
    /// Returns `(subsets, fvalue, last_was_subset)`.
    fn greedy_search<'a>(
        &'a self,
        orig_subsets: &'a [Configuration],
        n: usize,
        interesting: &'a [isize],
        retest: bool,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(Vec<Configuration>, usize, bool), ReductionError>> + 'a>> {
        Box::pin(async move {
            let mut accepted: Option<(Vec<Configuration>, usize, bool)> = None;

            for (i, &value) in interesting.iter().enumerate() {
                let (candidate, fvalue, is_subset) = Self::candidate_for_value(orig_subsets, value, n);

                if !self.greedy {
                    return Ok((candidate, fvalue, is_subset));
                }

                if i > 0 && retest {
                    let outcome = self.perform_test(&candidate, fvalue, i).await?;
                    if outcome == Outcome::Pass {
                        continue;
                    }
                }

                accepted = Some((candidate, fvalue, is_subset));
            }

            // `interesting` is never empty here, so the first loop
            // iteration (which never retests) always sets `accepted`.
            let (subsets, fvalue, last_was_subset) = accepted.expect("at least one interesting index");

            if interesting.len() > 1 && !retest {
                let outcome = self.perform_test(&subsets, fvalue, interesting.len() + 1).await?;
                if outcome == Outcome::Pass {
                    return self.greedy_search(orig_subsets, n, interesting, true).await;
                }
            }

            Ok((subsets, fvalue, last_was_subset))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::AtomArray;
    use crate::builder::ConcatTestBuilder;
    use crate::cache::{CacheConfig, ConfigTupleCache};

    struct SubstringTester(&'static str);

    impl Tester for SubstringTester {
        fn test(&self, content: &str, _config_id: &ConfigId) -> anyhow::Result<Outcome> {
            Ok(Outcome::from_exit_success(content.contains(self.0)))
        }
    }

    fn reducer(atoms: AtomArray, tester: Arc<dyn Tester>, jobs: usize, greedy: bool) -> (ParallelDd, Configuration) {
        let builder: Arc<dyn TestBuilder> = Arc::new(ConcatTestBuilder::new(atoms.clone()));
        let cache = Arc::new(SharedCache::new(Box::new(ConfigTupleCache::new(CacheConfig::new()))));
        let dd = ParallelDd::new(
            Box::new(crate::splitter::ZellerSplitter),
            CombinedIterator::default_order(),
            cache,
            builder,
            tester,
            vec!["a0".to_string()],
            true,
            None,
            EventSink::new(),
            jobs,
            greedy,
        );
        (dd, Configuration::full(atoms.len()))
    }

    #[tokio::test]
    async fn parallel_reduction_matches_sequential_result() {
        let atoms = AtomArray::lines("a\nb\nX\nc\nd\n");
        let (mut dd, config) = reducer(atoms.clone(), Arc::new(SubstringTester("X")), 4, false);
        let result = dd.reduce(config, 2).await.unwrap();
        let builder = ConcatTestBuilder::new(atoms);
        assert_eq!(builder.build(&result), "X\n");
    }

    #[tokio::test]
    async fn single_job_behaves_like_sequential() {
        let atoms = AtomArray::lines("a\nX\nb\n");
        let (mut dd, config) = reducer(atoms.clone(), Arc::new(SubstringTester("X")), 1, false);
        let result = dd.reduce(config, 2).await.unwrap();
        let builder = ConcatTestBuilder::new(atoms);
        assert_eq!(builder.build(&result), "X\n");
    }

    #[tokio::test]
    async fn two_required_atoms_both_survive() {
        let atoms = AtomArray::lines("a\nX\nb\nY\nc\n");
        struct NeedsBoth;
        impl Tester for NeedsBoth {
            fn test(&self, content: &str, _config_id: &ConfigId) -> anyhow::Result<Outcome> {
                Ok(Outcome::from_exit_success(
                    content.contains('X') && content.contains('Y'),
                ))
            }
        }
        let (mut dd, config) = reducer(atoms.clone(), Arc::new(NeedsBoth), 4, false);
        let result = dd.reduce(config, 2).await.unwrap();
        let builder = ConcatTestBuilder::new(atoms);
        let content = builder.build(&result);
        assert!(content.contains('X'));
        assert!(content.contains('Y'));
    }

    #[tokio::test]
    async fn greedy_merge_reduces_with_many_concurrent_workers() {
        // High concurrency and a single job both find the same minimal
        // result; greedy merge must not change correctness, only how many
        // tests are needed to get there.
        let atoms = AtomArray::lines("a\nb\nc\nX\nd\ne\nf\n");
        let (mut dd, config) = reducer(atoms.clone(), Arc::new(SubstringTester("X")), 8, true);
        let result = dd.reduce(config, 2).await.unwrap();
        let builder = ConcatTestBuilder::new(atoms);
        assert_eq!(builder.build(&result), "X\n");
    }

    #[tokio::test]
    async fn greedy_off_matches_first_fail_wins() {
        let atoms = AtomArray::lines("a\nX\nb\nc\nd\n");
        let (mut dd, config) = reducer(atoms.clone(), Arc::new(SubstringTester("X")), 8, false);
        let result = dd.reduce(config, 2).await.unwrap();
        let builder = ConcatTestBuilder::new(atoms);
        assert_eq!(builder.build(&result), "X\n");
    }

    #[test]
    fn candidate_for_subset_value_targets_single_subset() {
        let subsets = vec![
            Configuration::new(vec![0, 1]),
            Configuration::new(vec![2, 3]),
        ];
        let (candidate, fvalue, is_subset) = ParallelDd::candidate_for_value(&subsets, 1, 2);
        assert!(is_subset);
        assert_eq!(fvalue, 0);
        assert_eq!(candidate.len(), 1);
        assert_eq!(candidate[0].as_slice(), &[2, 3]);
    }

    #[test]
    fn candidate_for_complement_value_removes_one_subset() {
        let subsets = vec![
            Configuration::new(vec![0]),
            Configuration::new(vec![1]),
            Configuration::new(vec![2]),
        ];
        let (candidate, fvalue, is_subset) = ParallelDd::candidate_for_value(&subsets, -2, 3);
        assert!(!is_subset);
        assert_eq!(fvalue, 1);
        assert_eq!(candidate.len(), 2);
        assert_eq!(candidate[0].as_slice(), &[0]);
        assert_eq!(candidate[1].as_slice(), &[2]);
    }
}
