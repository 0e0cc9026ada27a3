//! The outcome cache: memoizes per-configuration test verdicts.
//!
//! Four storage strategies plus a disabled [`none::NoCache`], all behind the
//! same [`OutcomeCache`] trait — select one by name via [`by_name`] for the
//! CLI's `--cache` flag. [`shared::SharedCache`] interposes a mutex so any
//! strategy can be shared between the sequential reducer's single thread
//! and [`crate::parallel_dd::ParallelDd`]'s worker pool.
//!
//! # Strategies
//!
//! | Name | Key | What is stored |
//! |---|---|---|
//! | `none` | — | nothing |
//! | `config` | configuration (trie path) | outcome at path terminal |
//! | `config-tuple` | configuration (as a `Vec<usize>`) | outcome |
//! | `content` | built content (string) | outcome |
//! | `content-hash` | 32-byte BLAKE3 digest of content | (outcome, content length) |
//!
//! `content` and `content-hash` key on the *built* content
//! (`test_builder.build(config)`), not on the raw configuration — see
//! [`OutcomeCache::set_test_builder`]. This is a deliberate deviation from
//! picire's `ContentCache`/`ContentHashCache`, which key on `config`
//! directly and carry a `TODO` acknowledging it; this crate implements the
//! documented intent instead of the bug.

pub mod content;
pub mod content_hash;
pub mod none;
pub mod shared;
pub mod trie;
pub mod tuple;

pub use content::ContentCache;
pub use content_hash::ContentHashCache;
pub use none::NoCache;
pub use shared::SharedCache;
pub use trie::ConfigCache;
pub use tuple::ConfigTupleCache;

use std::sync::Arc;

use crate::builder::TestBuilder;
use crate::config::Configuration;
use crate::outcome::Outcome;

/// Configuration shared by every cache strategy (strategy-specific
/// constructors accept it and ignore fields that don't apply — e.g.
/// `content-hash` always forces `cache_fail` off).
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheConfig {
    /// Store `Fail` outcomes, not just `Pass`. Forced off for
    /// `content-hash`: a hash collision on a cached `Fail` would mask a
    /// real failure.
    pub cache_fail: bool,
    /// Whether `clean()` actually evicts anything.
    pub evict_after_fail: bool,
    /// Whether `get_size()` returns real introspection numbers.
    pub measure_memory: bool,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self {
            cache_fail: false,
            evict_after_fail: true,
            measure_memory: false,
        }
    }
}

/// Memoizes per-configuration verdicts; evicts on failure per §4.3.
///
/// Base implementations are **not** thread-safe — wrap with
/// [`shared::SharedCache`] to share across the parallel reducer's worker
/// pool.
pub trait OutcomeCache: Send {
    /// Bind the pure index→content function used by content-keyed
    /// strategies during `add`/`lookup`/`clean`. No-op for strategies that
    /// key on the configuration itself.
    fn set_test_builder(&mut self, builder: Arc<dyn TestBuilder>);

    /// Idempotent insert (last write wins).
    fn add(&mut self, config: &Configuration, outcome: Outcome);

    /// Known verdict, or `None` on a miss.
    fn lookup(&self, config: &Configuration) -> Option<Outcome>;

    /// Remove all entries.
    fn clear(&mut self);

    /// Evict entries "larger than" `config` per the strategy's definition
    /// in spec §4.3. No-op if `evict_after_fail` is `false`.
    fn clean(&mut self, config: &Configuration);

    /// `(bytes, entries)`; `(0, 0)` when memory measurement is disabled.
    fn get_size(&self) -> (usize, usize);
}

/// Construct a cache strategy by its CLI-facing name.
pub fn by_name(name: &str, config: CacheConfig) -> Option<Box<dyn OutcomeCache>> {
    match name {
        "none" => Some(Box::new(NoCache::new(config))),
        "config" => Some(Box::new(ConfigCache::new(config))),
        "config-tuple" => Some(Box::new(ConfigTupleCache::new(config))),
        "content" => Some(Box::new(ContentCache::new(config))),
        "content-hash" => Some(Box::new(ContentHashCache::new(config))),
        _ => None,
    }
}

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["none", "config", "config-tuple", "content", "content-hash"];
