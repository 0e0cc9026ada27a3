//! ddreduce - a delta-debugging test-case reducer
//!
//! Shrinks a failing input to a smaller one that still triggers the same
//! externally-observable failure, via Zeller's ddmin/dd-star family. The
//! algorithm is exposed as a library ([`Dd`] for the sequential reducer,
//! [`ParallelDd`] for the bounded-concurrency overlay) built from a small
//! set of collaborator traits — [`splitter::Splitter`],
//! [`builder::TestBuilder`], [`tester::Tester`], [`cache::OutcomeCache`] —
//! so alternative strategies can be swapped in without touching the core
//! loop.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ddreduce::atoms::AtomArray;
//! use ddreduce::builder::ConcatTestBuilder;
//! use ddreduce::cache::{CacheConfig, ConfigTupleCache};
//! use ddreduce::config::Configuration;
//! use ddreduce::dd::Dd;
//! use ddreduce::events::EventSink;
//! use ddreduce::iterator::CombinedIterator;
//! use ddreduce::splitter::ZellerSplitter;
//! use ddreduce::tester::{Tester, SubprocessTester};
//!
//! # fn main() -> ddreduce::error::Result<()> {
//! let atoms = AtomArray::lines("a\nb\nX\nc\n");
//! let builder: Arc<dyn ddreduce::builder::TestBuilder> =
//!     Arc::new(ConcatTestBuilder::new(atoms.clone()));
//! let tester: Box<dyn Tester> = Box::new(SubprocessTester::new("./is_interesting.sh", "/tmp/ddreduce"));
//!
//! let mut dd = Dd::new(
//!     Box::new(ZellerSplitter),
//!     CombinedIterator::default_order(),
//!     Box::new(ConfigTupleCache::new(CacheConfig::new())),
//!     builder,
//!     tester,
//!     vec!["a0".to_string()],
//!     true,
//!     None,
//!     EventSink::new(),
//! );
//!
//! let minimal = dd.reduce(Configuration::full(atoms.len()), 2)?;
//! # let _ = minimal;
//! # Ok(())
//! # }
//! ```

pub mod atoms;
pub mod builder;
pub mod cache;
pub mod config;
pub mod dd;
pub mod error;
pub mod events;
pub mod iterator;
pub mod outcome;
pub mod parallel_dd;
pub mod splitter;
pub mod stop;
pub mod tester;
pub mod version;

pub use dd::Dd;
pub use error::{ReductionError, Result};
pub use outcome::Outcome;
pub use parallel_dd::ParallelDd;
