//! Partition a configuration into `n` contiguous, order-preserving chunks.
//!
//! Two strategies ship: [`ZellerSplitter`], the boundary-by-division scheme
//! from Zeller's original ddmin paper, and [`BalancedSplitter`], which
//! spreads the remainder evenly instead of dumping it all in the trailing
//! chunks. Both are pure functions with no state, selectable by name via
//! [`by_name`] for the CLI's `--split` flag.

use crate::config::Configuration;

/// Partition a configuration of length `m` into `n` (possibly empty)
/// contiguous sub-sequences whose concatenation equals the input.
///
/// Implementations must tolerate `n > m` (trailing/empty chunks) and must
/// preserve order: `chunks[0] ++ chunks[1] ++ .. ++ chunks[n-1] == config`.
pub trait Splitter: Send + Sync {
    fn split(&self, config: &Configuration, n: usize) -> Vec<Configuration>;
}

/// Chunk boundaries at `⌊i·m/n⌋` for `i ∈ [0,n]`. When `n > m` the trailing
/// chunks are empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZellerSplitter;

impl Splitter for ZellerSplitter {
    fn split(&self, config: &Configuration, n: usize) -> Vec<Configuration> {
        let m = config.len();
        if n == 0 {
            return Vec::new();
        }
        let mut chunks = Vec::with_capacity(n);
        for i in 0..n {
            let start = i * m / n;
            let end = (i + 1) * m / n;
            chunks.push(Configuration::new(config[start..end].to_vec()));
        }
        chunks
    }
}

/// Distribute the `m mod n` surplus elements one each to the first
/// `m mod n` chunks, so no two chunk sizes differ by more than one.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalancedSplitter;

impl Splitter for BalancedSplitter {
    fn split(&self, config: &Configuration, n: usize) -> Vec<Configuration> {
        let m = config.len();
        if n == 0 {
            return Vec::new();
        }
        let base = m / n;
        let surplus = m % n;
        let mut chunks = Vec::with_capacity(n);
        let mut pos = 0;
        for i in 0..n {
            let size = base + if i < surplus { 1 } else { 0 };
            chunks.push(Configuration::new(config[pos..pos + size].to_vec()));
            pos += size;
        }
        chunks
    }
}

/// Look up a splitter by its CLI-facing name (`"zeller"` or `"balanced"`).
pub fn by_name(name: &str) -> Option<Box<dyn Splitter>> {
    match name {
        "zeller" => Some(Box::new(ZellerSplitter)),
        "balanced" => Some(Box::new(BalancedSplitter)),
        _ => None,
    }
}

/// Names accepted by [`by_name`], for CLI help text and validation.
pub const NAMES: &[&str] = &["zeller", "balanced"];

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(chunks: &[Configuration]) -> Vec<usize> {
        chunks.iter().flat_map(|c| c.as_slice().to_vec()).collect()
    }

    #[test]
    fn zeller_concatenation_equals_input() {
        let config = Configuration::new((0..10).collect());
        let chunks = ZellerSplitter.split(&config, 3);
        assert_eq!(concat(&chunks), config.as_slice());
    }

    #[test]
    fn zeller_tolerates_n_greater_than_m() {
        let config = Configuration::new(vec![0, 1]);
        let chunks = ZellerSplitter.split(&config, 5);
        assert_eq!(chunks.len(), 5);
        assert_eq!(concat(&chunks), config.as_slice());
        assert!(chunks.iter().any(|c| c.is_empty()));
    }

    #[test]
    fn balanced_chunk_sizes_differ_by_at_most_one() {
        let config = Configuration::new((0..10).collect());
        let chunks = BalancedSplitter.split(&config, 3);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(concat(&chunks), config.as_slice());
    }

    #[test]
    fn balanced_concatenation_equals_input() {
        let config = Configuration::new((0..7).collect());
        let chunks = BalancedSplitter.split(&config, 4);
        assert_eq!(concat(&chunks), config.as_slice());
    }

    #[test]
    fn by_name_rejects_unknown_strategy() {
        assert!(by_name("bogus").is_none());
    }
}
