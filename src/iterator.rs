//! Orderings over subset and complement indices of an `n`-way partition.
//!
//! The stream encodes both subsets (`0..n`) and complements (`-1..=-n`,
//! mapped `i ↦ -(i+1)`) as `isize`. [`CombinedIterator`] composes a subset
//! ordering and a complement ordering with a `subset_first` flag.

/// Direction a [`SubsetIterator`]/[`ComplementIterator`] walks its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Look up a direction by its CLI-facing name (`"forward"` or `"backward"`).
pub fn direction_by_name(name: &str) -> Option<Direction> {
    match name {
        "forward" => Some(Direction::Forward),
        "backward" => Some(Direction::Backward),
        _ => None,
    }
}

/// Names accepted by [`direction_by_name`].
pub const NAMES: &[&str] = &["forward", "backward"];

fn ordered_range(n: usize, dir: Direction) -> Box<dyn Iterator<Item = usize>> {
    match dir {
        Direction::Forward => Box::new(0..n),
        Direction::Backward => Box::new((0..n).rev()),
    }
}

/// Yields subset indices `0..n` in the given direction.
pub struct SubsetIterator {
    dir: Direction,
}

impl SubsetIterator {
    pub fn new(dir: Direction) -> Self {
        Self { dir }
    }

    pub fn iter(&self, n: usize) -> impl Iterator<Item = isize> {
        ordered_range(n, self.dir).map(|i| i as isize)
    }
}

/// Yields complement indices `-1..=-n` (encoded `i ↦ -(i+1)`) in the given
/// direction over the underlying `0..n` slot order.
pub struct ComplementIterator {
    dir: Direction,
}

impl ComplementIterator {
    pub fn new(dir: Direction) -> Self {
        Self { dir }
    }

    pub fn iter(&self, n: usize) -> impl Iterator<Item = isize> {
        ordered_range(n, self.dir).map(|i| -(i as isize) - 1)
    }
}

/// Composes a subset ordering and a complement ordering: yields every
/// subset index (in order), then every complement index (in order), or the
/// reverse when `subset_first` is `false`.
pub struct CombinedIterator {
    subsets: SubsetIterator,
    complements: ComplementIterator,
    subset_first: bool,
}

impl CombinedIterator {
    pub fn new(subsets: SubsetIterator, complements: ComplementIterator, subset_first: bool) -> Self {
        Self {
            subsets,
            complements,
            subset_first,
        }
    }

    /// Default ordering: forward subsets, forward complements, subsets
    /// first — matching picire's out-of-the-box CLI defaults.
    pub fn default_order() -> Self {
        Self::new(
            SubsetIterator::new(Direction::Forward),
            ComplementIterator::new(Direction::Forward),
            true,
        )
    }

    /// Produce the index stream for a partition of size `n`. Lazy,
    /// restartable (a fresh call is made for each reduction cycle).
    pub fn iter(&self, n: usize) -> Box<dyn Iterator<Item = isize> + '_> {
        let subsets = self.subsets.iter(n);
        let complements = self.complements.iter(n);
        if self.subset_first {
            Box::new(subsets.chain(complements))
        } else {
            Box::new(complements.chain(subsets))
        }
    }
}

/// Decode a combined-iterator index into a subset slot (`Some(i)`) or a
/// complement slot (`None`, with the slot recoverable as `-i - 1`).
pub fn is_subset(index: isize) -> bool {
    index >= 0
}

/// Recover the 0-based slot from a complement-encoded index.
pub fn complement_slot(index: isize) -> usize {
    debug_assert!(index < 0);
    (-index - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_forward() {
        let it = SubsetIterator::new(Direction::Forward);
        assert_eq!(it.iter(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn subset_backward() {
        let it = SubsetIterator::new(Direction::Backward);
        assert_eq!(it.iter(4).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn complement_encoding_round_trips() {
        let it = ComplementIterator::new(Direction::Forward);
        let indices: Vec<isize> = it.iter(3).collect();
        assert_eq!(indices, vec![-1, -2, -3]);
        let slots: Vec<usize> = indices.iter().map(|&i| complement_slot(i)).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn combined_subsets_first() {
        let combined = CombinedIterator::new(
            SubsetIterator::new(Direction::Forward),
            ComplementIterator::new(Direction::Forward),
            true,
        );
        let seq: Vec<isize> = combined.iter(2).collect();
        assert_eq!(seq, vec![0, 1, -1, -2]);
    }

    #[test]
    fn combined_complements_first() {
        let combined = CombinedIterator::new(
            SubsetIterator::new(Direction::Forward),
            ComplementIterator::new(Direction::Forward),
            false,
        );
        let seq: Vec<isize> = combined.iter(2).collect();
        assert_eq!(seq, vec![-1, -2, 0, 1]);
    }

    #[test]
    fn direction_by_name_rejects_unknown() {
        assert!(direction_by_name("sideways").is_none());
    }
}
