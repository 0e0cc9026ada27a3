//! Configurations: sorted, duplicate-free index lists into the atom array.

use std::ops::Deref;

/// A strictly increasing sequence of non-negative indices into the current
/// atom array.
///
/// Canonical form is sorted and duplicate-free; the constructors enforce
/// this so no call site has to re-validate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Configuration(Vec<usize>);

impl Configuration {
    /// Build a configuration from indices in arbitrary order, sorting and
    /// deduplicating them.
    pub fn new(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self(indices)
    }

    /// The empty configuration.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A configuration containing every index `0..len`.
    pub fn full(len: usize) -> Self {
        Self((0..len).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for Configuration {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Configuration {
    fn from(indices: Vec<usize>) -> Self {
        Configuration::new(indices)
    }
}

impl FromIterator<usize> for Configuration {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Configuration::new(iter.into_iter().collect())
    }
}

/// Identifier threaded through the tester contract: `(atom-pass, cycle,
/// subset/complement slot)` as short strings, e.g. `("a0", "r3", "s2")`.
///
/// Typical implementations use it as a scratch-directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigId(pub Vec<String>);

impl ConfigId {
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn with_suffix(&self, part: impl Into<String>) -> Self {
        let mut parts = self.0.clone();
        parts.push(part.into());
        Self(parts)
    }
}

impl std::fmt::Display for ConfigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sorts_and_dedups() {
        let c = Configuration::new(vec![3, 1, 2, 1, 3]);
        assert_eq!(c.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn config_id_display() {
        let id = ConfigId::new(["a0", "r3"]).with_suffix("s2");
        assert_eq!(id.to_string(), "a0-r3-s2");
    }
}
