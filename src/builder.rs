//! Pure, deterministic mapping from a configuration to concrete test
//! content.

use crate::atoms::AtomArray;
use crate::config::Configuration;

/// Maps an index list to content. Must be pure and deterministic:
/// identical configurations yield identical content.
pub trait TestBuilder: Send + Sync {
    fn build(&self, config: &Configuration) -> String;
}

/// Concatenates the atoms at the given indices, in index order.
///
/// `Clone` is cheap: the backing [`AtomArray`] is `Arc`-shared.
#[derive(Debug, Clone)]
pub struct ConcatTestBuilder {
    atoms: AtomArray,
}

impl ConcatTestBuilder {
    pub fn new(atoms: AtomArray) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &AtomArray {
        &self.atoms
    }
}

impl TestBuilder for ConcatTestBuilder {
    fn build(&self, config: &Configuration) -> String {
        let slice = self.atoms.as_slice();
        let mut out = String::new();
        for &i in config.as_slice() {
            if let Some(atom) = slice.get(i) {
                out.push_str(atom);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_builds_in_index_order() {
        let atoms = AtomArray::lines("a\nb\nc\n");
        let builder = ConcatTestBuilder::new(atoms);
        let config = Configuration::new(vec![2, 0]);
        assert_eq!(builder.build(&config), "a\nc\n");
    }

    #[test]
    fn concat_empty_config_is_empty_content() {
        let atoms = AtomArray::lines("a\nb\n");
        let builder = ConcatTestBuilder::new(atoms);
        assert_eq!(builder.build(&Configuration::empty()), "");
    }

    #[test]
    fn deterministic_for_identical_configs() {
        let atoms = AtomArray::lines("a\nb\nc\n");
        let builder = ConcatTestBuilder::new(atoms);
        let config = Configuration::new(vec![0, 2]);
        assert_eq!(builder.build(&config), builder.build(&config));
    }
}
