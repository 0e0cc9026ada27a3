//! Atom arrays: the ordered, immutable sequence of indivisible input units
//! that configurations index into.

use std::sync::Arc;

/// Which indivisible unit an atom pass reduces over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    /// Whole lines, newline-inclusive.
    Line,
    /// Individual characters (Unicode scalar values).
    Char,
}

/// The ordered sequence of atomic input units derived once per atom pass.
///
/// Built once and immutable thereafter; [`crate::config::Configuration`]
/// values index into it. Cheaply cloneable (`Arc`-backed) so it can be
/// shared across worker threads in [`crate::parallel_dd::ParallelDd`].
#[derive(Debug, Clone)]
pub struct AtomArray {
    atoms: Arc<[String]>,
}

impl AtomArray {
    /// Split `content` into lines, keeping line terminators attached to the
    /// preceding line (so concatenation round-trips exactly).
    pub fn lines(content: &str) -> Self {
        let mut atoms = Vec::new();
        let mut start = 0;
        let bytes = content.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                atoms.push(content[start..=i].to_string());
                start = i + 1;
            }
        }
        if start < content.len() {
            atoms.push(content[start..].to_string());
        }
        Self {
            atoms: atoms.into(),
        }
    }

    /// Split `content` into individual characters.
    pub fn chars(content: &str) -> Self {
        let atoms: Vec<String> = content.chars().map(|c| c.to_string()).collect();
        Self {
            atoms: atoms.into(),
        }
    }

    pub fn by_kind(content: &str, kind: AtomKind) -> Self {
        match kind {
            AtomKind::Line => Self::lines(content),
            AtomKind::Char => Self::chars(content),
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keeps_terminators() {
        let atoms = AtomArray::lines("a\nb\nc");
        assert_eq!(atoms.as_slice(), &["a\n", "b\n", "c"]);
    }

    #[test]
    fn lines_trailing_newline_has_no_empty_tail() {
        let atoms = AtomArray::lines("a\nb\n");
        assert_eq!(atoms.as_slice(), &["a\n", "b\n"]);
    }

    #[test]
    fn chars_splits_unicode_scalars() {
        let atoms = AtomArray::chars("ab€");
        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms.as_slice()[2], "€");
    }
}
