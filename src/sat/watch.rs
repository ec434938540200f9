#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Two-watched-literal lists.

use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

/// Watch lists indexed by literal index. A clause of length two or more is
/// watched on its first two literals and sits in the list of each of them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchedLiterals(Vec<SmallVec<[usize; 6]>>);

impl WatchedLiterals {
    /// Empty lists for `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![SmallVec::new(); num_vars.max(1) * 2])
    }

    /// Watches clause `idx` on its first two literals.
    pub fn add_clause<L: Literal>(&mut self, clause: &Clause<L>, idx: usize) {
        debug_assert!(clause.len() >= 2);
        debug_assert_ne!(clause[0], clause[1]);

        self[clause[0]].push(idx);
        self[clause[1]].push(idx);
    }

    /// Takes the list for `lit` out, leaving an empty one in its place.
    pub fn take<L: Literal>(&mut self, lit: L) -> SmallVec<[usize; 6]> {
        std::mem::take(&mut self[lit])
    }

    /// Drops references to clauses that `keep` rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) {
        for list in &mut self.0 {
            list.retain(|idx| keep(*idx));
        }
    }
}

impl<L: Literal> Index<L> for WatchedLiterals {
    type Output = SmallVec<[usize; 6]>;

    fn index(&self, index: L) -> &Self::Output {
        &self.0[index.index()]
    }
}

impl<L: Literal> IndexMut<L> for WatchedLiterals {
    fn index_mut(&mut self, index: L) -> &mut Self::Output {
        &mut self.0[index.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    #[test]
    fn test_add_clause_watches_first_two() {
        let mut watches = WatchedLiterals::new(4);
        let clause: Clause = Clause::new(&[1, -2, 3]);
        watches.add_clause(&clause, 0);

        assert_eq!(watches[PackedLiteral::from_i32(1)].as_slice(), &[0]);
        assert_eq!(watches[PackedLiteral::from_i32(-2)].as_slice(), &[0]);
        assert!(watches[PackedLiteral::from_i32(2)].is_empty());
        assert!(watches[PackedLiteral::from_i32(3)].is_empty());

        let taken = watches.take(PackedLiteral::from_i32(1));
        assert_eq!(taken.as_slice(), &[0]);
        assert!(watches[PackedLiteral::from_i32(1)].is_empty());
    }
}
