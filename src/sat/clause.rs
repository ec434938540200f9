// #![warn(
//     clippy::all,
//     clippy::restriction,
//     clippy::pedantic,
//     clippy::nursery,
//     clippy::cargo,
// )]
//! Clauses and their literal block distance.

use crate::sat::literal::{Literal, PackedLiteral};
use crate::sat::trail::Trail;
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use smallvec::SmallVec;

/// A disjunction of literals, original or learnt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause<L: Literal = PackedLiteral> {
    /// The literals of the clause.
    pub literals: SmallVec<[L; 8]>,
    /// Literal block distance, set when the clause is learnt.
    pub lbd: u32,
    /// True for a learnt clause.
    pub learnt: bool,
    /// Set once the clause has been removed from the database.
    pub deleted: bool,
}

impl<L: Literal> Clause<L> {
    /// A clause from DIMACS literals.
    #[must_use]
    pub fn new(literals: &[i32]) -> Self {
        literals.iter().copied().map(L::from_i32).collect()
    }

    /// A learnt clause with its LBD.
    #[must_use]
    pub fn learnt(literals: Vec<L>, lbd: u32) -> Self {
        Self {
            literals: SmallVec::from_vec(literals),
            lbd,
            learnt: true,
            deleted: false,
        }
    }

    /// Number of literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Iterates over the literals.
    pub fn iter(&self) -> impl Iterator<Item = &L> {
        self.literals.iter()
    }

    /// Swaps the literals at `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.literals.swap(i, j);
    }

    /// True for a single-literal clause.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    /// True for the empty clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// True once removed from the database.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Marks the clause as removed and releases its literals.
    pub fn delete(&mut self) {
        self.deleted = true;
        self.literals = SmallVec::new();
    }

    /// Sorts the literals and drops duplicates so that the two watched
    /// positions always refer to distinct literals.
    pub fn normalise(&mut self) {
        self.literals.sort_unstable();
        self.literals.dedup();
    }

    /// True if the clause contains a literal and its negation. Expects a
    /// normalised clause.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.variable() == b.variable())
    }

    /// Literal block distance: the number of distinct decision levels among
    /// the clause's literals.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn calculate_lbd(&self, trail: &Trail<L>) -> u32 {
        self.literals
            .iter()
            .map(|l| trail.level(l.variable()))
            .unique()
            .count() as u32
    }

    /// The literals as DIMACS integers.
    #[must_use]
    pub fn to_i32s(&self) -> Vec<i32> {
        self.literals.iter().map(|l| l.to_i32()).collect()
    }
}

impl<L: Literal> FromIterator<L> for Clause<L> {
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        Self {
            literals: iter.into_iter().collect(),
            lbd: 0,
            learnt: false,
            deleted: false,
        }
    }
}

impl<L: Literal> Index<usize> for Clause<L> {
    type Output = L;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl<L: Literal> IndexMut<usize> for Clause<L> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.literals[index]
    }
}

impl<L: Literal> From<Vec<i32>> for Clause<L> {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(&literals)
    }
}

impl<L: Literal> From<&Vec<i32>> for Clause<L> {
    fn from(literals: &Vec<i32>) -> Self {
        Self::new(literals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let clause: Clause = Clause::new(&[1, 2, 3]);
        assert_eq!(clause.len(), 3);
        assert!(!clause.learnt);
    }

    #[test]
    fn test_iter() {
        let clause: Clause = Clause::new(&[1, -2, 3]);
        let mut iter = clause.iter();
        assert_eq!(iter.next(), Some(&PackedLiteral::from_i32(1)));
        assert_eq!(iter.next(), Some(&PackedLiteral::from_i32(-2)));
        assert_eq!(iter.next(), Some(&PackedLiteral::from_i32(3)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_swap() {
        let mut clause: Clause = Clause::new(&[1, 2, 3]);
        clause.swap(0, 2);
        assert_eq!(clause.to_i32s(), vec![3, 2, 1]);
    }

    #[test]
    fn test_normalise_and_tautology() {
        let mut clause: Clause = Clause::new(&[3, 1, 3, -2]);
        clause.normalise();
        assert_eq!(clause.len(), 3);
        assert!(!clause.is_tautology());

        let mut taut: Clause = Clause::new(&[4, 1, -4]);
        taut.normalise();
        assert!(taut.is_tautology());
    }

    #[test]
    fn test_delete_releases_literals() {
        let mut clause: Clause = Clause::new(&[1, 2]);
        clause.delete();
        assert!(clause.is_deleted());
        assert!(clause.is_empty());
    }
}
