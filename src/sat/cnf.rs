#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conjunctive normal form formulas.
//!
//! A `Cnf` is the unit of exchange between the integer layer and the SAT
//! engine: the order encoder emits clauses into one, the solver consumes it,
//! and `Display` renders it as DIMACS for export.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, PackedLiteral};
use core::ops::{Index, IndexMut};
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::num::NonZeroI32;

/// A formula in conjunctive normal form. Learnt clauses are appended to the
/// same list during search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf<L: Literal = PackedLiteral> {
    /// Original clauses, then learnt ones.
    pub clauses: Vec<Clause<L>>,
    /// One past the largest variable index, so per-variable tables can be
    /// sized with it directly.
    pub num_vars: usize,
    /// Clauses at positions `>= non_learnt_idx` were learnt during search.
    pub non_learnt_idx: usize,
}

impl<L: Literal> Cnf<L> {
    /// A formula from clauses of DIMACS literals.
    pub fn new<I, C>(clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        let clauses = clauses
            .into_iter()
            .map(|c| c.into_iter().map(L::from_i32).collect::<Clause<L>>())
            .collect_vec();

        let num_vars = clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|l| l.variable() as usize)
            .max()
            .map_or(1, |max| max + 1);

        Self {
            non_learnt_idx: clauses.len(),
            clauses,
            num_vars,
        }
    }

    /// Grows the variable range so that `max_var` is addressable even if it
    /// never occurs in a clause.
    pub fn ensure_vars(&mut self, max_var: usize) {
        self.num_vars = self.num_vars.max(max_var + 1);
    }

    /// Appends `clause`, growing the variable count to cover it.
    pub fn add_clause(&mut self, clause: Clause<L>) {
        if let Some(max) = clause.iter().map(|l| l.variable() as usize).max() {
            self.ensure_vars(max);
        }
        if !clause.learnt && self.non_learnt_idx == self.clauses.len() {
            self.non_learnt_idx += 1;
        }
        self.clauses.push(clause);
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True if there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterates over the clauses.
    pub fn iter(&self) -> impl Iterator<Item = &Clause<L>> {
        self.clauses.iter()
    }

    /// Number of literal occurrences across the original clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses[..self.non_learnt_idx].iter().map(Clause::len).sum()
    }

    /// Checks that every original clause has a true literal under `solutions`.
    /// Clauses deleted as tautologies are skipped.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.clauses[..self.non_learnt_idx]
            .iter()
            .filter(|c| !c.is_deleted())
            .all(|c| {
                c.iter()
                    .any(|l| NonZeroI32::new(l.to_i32()).is_some_and(|lit| solutions.check(lit)))
            })
    }
}

impl<L: Literal> Index<usize> for Cnf<L> {
    type Output = Clause<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl<L: Literal> IndexMut<usize> for Cnf<L> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.clauses[index]
    }
}

impl<L: Literal> From<Vec<Vec<i32>>> for Cnf<L> {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(clauses)
    }
}

/// DIMACS rendering of the original (non-learnt) clauses.
impl<L: Literal> Display for Cnf<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let original = &self.clauses[..self.non_learnt_idx];
        writeln!(
            f,
            "p cnf {} {}",
            self.num_vars.saturating_sub(1),
            original.len()
        )?;
        for clause in original {
            writeln!(f, "{} 0", clause.iter().map(|l| l.to_i32()).join(" "))?;
        }
        Ok(())
    }
}
