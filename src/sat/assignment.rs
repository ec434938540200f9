#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial truth assignments and the models returned by the solver.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};
use std::num::NonZeroI32;

/// Value of a single variable.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    /// No value yet.
    #[default]
    Unassigned,
    /// Assigned the given value.
    Assigned(bool),
}

impl VarState {
    /// True if a value is set.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// True if no value is set.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    /// True if assigned true.
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::Assigned(true))
    }

    /// True if assigned false.
    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::Assigned(false))
    }
}

/// Dense assignment indexed by variable. Slot `0` is unused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl Assignment {
    /// All `num_vars` variables unassigned.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![VarState::Unassigned; num_vars.max(1)])
    }

    /// Number of slots, including the unused slot `0`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.len() <= 1
    }

    /// Assigns `b` to `var`.
    pub fn set(&mut self, var: Variable, b: bool) {
        self.0[var as usize] = VarState::Assigned(b);
    }

    /// Makes `lit` true.
    pub fn assign<L: Literal>(&mut self, lit: L) {
        self.set(lit.variable(), lit.polarity());
    }

    /// Clears the value of `var`.
    pub fn unassign(&mut self, var: Variable) {
        self.0[var as usize] = VarState::Unassigned;
    }

    /// True if a value is set.
    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self[var].is_assigned()
    }

    /// `None` while unassigned.
    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self.0.get(var as usize) {
            Some(VarState::Assigned(b)) => Some(*b),
            _ => None,
        }
    }

    /// Truth of `lit`, `None` while its variable is unassigned.
    #[must_use]
    pub fn literal_value<L: Literal>(&self, lit: L) -> Option<bool> {
        self.var_value(lit.variable()).map(|b| b == lit.polarity())
    }

    /// True once every variable has a value.
    #[must_use]
    pub fn all_assigned(&self) -> bool {
        self.0.iter().skip(1).all(|s| s.is_assigned())
    }

    /// Snapshot of the current assignment. Unassigned variables are reported
    /// as false.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn get_solutions(&self) -> Solutions {
        Solutions::new(
            &self
                .0
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, s)| if s.is_true() { i as i32 } else { -(i as i32) })
                .collect_vec(),
        )
    }
}

/// A complete model: the set of literals that are true.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solutions {
    assignments: FxHashSet<NonZeroI32>,
}

impl Solutions {
    /// The model made true by `literals`. Zeros are ignored.
    #[must_use]
    pub fn new(literals: &[i32]) -> Self {
        Self {
            assignments: literals.iter().copied().filter_map(NonZeroI32::new).collect(),
        }
    }

    /// Whether `lit` holds in this model.
    #[must_use]
    pub fn check(&self, lit: NonZeroI32) -> bool {
        self.assignments.contains(&lit)
    }

    /// Whether variable `var` is true. Variables the model does not mention
    /// count as false.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn is_true(&self, var: Variable) -> bool {
        NonZeroI32::new(var as i32).is_some_and(|lit| self.check(lit))
    }

    /// The true literals, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &NonZeroI32> {
        self.assignments.iter()
    }

    /// Number of true literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True if the model has no literals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl Display for Solutions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sorted = self
            .assignments
            .iter()
            .map(|l| l.get())
            .sorted_by_key(|l| l.abs())
            .join(" ");
        write!(f, "{sorted}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    #[test]
    fn test_assign_and_unassign() {
        let mut a = Assignment::new(4);
        a.assign(PackedLiteral::new(2, false));
        assert_eq!(a.var_value(2), Some(false));
        assert_eq!(a.literal_value(PackedLiteral::new(2, true)), Some(false));
        assert_eq!(a.literal_value(PackedLiteral::new(2, false)), Some(true));
        a.unassign(2);
        assert_eq!(a.var_value(2), None);
    }

    #[test]
    fn test_get_solutions() {
        let mut a = Assignment::new(4);
        a.set(1, true);
        a.set(2, false);
        a.set(3, true);
        assert!(a.all_assigned());
        let s = a.get_solutions();
        assert!(s.is_true(1));
        assert!(!s.is_true(2));
        assert!(s.check(NonZeroI32::new(-2).unwrap()));
        assert_eq!(s.to_string(), "1 -2 3");
    }
}
