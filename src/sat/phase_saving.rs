#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Polarity selection for decisions.

use crate::sat::literal::{Literal, Variable};
use bit_vec::BitVec;

/// Chooses the polarity of each decision.
pub trait PhaseSelector {
    /// Selector for `n` variables, seeded with `seed`.
    fn new(n: usize, seed: u64) -> Self;
    /// Records the polarity `lit` was assigned with.
    fn save(&mut self, lit: impl Literal);
    /// Polarity for the next decision on `var`.
    fn get_next(&mut self, var: Variable) -> bool;
    /// Called once per conflict.
    fn on_conflict(&mut self) {}
}

/// Reuses the last polarity each variable had, flipped now and then by a
/// seeded coin so that runs are reproducible.
#[derive(Clone, Debug)]
pub struct SavedPhases {
    phases: BitVec,
    rng: fastrand::Rng,
    noise: f64,
    conflicts: usize,
}

impl PhaseSelector for SavedPhases {
    fn new(n: usize, seed: u64) -> Self {
        Self {
            // Negative first: the order encoding prefers small values.
            phases: BitVec::from_elem(n.max(1), false),
            rng: fastrand::Rng::with_seed(seed),
            noise: 0.02,
            conflicts: 0,
        }
    }

    fn save(&mut self, lit: impl Literal) {
        self.phases.set(lit.variable() as usize, lit.polarity());
    }

    fn get_next(&mut self, var: Variable) -> bool {
        let phase = self.phases.get(var as usize).unwrap_or(false);
        phase ^ (self.rng.f64() < self.noise)
    }

    fn on_conflict(&mut self) {
        self.conflicts = self.conflicts.wrapping_add(1);
        if self.conflicts % 100 == 0 {
            self.noise *= 0.95;
        }
    }
}

/// Seeded coin flip for every decision.
#[derive(Clone, Debug)]
pub struct RandomPhases(fastrand::Rng);

impl PhaseSelector for RandomPhases {
    fn new(_: usize, seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }

    fn save(&mut self, _: impl Literal) {}

    fn get_next(&mut self, _: Variable) -> bool {
        self.0.bool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    #[test]
    fn test_saved_phase_is_mostly_reused() {
        let mut phases = SavedPhases::new(4, 7);
        phases.save(PackedLiteral::new(2, true));
        let hits = (0..1000).filter(|_| phases.get_next(2)).count();
        assert!(hits > 900);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = RandomPhases::new(4, 42);
        let mut b = RandomPhases::new(4, 42);
        for _ in 0..32 {
            assert_eq!(a.get_next(1), b.get_next(1));
        }
    }
}
