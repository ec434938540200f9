#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literal representations used by the SAT engine.
//!
//! A literal is a Boolean variable together with a polarity. The solver is
//! generic over the representation so that different memory layouts can be
//! benchmarked against each other; `PackedLiteral` is the default.

use core::ops::{Neg, Not};
use std::fmt::Debug;
use std::hash::Hash;

/// Index of a Boolean variable. Variable `0` is never used so that literals
/// map cleanly onto signed DIMACS integers.
pub type Variable = u32;

/// Common interface for literal representations.
pub trait Literal: Copy + Debug + Eq + Hash + Default + Ord {
    /// Creates a literal for `var`. `polarity == true` is the positive literal.
    fn new(var: Variable, polarity: bool) -> Self;

    /// The underlying variable.
    fn variable(self) -> Variable;

    /// `true` for a positive literal, `false` for a negated one.
    fn polarity(self) -> bool;

    /// The complementary literal.
    #[must_use]
    fn negated(self) -> Self;

    /// Dense index (`2 * var + negated`) used to address per-literal tables
    /// such as watch lists.
    fn index(self) -> usize {
        ((self.variable() as usize) << 1) | usize::from(self.is_negated())
    }

    /// True for a negative literal.
    fn is_negated(self) -> bool {
        !self.polarity()
    }

    /// True for a positive literal.
    fn is_positive(self) -> bool {
        self.polarity()
    }

    /// Converts a non-zero DIMACS literal.
    #[must_use]
    fn from_i32(value: i32) -> Self {
        let polarity = value.is_positive();
        let var = value.unsigned_abs();
        Self::new(var, polarity)
    }

    /// The DIMACS form of this literal.
    #[allow(clippy::cast_possible_wrap)]
    fn to_i32(self) -> i32 {
        let var = self.variable() as i32;
        if self.polarity() { var } else { -var }
    }
}

/// Variable and sign packed into a single `u32`: the low bit is set for
/// negated literals, so `index()` is just the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedLiteral(u32);

impl Literal for PackedLiteral {
    fn new(var: Variable, polarity: bool) -> Self {
        Self((var << 1) | u32::from(!polarity))
    }

    fn variable(self) -> Variable {
        self.0 >> 1
    }

    fn polarity(self) -> bool {
        self.0 & 1 == 0
    }

    fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl Neg for PackedLiteral {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for PackedLiteral {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

/// Unpacked literal, kept for comparing layouts in the benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StructLiteral {
    value: u32,
    polarity: bool,
}

impl Literal for StructLiteral {
    fn new(var: Variable, polarity: bool) -> Self {
        Self {
            value: var,
            polarity,
        }
    }

    fn variable(self) -> Variable {
        self.value
    }

    fn polarity(self) -> bool {
        self.polarity
    }

    fn negated(self) -> Self {
        Self {
            value: self.value,
            polarity: !self.polarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(
            PackedLiteral::new(1, false).negated(),
            PackedLiteral::new(1, true)
        );
        assert_eq!(
            PackedLiteral::new(1, true).negated(),
            PackedLiteral::new(1, false)
        );
        assert_eq!(!PackedLiteral::new(7, true), -PackedLiteral::new(7, true));
    }

    #[test]
    fn test_index_is_dense() {
        let pos = PackedLiteral::new(3, true);
        let neg = PackedLiteral::new(3, false);
        assert_eq!(pos.index(), 6);
        assert_eq!(neg.index(), 7);
        assert_eq!(StructLiteral::new(3, true).index(), 6);
        assert_eq!(StructLiteral::new(3, false).index(), 7);
    }

    #[test]
    fn test_i32_conversion() {
        for value in [1, -1, 42, -42] {
            assert_eq!(PackedLiteral::from_i32(value).to_i32(), value);
            assert_eq!(StructLiteral::from_i32(value).to_i32(), value);
        }
        assert!(PackedLiteral::from_i32(-5).is_negated());
        assert!(PackedLiteral::from_i32(5).is_positive());
    }
}
