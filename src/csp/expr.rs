//! Integer variables, linear expressions and constraints.
//!
//! ```text
//!   constant + coef1 * var1 + coef2 * var2 + ...
//! ```
//!
//! Coefficients are exact rationals so that prices such as `1/4` never pass
//! through floating point. Zero coefficients are removed eagerly.

use num_rational::Rational64;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

/// Handle to an integer variable declared in a [`super::Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar(pub(crate) usize);

impl IntVar {
    /// Position of the variable in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for IntVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A linear combination of integer variables with rational coefficients
/// and a rational constant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinExpr {
    constant: Rational64,
    terms: BTreeMap<IntVar, Rational64>,
}

impl LinExpr {
    /// An expression with no variables.
    #[must_use]
    pub fn constant(value: impl Into<Rational64>) -> Self {
        Self {
            constant: value.into(),
            terms: BTreeMap::new(),
        }
    }

    /// The constant.
    #[must_use]
    pub const fn constant_term(&self) -> Rational64 {
        self.constant
    }

    /// Non-zero `(variable, coefficient)` pairs in variable order.
    pub fn terms(&self) -> impl Iterator<Item = (IntVar, Rational64)> + '_ {
        self.terms.iter().map(|(&v, &c)| (v, c))
    }

    /// Coefficient of `var`, zero if it does not occur.
    #[must_use]
    pub fn coefficient(&self, var: IntVar) -> Rational64 {
        self.terms.get(&var).copied().unwrap_or_else(Rational64::zero)
    }

    /// Variables with a non-zero coefficient, in variable order.
    pub fn variables(&self) -> impl Iterator<Item = IntVar> + '_ {
        self.terms.keys().copied()
    }

    fn add_term(&mut self, var: IntVar, coef: Rational64) {
        let entry = self.terms.entry(var).or_insert_with(Rational64::zero);
        *entry += coef;
        if entry.is_zero() {
            self.terms.remove(&var);
        }
    }

    fn scale(mut self, k: Rational64) -> Self {
        if k.is_zero() {
            return Self::default();
        }
        self.constant *= k;
        for coef in self.terms.values_mut() {
            *coef *= k;
        }
        self
    }

    /// Evaluates the expression with `value` supplying each variable.
    pub fn evaluate_with(&self, mut value: impl FnMut(IntVar) -> i64) -> Rational64 {
        self.terms.iter().fold(self.constant, |acc, (&v, &c)| {
            acc + c * Rational64::from_integer(value(v))
        })
    }
}

impl From<IntVar> for LinExpr {
    fn from(var: IntVar) -> Self {
        let mut e = Self::default();
        e.add_term(var, Rational64::one());
        e
    }
}

impl From<i64> for LinExpr {
    fn from(value: i64) -> Self {
        Self::constant(value)
    }
}

impl From<i32> for LinExpr {
    fn from(value: i32) -> Self {
        Self::constant(i64::from(value))
    }
}

impl From<Rational64> for LinExpr {
    fn from(value: Rational64) -> Self {
        Self::constant(value)
    }
}

impl<T: Into<Self>> Add<T> for LinExpr {
    type Output = Self;

    fn add(mut self, rhs: T) -> Self {
        let rhs = rhs.into();
        self.constant += rhs.constant;
        for (v, c) in rhs.terms {
            self.add_term(v, c);
        }
        self
    }
}

impl<T: Into<Self>> Sub<T> for LinExpr {
    type Output = Self;

    fn sub(self, rhs: T) -> Self {
        self + -rhs.into()
    }
}

impl Neg for LinExpr {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-Rational64::one())
    }
}

impl Mul<Rational64> for LinExpr {
    type Output = Self;

    fn mul(self, k: Rational64) -> Self {
        self.scale(k)
    }
}

impl Mul<i64> for LinExpr {
    type Output = Self;

    fn mul(self, k: i64) -> Self {
        self.scale(Rational64::from_integer(k))
    }
}

impl Mul<i32> for LinExpr {
    type Output = Self;

    fn mul(self, k: i32) -> Self {
        self * i64::from(k)
    }
}

impl Mul<LinExpr> for i64 {
    type Output = LinExpr;

    fn mul(self, e: LinExpr) -> LinExpr {
        e * self
    }
}

impl Mul<LinExpr> for Rational64 {
    type Output = LinExpr;

    fn mul(self, e: LinExpr) -> LinExpr {
        e * self
    }
}

impl<T: Into<LinExpr>> Add<T> for IntVar {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for IntVar {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Neg for IntVar {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        -LinExpr::from(self)
    }
}

impl Mul<i64> for IntVar {
    type Output = LinExpr;

    fn mul(self, k: i64) -> LinExpr {
        LinExpr::from(self) * k
    }
}

impl Mul<i32> for IntVar {
    type Output = LinExpr;

    fn mul(self, k: i32) -> LinExpr {
        LinExpr::from(self) * k
    }
}

impl Mul<Rational64> for IntVar {
    type Output = LinExpr;

    fn mul(self, k: Rational64) -> LinExpr {
        LinExpr::from(self) * k
    }
}

impl Mul<IntVar> for i64 {
    type Output = LinExpr;

    fn mul(self, var: IntVar) -> LinExpr {
        var * self
    }
}

impl Mul<IntVar> for i32 {
    type Output = LinExpr;

    fn mul(self, var: IntVar) -> LinExpr {
        var * self
    }
}

impl Mul<IntVar> for Rational64 {
    type Output = LinExpr;

    fn mul(self, var: IntVar) -> LinExpr {
        var * self
    }
}

impl Sum<IntVar> for LinExpr {
    fn sum<I: Iterator<Item = IntVar>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, v| acc + v)
    }
}

impl Sum for LinExpr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, e| acc + e)
    }
}

impl Display for LinExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (v, c) in &self.terms {
            let sign = if c.is_negative() { "-" } else { "+" };
            match (first, c.is_negative()) {
                (true, false) => {}
                (true, true) => write!(f, "-")?,
                (false, _) => write!(f, " {sign} ")?,
            }
            if c.abs().is_one() {
                write!(f, "{v}")?;
            } else {
                write!(f, "{}*{v}", c.abs())?;
            }
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant.is_negative() {
            write!(f, " - {}", self.constant.abs())
        } else if self.constant.is_zero() {
            Ok(())
        } else {
            write!(f, " + {}", self.constant)
        }
    }
}

/// How a linear expression compares against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmp {
    /// `expr <= 0`
    Le,
    /// `expr >= 0`
    Ge,
    /// `expr = 0`
    Eq,
}

impl Cmp {
    /// Whether a value of the expression satisfies this comparison.
    #[must_use]
    pub fn holds(self, lhs: Rational64) -> bool {
        match self {
            Self::Le => lhs <= Rational64::zero(),
            Self::Ge => lhs >= Rational64::zero(),
            Self::Eq => lhs.is_zero(),
        }
    }
}

impl Display for Cmp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "=",
        })
    }
}

/// A constraint over the integer variables of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// `expr cmp 0`.
    Linear {
        /// Left-hand side, compared against zero.
        expr: LinExpr,
        /// The comparison.
        cmp: Cmp,
    },
    /// Every listed variable takes a different value.
    AllDifferent(Vec<IntVar>),
    /// Conjunction.
    And(Vec<Constraint>),
}

impl Constraint {
    /// Every variable the constraint mentions, possibly with repeats.
    #[must_use]
    pub fn variables(&self) -> Vec<IntVar> {
        match self {
            Self::Linear { expr, .. } => expr.variables().collect(),
            Self::AllDifferent(vars) => vars.clone(),
            Self::And(cs) => cs.iter().flat_map(Self::variables).collect(),
        }
    }

    /// Checks the constraint under `value`, exactly.
    pub fn holds_with(&self, value: &mut impl FnMut(IntVar) -> i64) -> bool {
        match self {
            Self::Linear { expr, cmp } => cmp.holds(expr.evaluate_with(&mut *value)),
            Self::AllDifferent(vars) => {
                let mut seen = std::collections::HashSet::with_capacity(vars.len());
                vars.iter().all(|&v| seen.insert(value(v)))
            }
            Self::And(cs) => cs.iter().all(|c| c.holds_with(value)),
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear { expr, cmp } => write!(f, "{expr} {cmp} 0"),
            Self::AllDifferent(vars) => {
                write!(f, "all_different(")?;
                for (i, v) in vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Self::And(cs) => {
                write!(f, "and(")?;
                for (i, c) in cs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// `lhs = rhs`
pub fn eq(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Constraint {
    Constraint::Linear {
        expr: lhs.into() - rhs.into(),
        cmp: Cmp::Eq,
    }
}

/// `lhs <= rhs`
pub fn le(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Constraint {
    Constraint::Linear {
        expr: lhs.into() - rhs.into(),
        cmp: Cmp::Le,
    }
}

/// `lhs >= rhs`
pub fn ge(lhs: impl Into<LinExpr>, rhs: impl Into<LinExpr>) -> Constraint {
    Constraint::Linear {
        expr: lhs.into() - rhs.into(),
        cmp: Cmp::Ge,
    }
}

/// Sum of variables or expressions.
pub fn sum<T: Into<LinExpr>>(items: impl IntoIterator<Item = T>) -> LinExpr {
    items.into_iter().map(Into::into).sum()
}

/// Pairwise distinct values.
pub fn all_different(vars: impl IntoIterator<Item = IntVar>) -> Constraint {
    Constraint::AllDifferent(vars.into_iter().collect())
}

/// All of `constraints` at once.
#[must_use]
pub const fn and(constraints: Vec<Constraint>) -> Constraint {
    Constraint::And(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: usize) -> IntVar {
        IntVar(i)
    }

    #[test]
    fn test_merges_and_drops_zero_terms() {
        let e = x(0) + x(1) * 3 - x(0);
        assert_eq!(e.coefficient(x(0)), Rational64::zero());
        assert_eq!(e.variables().collect::<Vec<_>>(), vec![x(1)]);
        assert_eq!(e.coefficient(x(1)), Rational64::from_integer(3));
    }

    #[test]
    fn test_rational_coefficients() {
        let quarter = Rational64::new(1, 4);
        let e: LinExpr = 15_i64 * x(0) + x(1) + quarter * x(2) - 100;
        let value = e.evaluate_with(|v| [3, 41, 56][v.index()]);
        assert_eq!(value, Rational64::zero());
    }

    #[test]
    fn test_sum_builder() {
        let e = sum([x(0), x(1), x(2)]);
        assert_eq!(e.terms().count(), 3);
        let e2: LinExpr = [x(0), x(0)].into_iter().sum();
        assert_eq!(e2.coefficient(x(0)), Rational64::from_integer(2));
    }

    #[test]
    fn test_constraint_holds() {
        let mut values = |v: IntVar| [1_i64, 2, 2][v.index()];
        assert!(le(x(0), x(1)).holds_with(&mut values));
        assert!(eq(x(1), x(2)).holds_with(&mut values));
        assert!(!ge(x(0), 2).holds_with(&mut values));
        assert!(!all_different([x(0), x(1), x(2)]).holds_with(&mut values));
        assert!(all_different([x(0), x(1)]).holds_with(&mut values));
        assert!(and(vec![le(x(0), 1), ge(x(0), 1)]).holds_with(&mut values));
    }

    #[test]
    fn test_display() {
        let e: LinExpr = 2_i64 * x(0) - x(1) + Rational64::new(1, 4);
        assert_eq!(e.to_string(), "2*x0 - x1 + 1/4");
        assert_eq!(eq(x(0), 5).to_string(), "x0 - 5 = 0");
        assert_eq!(LinExpr::default().to_string(), "0");
    }
}
