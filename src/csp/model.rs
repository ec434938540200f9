//! Integer models decoded from a satisfiable check.

use crate::csp::expr::{Constraint, IntVar, LinExpr};
use num_rational::Rational64;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Integer value for every variable of a session, from a satisfiable check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<i64>,
    names: Arc<[String]>,
}

impl Model {
    pub(crate) const fn new(values: Vec<i64>, names: Arc<[String]>) -> Self {
        Self { values, names }
    }

    /// Value of `var`.
    ///
    /// # Panics
    ///
    /// If `var` was declared in a different session. Use [`Model::get`] to
    /// avoid the panic.
    #[must_use]
    pub fn evaluate(&self, var: IntVar) -> i64 {
        self.values[var.index()]
    }

    /// Value of `var`, or `None` for a variable of another session.
    #[must_use]
    pub fn get(&self, var: IntVar) -> Option<i64> {
        self.values.get(var.index()).copied()
    }

    /// Exact value of a linear expression.
    #[must_use]
    pub fn eval_expr(&self, expr: &LinExpr) -> Rational64 {
        expr.evaluate_with(|v| self.evaluate(v))
    }

    /// Whether the values of this model satisfy `constraint`.
    #[must_use]
    pub fn satisfies(&self, constraint: &Constraint) -> bool {
        constraint.holds_with(&mut |v| self.evaluate(v))
    }

    /// `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the session declared no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}
