//! Turning a session's model into puzzle-native answers.
//!
//! Every reader goes through [`Session::model`], so reading after an
//! unsatisfiable or unknown check fails with `EngineError::NoModel` instead
//! of producing placeholder values.

use crate::csp::{CheckResult, IntVar, Model, Session};
use crate::error::{EngineError, PuzzleError};
use crate::grid::Grid;
use std::fmt::{Display, Formatter};

/// Result of solving a well-formed puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A solution.
    Solved(T),
    /// The constraints admit no solution.
    Infeasible,
    /// The engine gave up before deciding; this is not a proof of
    /// infeasibility.
    Indeterminate(String),
}

impl<T> Outcome<T> {
    /// True for [`Outcome::Solved`].
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    /// True for [`Outcome::Infeasible`].
    #[must_use]
    pub const fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }

    /// The solution, if there is one.
    pub fn solved(self) -> Option<T> {
        match self {
            Self::Solved(t) => Some(t),
            _ => None,
        }
    }

    /// Maps the solution, keeping the other outcomes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Solved(t) => Outcome::Solved(f(t)),
            Self::Infeasible => Outcome::Infeasible,
            Self::Indeterminate(reason) => Outcome::Indeterminate(reason),
        }
    }
}

impl<T: Display> Display for Outcome<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Solved(t) => write!(f, "{t}"),
            Self::Infeasible => write!(f, "no solution exists"),
            Self::Indeterminate(reason) => write!(f, "undecided: {reason}"),
        }
    }
}

/// Runs the check and, if satisfiable, reads the answer with `read`.
///
/// # Errors
///
/// Engine failures during the check, and whatever `read` returns.
pub fn conclude<T>(
    session: &mut Session,
    read: impl FnOnce(&Session) -> Result<T, PuzzleError>,
) -> Result<Outcome<T>, PuzzleError> {
    Ok(match session.check()? {
        CheckResult::Satisfiable => Outcome::Solved(read(session)?),
        CheckResult::Unsatisfiable => Outcome::Infeasible,
        CheckResult::Unknown(reason) => Outcome::Indeterminate(reason),
    })
}

fn value(model: &Model, var: IntVar) -> Result<i64, EngineError> {
    model
        .get(var)
        .ok_or(EngineError::UnknownVariable(var.index()))
}

/// Values of a grid of variables, cell for cell.
///
/// # Errors
///
/// `NoModel` if the last check was not satisfiable.
pub fn extract_grid(session: &Session, vars: &Grid<IntVar>) -> Result<Grid<i64>, PuzzleError> {
    let model = session.model()?;
    Ok(Grid::try_from_fn(vars.rows(), vars.cols(), |r, c| {
        value(model, vars[(r, c)])
    })?)
}

/// Values of named variables, in the given order.
///
/// # Errors
///
/// `NoModel` if the last check was not satisfiable.
pub fn extract_named<S: AsRef<str>>(
    session: &Session,
    vars: &[(S, IntVar)],
) -> Result<Vec<(String, i64)>, PuzzleError> {
    let model = session.model()?;
    vars.iter()
        .map(|(name, var)| Ok((name.as_ref().to_string(), value(model, *var)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::{eq, le};
    use crate::grid::declare_grid;

    #[test]
    fn test_extract_requires_model() {
        let mut session = Session::default();
        let grid = declare_grid(&mut session, "g", 2, 2, 0, 1).unwrap();
        assert_eq!(
            extract_grid(&session, &grid),
            Err(PuzzleError::Engine(EngineError::NoModel))
        );
    }

    #[test]
    fn test_extract_after_unsat_fails() {
        let mut session = Session::default();
        let x = session.declare_integer("x", 0, 1).unwrap();
        session.assert(le(x, -1)).unwrap();
        let outcome = conclude(&mut session, |s| extract_named(s, &[("x", x)])).unwrap();
        assert_eq!(outcome, Outcome::Infeasible);
        assert!(extract_named(&session, &[("x", x)]).is_err());
    }

    #[test]
    fn test_extract_grid_and_named() {
        let mut session = Session::default();
        let grid = declare_grid(&mut session, "g", 1, 2, 0, 5).unwrap();
        session.assert(eq(grid[(0, 0)], 4)).unwrap();
        session.assert(eq(grid[(0, 1)], 2)).unwrap();

        let outcome = conclude(&mut session, |s| extract_grid(s, &grid)).unwrap();
        let values = outcome.solved().unwrap();
        assert_eq!(values.to_string(), "4 2\n");

        let named = extract_named(&session, &[("a", grid[(0, 1)])]).unwrap();
        assert_eq!(named, vec![("a".to_string(), 2)]);
    }

    #[test]
    fn test_outcome_map() {
        let o: Outcome<i32> = Outcome::Indeterminate("budget".to_string());
        assert_eq!(o.map(|v| v + 1), Outcome::Indeterminate("budget".to_string()));
        assert_eq!(Outcome::Solved(1).map(|v| v * 2), Outcome::Solved(2));
    }
}
