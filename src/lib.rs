#![warn(missing_docs)]
//! Combinatorial puzzles expressed as finite-domain integer constraints and
//! decided by a CDCL SAT solver.
//!
//! ```
//! use sat_puzzles::csp::{Session, eq, ge};
//! use sat_puzzles::csp::CheckResult;
//!
//! let mut session = Session::default();
//! let x = session.declare_integer("x", 0, 10)?;
//! let y = session.declare_integer("y", 0, 10)?;
//! session.assert(eq(x + y, 12))?;
//! session.assert(ge(x - y, 4))?;
//! assert_eq!(session.check()?, CheckResult::Satisfiable);
//! let model = session.model()?;
//! assert!(model.evaluate(x) >= 8);
//! # Ok::<(), sat_puzzles::error::EngineError>(())
//! ```

/// The `sat` module implements the CDCL SAT solver the integer engine compiles to.
pub mod sat;

/// Integer variables, linear and all-different constraints, and the session
/// that compiles them to CNF.
pub mod csp;

/// Error types shared by the engine and the encoders.
pub mod error;

/// Row-major grids of variables and values.
pub mod grid;

/// Reading puzzle answers out of a session's model.
pub mod extract;

/// The `sudoku` module fills an n x n grid under the Sudoku rules.
pub mod sudoku;

/// The `queens` module places n non-attacking queens.
pub mod queens;

/// The `resources` module solves exact-budget allocation puzzles.
pub mod resources;
