//! Finite-domain integer constraints on top of the SAT engine.
//!
//! A [`Session`] holds bounded integer variables and the constraints asserted
//! over them. Checking compiles the problem to CNF with the order encoding,
//! runs [`crate::sat::cdcl::Cdcl`] and decodes the Boolean model back to
//! integers.

pub mod domain;
pub mod encoder;
pub mod expr;
pub mod model;
pub mod session;

pub use domain::Domain;
pub use expr::{Cmp, Constraint, IntVar, LinExpr, all_different, and, eq, ge, le, sum};
pub use model::Model;
pub use session::{CheckResult, EngineConfig, Session, SolveStats};
