#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A conflict-driven clause learning SAT engine.
//!
//! Formulas arrive as a [`cnf::Cnf`] and are solved by [`cdcl::Cdcl`], whose
//! heuristics are chosen through a [`solver::SolverConfig`].
pub mod assignment;
pub mod cdcl;
pub mod clause;
pub mod clause_management;
pub mod cnf;
pub mod conflict_analysis;
pub mod literal;
pub mod phase_saving;
pub mod propagation;
pub mod restarter;
pub mod solver;
pub mod trail;
pub mod variable_selection;
pub mod watch;
