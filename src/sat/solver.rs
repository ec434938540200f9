#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Solver interface and component configurations.

use crate::sat::assignment::Solutions;
use crate::sat::clause_management::{ClauseManagement, LbdClauseManagement, NoClauseManagement};
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, PackedLiteral, StructLiteral};
use crate::sat::phase_saving::{PhaseSelector, RandomPhases, SavedPhases};
use crate::sat::restarter::{Geometric, Luby, Never, Restarter};
use crate::sat::variable_selection::{FixedOrder, VariableSelection, Vsids};
use std::fmt::{Debug, Display, Formatter};
use std::time::Instant;

/// Bundles the pluggable pieces of the CDCL search into one type parameter.
pub trait SolverConfig: Debug + Clone {
    /// Literal representation.
    type Literal: Literal;
    /// Branching heuristic.
    type VariableSelector: VariableSelection;
    /// Restart schedule.
    type Restarter: Restarter;
    /// Polarity heuristic.
    type PhaseSelector: PhaseSelector;
    /// Learnt clause database policy.
    type ClauseManager: ClauseManagement;
}

/// VSIDS branching, Luby restarts, saved phases and LBD-based cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultConfig;

impl SolverConfig for DefaultConfig {
    type Literal = PackedLiteral;
    type VariableSelector = Vsids;
    type Restarter = Luby<100>;
    type PhaseSelector = SavedPhases;
    type ClauseManager = LbdClauseManagement<2000>;
}

/// Geometric restarts and the unpacked literal layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometricConfig;

impl SolverConfig for GeometricConfig {
    type Literal = StructLiteral;
    type VariableSelector = Vsids;
    type Restarter = Geometric<100>;
    type PhaseSelector = SavedPhases;
    type ClauseManager = LbdClauseManagement<2000>;
}

/// Plain conflict-driven search without heuristics, used as a baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaselineConfig;

impl SolverConfig for BaselineConfig {
    type Literal = PackedLiteral;
    type VariableSelector = FixedOrder;
    type Restarter = Never;
    type PhaseSelector = RandomPhases;
    type ClauseManager = NoClauseManagement;
}

/// Bounds on a single search. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveLimits {
    /// Give up after this many conflicts.
    pub max_conflicts: Option<usize>,
    /// Give up once this instant has passed.
    pub deadline: Option<Instant>,
    /// Seed for randomised heuristics.
    pub seed: u64,
}

/// Why a search ended without a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnknownReason {
    /// The conflict budget ran out.
    ConflictLimit(usize),
    /// The deadline passed.
    Timeout,
}

impl Display for UnknownReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConflictLimit(n) => write!(f, "conflict limit of {n} reached"),
            Self::Timeout => write!(f, "time limit reached"),
        }
    }
}

/// Verdict of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// Satisfiable, with a model.
    Sat(Solutions),
    /// Unsatisfiable.
    Unsat,
    /// Stopped without a verdict.
    Unknown(UnknownReason),
}

impl SatResult {
    /// True for a satisfiable verdict.
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    /// True for an unsatisfiable verdict.
    #[must_use]
    pub const fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }
}

/// Search counters reported after a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionStats {
    /// Conflicts met during search.
    pub conflicts: usize,
    /// Decisions made.
    pub decisions: usize,
    /// Literals propagated.
    pub propagations: usize,
    /// Restarts performed.
    pub restarts: usize,
    /// Clauses learnt.
    pub learnt_clauses: usize,
    /// Learnt clauses removed.
    pub removed_clauses: usize,
}

/// A SAT search over a CNF formula.
pub trait Solver<C: SolverConfig = DefaultConfig> {
    /// Prepares a search over `cnf` within `limits`.
    fn new(cnf: Cnf<C::Literal>, limits: SolveLimits) -> Self;
    /// Runs the search.
    fn solve(&mut self) -> SatResult;
    /// Counters of the search so far.
    fn stats(&self) -> SolutionStats;
}
