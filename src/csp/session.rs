//! Declaring, asserting and checking.

use crate::csp::domain::Domain;
use crate::csp::encoder::{OrderEncoder, OrderLayout};
use crate::csp::expr::{Constraint, IntVar};
use crate::csp::model::Model;
use crate::error::EngineError;
use crate::sat::cdcl::Cdcl;
use crate::sat::cnf::Cnf;
use crate::sat::solver::{SatResult, SolveLimits, Solver};
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Domains wider than this are refused: the order encoding is linear in the
/// domain size.
pub const MAX_DOMAIN_SIZE: usize = 1 << 20;

/// Search budget and model checking for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Stop with `Unknown` after this many conflicts.
    pub max_conflicts: Option<u64>,
    /// Stop with `Unknown` once this much wall-clock time has passed.
    pub timeout: Option<Duration>,
    /// Seed for the randomised phase selection.
    pub seed: u64,
    /// Re-check every asserted constraint against the decoded model.
    pub verify_model: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflicts: None,
            timeout: None,
            seed: 0,
            verify_model: true,
        }
    }
}

impl EngineConfig {
    /// Stops the search after `max_conflicts` conflicts.
    #[must_use]
    pub const fn with_max_conflicts(mut self, max_conflicts: Option<u64>) -> Self {
        self.max_conflicts = max_conflicts;
        self
    }

    /// Stops the search once `timeout` has elapsed, encoding included.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Seeds the phase noise of the solver.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Turns the check of decoded models on or off.
    #[must_use]
    pub const fn with_verify_model(mut self, verify_model: bool) -> Self {
        self.verify_model = verify_model;
        self
    }
}

/// Verdict of [`Session::check`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckResult {
    /// A model exists and is available from [`Session::model`].
    Satisfiable,
    /// No assignment satisfies the constraints.
    Unsatisfiable,
    /// The search budget ran out before an answer was found.
    Unknown(String),
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "sat"),
            Self::Unsatisfiable => write!(f, "unsat"),
            Self::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}

/// Size of the last compiled formula and counters of the last search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Declared integer variables.
    pub variables: usize,
    /// Asserted constraints.
    pub constraints: usize,
    /// Boolean variables of the compiled formula.
    pub bool_vars: usize,
    /// Clauses of the compiled formula.
    pub clauses: usize,
    /// Literal occurrences in the compiled formula.
    pub literals: usize,
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
    /// Learnt clauses dropped by database cleaning.
    pub removed_clauses: usize,
    /// Time spent compiling to CNF.
    pub encode_time: Duration,
    /// Time spent in the SAT search.
    pub solve_time: Duration,
}

/// A finite-domain constraint problem under construction.
///
/// Variables are declared with an inclusive domain, constraints are
/// asserted conjunctively, and [`Session::check`] compiles everything to CNF
/// and runs the SAT engine. A model is only available after a satisfiable
/// check and is discarded by any later assertion.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: EngineConfig,
    domains: Vec<Domain>,
    names: Vec<String>,
    by_name: FxHashMap<String, IntVar>,
    constraints: Vec<Constraint>,
    model: Option<Model>,
    stats: SolveStats,
}

impl Session {
    /// An empty session with the given search budget.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The search budget and model checking settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Declares an integer variable with domain `[lb, ub]`.
    ///
    /// # Errors
    ///
    /// `DuplicateVariable` if `name` is taken, `EmptyDomain` if `lb > ub`,
    /// `Overflow` if the domain is too wide to encode.
    pub fn declare_integer(
        &mut self,
        name: impl Into<String>,
        lb: i64,
        ub: i64,
    ) -> Result<IntVar, EngineError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(EngineError::DuplicateVariable(name));
        }
        let Some(domain) = Domain::new(lb, ub) else {
            return Err(EngineError::EmptyDomain { name, lb, ub });
        };
        let too_wide = ub
            .checked_sub(lb)
            .and_then(|w| usize::try_from(w).ok())
            .is_none_or(|w| w >= MAX_DOMAIN_SIZE);
        if too_wide {
            return Err(EngineError::Overflow(format!(
                "domain of `{name}` exceeds {MAX_DOMAIN_SIZE} values"
            )));
        }

        let var = IntVar(self.domains.len());
        log::trace!("declare {name} in [{lb}, {ub}] as {var}");
        self.domains.push(domain);
        self.by_name.insert(name.clone(), var);
        self.names.push(name);
        Ok(var)
    }

    /// Domain of `var`, if it belongs to this session.
    #[must_use]
    pub fn domain(&self, var: IntVar) -> Option<Domain> {
        self.domains.get(var.index()).copied()
    }

    /// Name `var` was declared with.
    #[must_use]
    pub fn name(&self, var: IntVar) -> Option<&str> {
        self.names.get(var.index()).map(String::as_str)
    }

    /// Variable declared as `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<IntVar> {
        self.by_name.get(name).copied()
    }

    /// Number of declared variables.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    /// Asserted constraints, in assertion order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Adds a constraint to the conjunction.
    ///
    /// # Errors
    ///
    /// `UnknownVariable` if the constraint mentions a variable that was not
    /// declared in this session.
    pub fn assert(&mut self, constraint: Constraint) -> Result<(), EngineError> {
        if let Some(var) = constraint
            .variables()
            .into_iter()
            .find(|v| v.index() >= self.domains.len())
        {
            return Err(EngineError::UnknownVariable(var.index()));
        }
        self.model = None;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Asserts each constraint in turn.
    ///
    /// # Errors
    ///
    /// The first error from [`Session::assert`].
    pub fn assert_all(
        &mut self,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<(), EngineError> {
        constraints.into_iter().try_for_each(|c| self.assert(c))
    }

    fn compile(&self) -> Result<(Cnf, OrderLayout), EngineError> {
        let mut encoder = OrderEncoder::new(&self.domains)?;
        for constraint in &self.constraints {
            encoder.encode(constraint)?;
        }
        Ok(encoder.finish())
    }

    /// The CNF the current variables and constraints compile to.
    ///
    /// # Errors
    ///
    /// `Overflow` if a constraint cannot be encoded.
    pub fn cnf(&self) -> Result<Cnf, EngineError> {
        self.compile().map(|(cnf, _)| cnf)
    }

    /// Decides the conjunction of all asserted constraints.
    ///
    /// # Errors
    ///
    /// `Overflow` if encoding fails, `ModelViolation` if model verification
    /// is enabled and the decoded model breaks an asserted constraint.
    pub fn check(&mut self) -> Result<CheckResult, EngineError> {
        self.model = None;
        let start = Instant::now();

        let (cnf, layout) = self.compile()?;
        let encoded = Instant::now();

        self.stats = SolveStats {
            variables: self.domains.len(),
            constraints: self.constraints.len(),
            bool_vars: cnf.num_vars.saturating_sub(1),
            clauses: cnf.len(),
            literals: cnf.num_literals(),
            encode_time: encoded - start,
            ..SolveStats::default()
        };
        log::debug!(
            "encoded {} integer variables and {} constraints into {} Boolean variables, {} clauses",
            self.stats.variables,
            self.stats.constraints,
            self.stats.bool_vars,
            self.stats.clauses,
        );

        let limits = SolveLimits {
            max_conflicts: self
                .config
                .max_conflicts
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
            deadline: self.config.timeout.and_then(|t| start.checked_add(t)),
            seed: self.config.seed,
        };
        let mut solver: Cdcl = Cdcl::new(cnf, limits);
        let result = solver.solve();

        let search = solver.stats();
        self.stats.conflicts = search.conflicts;
        self.stats.decisions = search.decisions;
        self.stats.propagations = search.propagations;
        self.stats.restarts = search.restarts;
        self.stats.learnt_clauses = search.learnt_clauses;
        self.stats.removed_clauses = search.removed_clauses;
        self.stats.solve_time = encoded.elapsed();

        let outcome = match result {
            SatResult::Sat(solutions) => {
                let model = Model::new(layout.decode(&solutions), Arc::from(self.names.as_slice()));
                if self.config.verify_model {
                    verify(&model, &self.constraints)?;
                }
                self.model = Some(model);
                CheckResult::Satisfiable
            }
            SatResult::Unsat => CheckResult::Unsatisfiable,
            SatResult::Unknown(reason) => {
                log::warn!("search stopped before a verdict: {reason}");
                CheckResult::Unknown(reason.to_string())
            }
        };

        log::debug!(
            "check: {outcome} after {} conflicts in {:?}",
            self.stats.conflicts,
            self.stats.solve_time
        );
        Ok(outcome)
    }

    /// The model of the last check.
    ///
    /// # Errors
    ///
    /// `NoModel` unless the last check was satisfiable and nothing has been
    /// asserted since.
    pub fn model(&self) -> Result<&Model, EngineError> {
        self.model.as_ref().ok_or(EngineError::NoModel)
    }

    /// Statistics of the last check.
    #[must_use]
    pub const fn stats(&self) -> &SolveStats {
        &self.stats
    }
}

fn verify(model: &Model, constraints: &[Constraint]) -> Result<(), EngineError> {
    match constraints.iter().position(|c| !model.satisfies(c)) {
        Some(index) => Err(EngineError::ModelViolation {
            index,
            constraint: constraints[index].to_string(),
        }),
        None => Ok(()),
    }
}
