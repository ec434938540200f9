#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict-driven clause learning search.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::clause_management::ClauseManagement;
use crate::sat::cnf::Cnf;
use crate::sat::conflict_analysis::{Conflict, analyse_conflict};
use crate::sat::literal::Literal;
use crate::sat::phase_saving::PhaseSelector;
use crate::sat::propagation::propagate;
use crate::sat::restarter::Restarter;
use crate::sat::solver::{
    DefaultConfig, SatResult, SolutionStats, SolveLimits, Solver, SolverConfig, UnknownReason,
};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::VariableSelection;
use crate::sat::watch::WatchedLiterals;
use std::time::Instant;

/// How many decisions pass between clock reads when a deadline is set.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// The CDCL search state, with heuristics chosen by `C`.
#[derive(Debug, Clone)]
pub struct Cdcl<C: SolverConfig = DefaultConfig> {
    cnf: Cnf<C::Literal>,
    assignment: Assignment,
    trail: Trail<C::Literal>,
    watches: WatchedLiterals,
    selector: C::VariableSelector,
    phases: C::PhaseSelector,
    restarter: C::Restarter,
    manager: C::ClauseManager,
    limits: SolveLimits,
    stats: SolutionStats,
    /// Cleared when the formula is found unsatisfiable before search starts.
    ok: bool,
}

impl<C: SolverConfig> Cdcl<C> {
    /// Undoes assignments above `level`, saving phases and returning the
    /// variables to the branching heuristic.
    fn backtrack(&mut self, level: usize) {
        let Self {
            trail,
            assignment,
            selector,
            phases,
            ..
        } = self;
        trail.backstep_to(level, |lit| {
            assignment.unassign(lit.variable());
            phases.save(lit);
            selector.on_unassign(lit.variable());
        });
    }

    fn deadline_passed(&self) -> bool {
        self.limits
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn conflict_limit_reached(&self) -> bool {
        self.limits
            .max_conflicts
            .is_some_and(|max| self.stats.conflicts >= max)
    }

    fn learn(&mut self, clause: Vec<C::Literal>, backtrack_level: usize) {
        let mut learnt = Clause::learnt(clause, 0);
        learnt.lbd = learnt.calculate_lbd(&self.trail);
        self.backtrack(backtrack_level);

        let idx = self.cnf.len();
        let asserting = learnt[0];
        self.watches.add_clause(&learnt, idx);
        self.cnf.add_clause(learnt);
        self.trail
            .push(asserting, Reason::Clause(idx), &mut self.assignment);
        self.stats.learnt_clauses += 1;
    }

    /// Handles one conflict. Returns `false` if the formula is refuted.
    fn resolve_conflict(&mut self, cref: usize) -> bool {
        self.stats.conflicts += 1;
        if self.trail.decision_level() == 0 {
            return false;
        }

        let (conflict, to_bump) = analyse_conflict(&self.cnf, &self.trail, cref);
        self.selector.bumps(to_bump);
        self.selector.decay();
        self.phases.on_conflict();
        self.manager.on_conflict();

        match conflict {
            Conflict::Ground => return false,
            Conflict::Unit(lit) => {
                self.backtrack(0);
                self.trail.push(lit, Reason::Unit, &mut self.assignment);
            }
            Conflict::Learned {
                clause,
                backtrack_level,
            } => self.learn(clause, backtrack_level),
        }

        if self.restarter.should_restart() {
            self.backtrack(0);
            self.stats.restarts += 1;
            log::trace!("restart #{} at conflict {}", self.stats.restarts, self.stats.conflicts);
        }

        if self.manager.should_clean_db() {
            let removed = self
                .manager
                .clean_clause_db(&mut self.cnf, &self.trail, &mut self.watches);
            self.stats.removed_clauses += removed;
            log::trace!("removed {removed} learnt clauses");
        }

        true
    }
}

impl<C: SolverConfig> Solver<C> for Cdcl<C> {
    fn new(mut cnf: Cnf<C::Literal>, limits: SolveLimits) -> Self {
        let num_vars = cnf.num_vars;
        let mut assignment = Assignment::new(num_vars);
        let mut trail = Trail::new(num_vars);
        let mut watches = WatchedLiterals::new(num_vars);
        let mut ok = true;

        for idx in 0..cnf.len() {
            let clause = &mut cnf[idx];
            clause.normalise();

            if clause.is_empty() {
                ok = false;
            } else if clause.is_tautology() {
                clause.delete();
            } else if clause.is_unit() {
                let lit = clause[0];
                match assignment.literal_value(lit) {
                    Some(false) => ok = false,
                    Some(true) => {}
                    None => trail.push(lit, Reason::Unit, &mut assignment),
                }
            } else {
                watches.add_clause(clause, idx);
            }
        }

        Self {
            cnf,
            assignment,
            trail,
            watches,
            selector: C::VariableSelector::new(num_vars),
            phases: C::PhaseSelector::new(num_vars, limits.seed),
            restarter: C::Restarter::new(),
            manager: C::ClauseManager::new(),
            limits,
            stats: SolutionStats::default(),
            ok,
        }
    }

    fn solve(&mut self) -> SatResult {
        if !self.ok {
            return SatResult::Unsat;
        }

        loop {
            let conflict = propagate(
                &mut self.cnf,
                &mut self.watches,
                &mut self.trail,
                &mut self.assignment,
                &mut self.stats.propagations,
            );

            if let Some(cref) = conflict {
                if !self.resolve_conflict(cref) {
                    self.ok = false;
                    return SatResult::Unsat;
                }
                if self.conflict_limit_reached() {
                    return SatResult::Unknown(UnknownReason::ConflictLimit(self.stats.conflicts));
                }
                if self.deadline_passed() {
                    return SatResult::Unknown(UnknownReason::Timeout);
                }
                continue;
            }

            let Some(var) = self.selector.pick(&self.assignment) else {
                return SatResult::Sat(self.assignment.get_solutions());
            };

            self.stats.decisions += 1;
            if self.stats.decisions % DEADLINE_CHECK_INTERVAL == 0 && self.deadline_passed() {
                return SatResult::Unknown(UnknownReason::Timeout);
            }

            let polarity = self.phases.get_next(var);
            self.trail.new_decision_level();
            self.trail.push(
                C::Literal::new(var, polarity),
                Reason::Decision,
                &mut self.assignment,
            );
        }
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            restarts: self.restarter.num_restarts(),
            removed_clauses: self.manager.num_removed(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::solver::{BaselineConfig, GeometricConfig};
    use itertools::Itertools;

    fn solve_with<C: SolverConfig>(clauses: Vec<Vec<i32>>) -> SatResult {
        let cnf: Cnf<C::Literal> = Cnf::new(clauses);
        let mut solver: Cdcl<C> = Cdcl::new(cnf, SolveLimits::default());
        solver.solve()
    }

    fn solve(clauses: Vec<Vec<i32>>) -> SatResult {
        solve_with::<DefaultConfig>(clauses)
    }

    /// `pigeons` pigeons into `holes` holes, one per hole.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn pigeonhole(pigeons: usize, holes: usize) -> Vec<Vec<i32>> {
        let var = |p: usize, h: usize| (p * holes + h + 1) as i32;
        let mut clauses = (0..pigeons)
            .map(|p| (0..holes).map(|h| var(p, h)).collect_vec())
            .collect_vec();
        for h in 0..holes {
            for (p, q) in (0..pigeons).tuple_combinations() {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
        clauses
    }

    fn check_model(clauses: &[Vec<i32>], result: &SatResult) {
        let SatResult::Sat(solutions) = result else {
            panic!("expected a model, got {result:?}");
        };
        let cnf: Cnf = Cnf::new(clauses.to_vec());
        assert!(cnf.verify(solutions));
    }

    #[test]
    fn test_units_only() {
        let clauses = vec![vec![1], vec![-2], vec![3]];
        let result = solve(clauses.clone());
        check_model(&clauses, &result);
    }

    #[test]
    fn test_empty_formula_is_sat() {
        assert!(solve(Vec::new()).is_sat());
    }

    #[test]
    fn test_contradicting_units() {
        assert_eq!(solve(vec![vec![1], vec![-1]]), SatResult::Unsat);
    }

    #[test]
    fn test_empty_clause() {
        assert_eq!(solve(vec![vec![1, 2], vec![]]), SatResult::Unsat);
    }

    #[test]
    fn test_tautology_ignored() {
        let clauses = vec![vec![1, -1], vec![2]];
        let result = solve(clauses);
        assert!(result.is_sat());
    }

    #[test]
    fn test_small_sat() {
        let clauses = vec![
            vec![1, 2, 3],
            vec![-1, -2],
            vec![-1, -3],
            vec![-2, -3],
            vec![2, 3],
            vec![-3, 4],
        ];
        let result = solve(clauses.clone());
        check_model(&clauses, &result);
    }

    #[test]
    fn test_pigeonhole_sat() {
        let clauses = pigeonhole(4, 4);
        let result = solve(clauses.clone());
        check_model(&clauses, &result);
    }

    #[test]
    fn test_pigeonhole_unsat() {
        assert_eq!(solve(pigeonhole(5, 4)), SatResult::Unsat);
        assert_eq!(solve_with::<BaselineConfig>(pigeonhole(4, 3)), SatResult::Unsat);
        assert_eq!(solve_with::<GeometricConfig>(pigeonhole(5, 4)), SatResult::Unsat);
    }

    #[test]
    fn test_conflict_limit_gives_unknown() {
        let cnf: Cnf = Cnf::new(pigeonhole(7, 6));
        let limits = SolveLimits {
            max_conflicts: Some(1),
            ..SolveLimits::default()
        };
        let mut solver: Cdcl = Cdcl::new(cnf, limits);
        assert_eq!(
            solver.solve(),
            SatResult::Unknown(UnknownReason::ConflictLimit(1))
        );
        assert_eq!(solver.stats().conflicts, 1);
    }

    #[test]
    fn test_expired_deadline_gives_unknown() {
        let cnf: Cnf = Cnf::new(pigeonhole(7, 6));
        let limits = SolveLimits {
            deadline: Some(Instant::now()),
            ..SolveLimits::default()
        };
        let mut solver: Cdcl = Cdcl::new(cnf, limits);
        assert_eq!(solver.solve(), SatResult::Unknown(UnknownReason::Timeout));
    }

    #[test]
    fn test_stats_recorded() {
        let cnf: Cnf = Cnf::new(pigeonhole(5, 4));
        let mut solver: Cdcl = Cdcl::new(cnf, SolveLimits::default());
        assert!(solver.solve().is_unsat());
        let stats = solver.stats();
        assert!(stats.conflicts > 0);
        assert!(stats.decisions > 0);
        assert!(stats.propagations > 0);
    }
}
