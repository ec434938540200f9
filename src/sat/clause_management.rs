#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Learnt clause database management.
//!
//! Conflict analysis adds a clause per conflict, and propagation slows down
//! as the database grows. `LbdClauseManagement` periodically deletes the
//! learnt clauses with the worst literal block distance.

use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::trail::{Reason, Trail};
use crate::sat::watch::WatchedLiterals;
use itertools::Itertools;
use std::fmt::Debug;

/// Policy for keeping the learnt clause database small.
pub trait ClauseManagement: Clone + Debug {
    /// A policy with no conflicts counted yet.
    fn new() -> Self;

    /// Called after every conflict.
    fn on_conflict(&mut self);

    /// Whether the database is due for cleaning.
    fn should_clean_db(&self) -> bool;

    /// Deletes learnt clauses judged useless and returns how many went.
    /// Clauses that are the reason for a current assignment are kept.
    fn clean_clause_db<L: Literal>(
        &mut self,
        cnf: &mut Cnf<L>,
        trail: &Trail<L>,
        watches: &mut WatchedLiterals,
    ) -> usize;

    /// Clauses removed so far.
    fn num_removed(&self) -> usize;
}

/// Every `N` conflicts, removes half of the unlocked learnt clauses, worst
/// LBD first. Binary clauses and clauses with LBD of two or less ("glue"
/// clauses) are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LbdClauseManagement<const N: usize> {
    conflicts_since_last_cleanup: usize,
    num_removed: usize,
}

impl<const N: usize> ClauseManagement for LbdClauseManagement<N> {
    fn new() -> Self {
        Self::default()
    }

    fn on_conflict(&mut self) {
        self.conflicts_since_last_cleanup += 1;
    }

    fn should_clean_db(&self) -> bool {
        self.conflicts_since_last_cleanup >= N
    }

    fn clean_clause_db<L: Literal>(
        &mut self,
        cnf: &mut Cnf<L>,
        trail: &Trail<L>,
        watches: &mut WatchedLiterals,
    ) -> usize {
        self.conflicts_since_last_cleanup = 0;

        let candidates = (cnf.non_learnt_idx..cnf.len())
            .filter(|&idx| {
                let c = &cnf[idx];
                !c.is_deleted()
                    && c.len() > 2
                    && c.lbd > 2
                    && trail.reason(c[0].variable()) != Reason::Clause(idx)
            })
            .sorted_by_key(|&idx| std::cmp::Reverse(cnf[idx].lbd))
            .collect_vec();

        let to_remove = candidates.len() / 2;
        for &idx in &candidates[..to_remove] {
            cnf[idx].delete();
        }

        if to_remove > 0 {
            watches.retain(|idx| !cnf[idx].is_deleted());
        }

        self.num_removed += to_remove;
        to_remove
    }

    fn num_removed(&self) -> usize {
        self.num_removed
    }
}

/// Keeps every learnt clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoClauseManagement;

impl ClauseManagement for NoClauseManagement {
    fn new() -> Self {
        Self
    }

    fn on_conflict(&mut self) {}

    fn should_clean_db(&self) -> bool {
        false
    }

    fn clean_clause_db<L: Literal>(
        &mut self,
        _: &mut Cnf<L>,
        _: &Trail<L>,
        _: &mut WatchedLiterals,
    ) -> usize {
        0
    }

    fn num_removed(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use crate::sat::literal::PackedLiteral;

    fn learnt(lits: &[i32], lbd: u32) -> Clause {
        Clause::learnt(lits.iter().copied().map(PackedLiteral::from_i32).collect(), lbd)
    }

    #[test]
    fn test_removes_worst_half() {
        let mut cnf: Cnf = Cnf::new(vec![vec![1, 2, 3]]);
        cnf.add_clause(learnt(&[1, 2, 4], 3));
        cnf.add_clause(learnt(&[-1, 2, 4], 6));
        cnf.add_clause(learnt(&[1, -2, 4], 5));
        cnf.add_clause(learnt(&[1, -2, -4], 4));
        cnf.add_clause(learnt(&[-1, -2, -4], 2));

        let mut watches = WatchedLiterals::new(cnf.num_vars);
        for (i, c) in cnf.iter().enumerate() {
            watches.add_clause(c, i);
        }
        let trail = Trail::new(cnf.num_vars);

        let mut mgr = LbdClauseManagement::<2>::new();
        mgr.on_conflict();
        assert!(!mgr.should_clean_db());
        mgr.on_conflict();
        assert!(mgr.should_clean_db());

        let removed = mgr.clean_clause_db(&mut cnf, &trail, &mut watches);
        assert_eq!(removed, 2);
        assert!(cnf[2].is_deleted());
        assert!(cnf[3].is_deleted());
        assert!(!cnf[1].is_deleted());
        assert!(!cnf[5].is_deleted());
        assert!(!mgr.should_clean_db());
        assert!(watches[PackedLiteral::from_i32(-1)].iter().all(|&i| i != 2));
    }

    #[test]
    fn test_no_management_keeps_everything() {
        let mut cnf: Cnf = Cnf::new(vec![vec![1, 2, 3]]);
        cnf.add_clause(learnt(&[1, 2, 4], 9));
        let mut watches = WatchedLiterals::new(cnf.num_vars);
        let trail = Trail::new(cnf.num_vars);
        let mut mgr = NoClauseManagement::new();
        assert_eq!(mgr.clean_clause_db(&mut cnf, &trail, &mut watches), 0);
        assert!(!cnf[1].is_deleted());
    }
}
