#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Learning a clause from a conflict.

use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::{Reason, Trail};

/// Result of analysing a falsified clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Conflict<L: Literal> {
    /// The conflict does not depend on any decision: the formula is
    /// unsatisfiable.
    #[default]
    Ground,
    /// A learnt unit, asserted after backtracking to the root.
    Unit(L),
    /// A learnt clause whose first literal is asserting after backtracking to
    /// `backtrack_level`. The literal at position `1` has the highest level
    /// among the rest, so it is a valid second watch.
    Learned {
        /// The learnt literals, asserting literal first.
        clause: Vec<L>,
        /// Level to backtrack to before asserting.
        backtrack_level: usize,
    },
}

/// First-UIP conflict analysis.
///
/// Resolves the falsified clause `cref` against the reasons of current-level
/// literals, walking the trail backwards, until a single current-level
/// literal remains. Also returns the variables that took part, for activity
/// bumping.
#[must_use]
pub fn analyse_conflict<L: Literal>(
    cnf: &Cnf<L>,
    trail: &Trail<L>,
    cref: usize,
) -> (Conflict<L>, Vec<Variable>) {
    let dl = trail.decision_level();
    if dl == 0 {
        return (Conflict::Ground, Vec::new());
    }

    let mut seen = vec![false; cnf.num_vars];
    let mut to_bump = Vec::new();
    let mut learnt: Vec<L> = vec![L::default()];
    let mut path_c = 0usize;
    let mut i = trail.len();
    let mut reason_idx = cref;
    let mut skip: Option<Variable> = None;

    loop {
        for &lit in cnf[reason_idx].iter() {
            let var = lit.variable();
            if Some(var) == skip || seen[var as usize] {
                continue;
            }
            let level = trail.level(var);
            if level == 0 {
                continue;
            }
            seen[var as usize] = true;
            to_bump.push(var);
            if level >= dl {
                path_c += 1;
            } else {
                learnt.push(lit);
            }
        }

        let uip = loop {
            i -= 1;
            let step = &trail[i];
            if seen[step.lit.variable() as usize] {
                break step.lit;
            }
        };

        seen[uip.variable() as usize] = false;
        path_c -= 1;

        if path_c == 0 {
            learnt[0] = uip.negated();
            break;
        }

        match trail.reason(uip.variable()) {
            Reason::Clause(idx) => {
                reason_idx = idx;
                skip = Some(uip.variable());
            }
            // Only the decision can lack a clause reason at the current
            // level, and it is always the last literal reached.
            Reason::Decision | Reason::Unit => {
                learnt[0] = uip.negated();
                break;
            }
        }
    }

    if learnt.len() == 1 {
        return (Conflict::Unit(learnt[0]), to_bump);
    }

    let (max_pos, backtrack_level) = learnt
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, l)| (k, trail.level(l.variable())))
        .max_by_key(|&(_, level)| level)
        .unwrap_or((1, 0));
    learnt.swap(1, max_pos);

    (
        Conflict::Learned {
            clause: learnt,
            backtrack_level,
        },
        to_bump,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Assignment;
    use crate::sat::literal::PackedLiteral;
    use crate::sat::propagation::propagate;
    use crate::sat::watch::WatchedLiterals;

    fn lit(v: i32) -> PackedLiteral {
        PackedLiteral::from_i32(v)
    }

    #[test]
    fn test_ground_conflict_at_root() {
        let cnf: Cnf = Cnf::new(vec![vec![1], vec![-1]]);
        let trail = Trail::new(cnf.num_vars);
        let (conflict, bump) = analyse_conflict(&cnf, &trail, 1);
        assert_eq!(conflict, Conflict::Ground);
        assert!(bump.is_empty());
    }

    #[test]
    fn test_learns_first_uip() {
        // Deciding 1 at level 1 and 2 at level 2 forces 3 and then both 4
        // and -4. The first UIP is 3, and the learnt clause is (-3 v -1)
        // after resolution through the level-1 decision.
        let mut cnf: Cnf = Cnf::new(vec![
            vec![-2, 3],
            vec![-3, -1, 4],
            vec![-3, -1, -4],
        ]);
        let mut watches = WatchedLiterals::new(cnf.num_vars);
        for (i, c) in cnf.iter().enumerate() {
            watches.add_clause(c, i);
        }
        let mut trail = Trail::new(cnf.num_vars);
        let mut a = Assignment::new(cnf.num_vars);
        let mut props = 0;

        trail.new_decision_level();
        trail.push(lit(1), Reason::Decision, &mut a);
        assert_eq!(propagate(&mut cnf, &mut watches, &mut trail, &mut a, &mut props), None);

        trail.new_decision_level();
        trail.push(lit(2), Reason::Decision, &mut a);
        let cref = propagate(&mut cnf, &mut watches, &mut trail, &mut a, &mut props)
            .expect("conflict expected");

        let (conflict, bump) = analyse_conflict(&cnf, &trail, cref);
        match conflict {
            Conflict::Learned {
                clause,
                backtrack_level,
            } => {
                assert_eq!(clause[0], lit(-3));
                assert_eq!(clause[1], lit(-1));
                assert_eq!(clause.len(), 2);
                assert_eq!(backtrack_level, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(bump.contains(&3));
        assert!(bump.contains(&4));
    }

    #[test]
    fn test_learns_unit() {
        let mut cnf: Cnf = Cnf::new(vec![vec![-1, 2], vec![-1, -2]]);
        let mut watches = WatchedLiterals::new(cnf.num_vars);
        for (i, c) in cnf.iter().enumerate() {
            watches.add_clause(c, i);
        }
        let mut trail = Trail::new(cnf.num_vars);
        let mut a = Assignment::new(cnf.num_vars);
        let mut props = 0;

        trail.new_decision_level();
        trail.push(lit(1), Reason::Decision, &mut a);
        let cref = propagate(&mut cnf, &mut watches, &mut trail, &mut a, &mut props)
            .expect("conflict expected");

        let (conflict, _) = analyse_conflict(&cnf, &trail, cref);
        assert_eq!(conflict, Conflict::Unit(lit(-1)));
    }
}
