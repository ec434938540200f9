#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation over two watched literals.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::trail::{Reason, Trail};
use crate::sat::watch::WatchedLiterals;

/// Propagates every literal on the trail past the propagation head.
///
/// Returns the index of a falsified clause on conflict. Each clause keeps its
/// watched literals at positions `0` and `1`; when a watch becomes false the
/// clause either finds a replacement, becomes unit, or is in conflict.
pub fn propagate<L: Literal>(
    cnf: &mut Cnf<L>,
    watches: &mut WatchedLiterals,
    trail: &mut Trail<L>,
    assignment: &mut Assignment,
    propagations: &mut usize,
) -> Option<usize> {
    while trail.curr_idx < trail.len() {
        let p = trail[trail.curr_idx].lit;
        trail.curr_idx += 1;
        *propagations += 1;

        let false_lit = p.negated();
        let mut list = watches.take(false_lit);
        let mut conflict = None;
        let mut i = 0;
        let mut j = 0;

        while i < list.len() {
            let idx = list[i];
            i += 1;

            let clause = &mut cnf[idx];
            if clause.is_deleted() {
                continue;
            }

            if clause[0] == false_lit {
                clause.swap(0, 1);
            }

            let first = clause[0];
            if assignment.literal_value(first) == Some(true) {
                list[j] = idx;
                j += 1;
                continue;
            }

            let replacement = (2..clause.len())
                .find(|&k| assignment.literal_value(clause[k]) != Some(false));

            if let Some(k) = replacement {
                clause.swap(1, k);
                let new_watch = clause[1];
                watches[new_watch].push(idx);
                continue;
            }

            list[j] = idx;
            j += 1;

            match assignment.literal_value(first) {
                Some(false) => {
                    conflict = Some(idx);
                    while i < list.len() {
                        list[j] = list[i];
                        j += 1;
                        i += 1;
                    }
                }
                None => trail.push(first, Reason::Clause(idx), assignment),
                Some(true) => unreachable!("satisfied clauses are skipped above"),
            }
        }

        list.truncate(j);
        let slot = &mut watches[false_lit];
        list.extend(slot.drain(..));
        *slot = list;

        if conflict.is_some() {
            trail.curr_idx = trail.len();
            return conflict;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::PackedLiteral;

    fn setup(clauses: Vec<Vec<i32>>) -> (Cnf, WatchedLiterals, Trail<PackedLiteral>, Assignment) {
        let cnf: Cnf = Cnf::new(clauses);
        let mut watches = WatchedLiterals::new(cnf.num_vars);
        for (i, c) in cnf.iter().enumerate() {
            watches.add_clause(c, i);
        }
        let trail = Trail::new(cnf.num_vars);
        let assignment = Assignment::new(cnf.num_vars);
        (cnf, watches, trail, assignment)
    }

    #[test]
    fn test_chain_of_implications() {
        let (mut cnf, mut watches, mut trail, mut a) =
            setup(vec![vec![-1, 2], vec![-2, 3], vec![-3, -1, 4]]);
        let mut props = 0;

        trail.push(PackedLiteral::from_i32(1), Reason::Decision, &mut a);
        let conflict = propagate(&mut cnf, &mut watches, &mut trail, &mut a, &mut props);

        assert_eq!(conflict, None);
        assert_eq!(a.var_value(2), Some(true));
        assert_eq!(a.var_value(3), Some(true));
        assert_eq!(a.var_value(4), Some(true));
        assert_eq!(trail.reason(4), Reason::Clause(2));
    }

    #[test]
    fn test_conflict_detected() {
        let (mut cnf, mut watches, mut trail, mut a) =
            setup(vec![vec![-1, 2], vec![-1, -2]]);
        let mut props = 0;

        trail.push(PackedLiteral::from_i32(1), Reason::Decision, &mut a);
        let conflict = propagate(&mut cnf, &mut watches, &mut trail, &mut a, &mut props);

        assert!(conflict.is_some());
    }

    #[test]
    fn test_watch_moves_to_unassigned_literal() {
        let (mut cnf, mut watches, mut trail, mut a) = setup(vec![vec![1, 2, 3]]);
        let mut props = 0;

        trail.push(PackedLiteral::from_i32(-1), Reason::Decision, &mut a);
        let conflict = propagate(&mut cnf, &mut watches, &mut trail, &mut a, &mut props);

        assert_eq!(conflict, None);
        assert_eq!(a.var_value(2), None);
        assert_eq!(a.var_value(3), None);
        assert!(watches[PackedLiteral::from_i32(1)].is_empty());
        assert_eq!(watches[PackedLiteral::from_i32(3)].as_slice(), &[0]);
    }
}
