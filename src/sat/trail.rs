#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The trail of assigned literals, with levels and reasons.

use crate::sat::assignment::Assignment;
use crate::sat::literal::{Literal, Variable};
use std::ops::Index;

/// Why a literal is on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Chosen by the branching heuristic.
    #[default]
    Decision,
    /// Fixed at the root by a unit clause or a learnt unit.
    Unit,
    /// Implied by the clause at this index.
    Clause(usize),
}

/// One assigned literal on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step<L: Literal> {
    /// The assigned literal.
    pub lit: L,
    /// Decision level the literal was assigned at.
    pub decision_level: usize,
    /// Why the literal was assigned.
    pub reason: Reason,
}

/// Assignment stack. Every assigned literal sits on the trail together with
/// its decision level and the reason it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail<L: Literal> {
    t: Vec<Step<L>>,
    /// Propagation head: literals before this position have been propagated.
    pub curr_idx: usize,
    lit_to_level: Vec<usize>,
    reasons: Vec<Reason>,
    level_starts: Vec<usize>,
}

impl<L: Literal> Index<usize> for Trail<L> {
    type Output = Step<L>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl<L: Literal> Trail<L> {
    /// An empty trail for `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
            curr_idx: 0,
            lit_to_level: vec![0; num_vars.max(1)],
            reasons: vec![Reason::Decision; num_vars.max(1)],
            level_starts: Vec::new(),
        }
    }

    /// Current decision level.
    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.level_starts.len()
    }

    /// Opens a level for the next decision.
    pub fn new_decision_level(&mut self) {
        self.level_starts.push(self.t.len());
    }

    /// Number of assigned literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// True if nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Steps in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = &Step<L>> {
        self.t.iter()
    }

    /// Decision level `var` was assigned at.
    #[must_use]
    pub fn level(&self, var: Variable) -> usize {
        self.lit_to_level[var as usize]
    }

    /// Why `var` is assigned.
    #[must_use]
    pub fn reason(&self, var: Variable) -> Reason {
        self.reasons[var as usize]
    }

    /// Assigns `lit` at the current decision level and records why.
    pub fn push(&mut self, lit: L, reason: Reason, assignment: &mut Assignment) {
        let level = self.decision_level();
        assignment.assign(lit);
        self.lit_to_level[lit.variable() as usize] = level;
        self.reasons[lit.variable() as usize] = reason;
        self.t.push(Step {
            lit,
            decision_level: level,
            reason,
        });
    }

    /// Undoes every assignment above `level`, handing each removed literal to
    /// `on_unassign` in reverse trail order.
    pub fn backstep_to(&mut self, level: usize, mut on_unassign: impl FnMut(L)) {
        if level >= self.decision_level() {
            return;
        }

        let truncate_at = self.level_starts[level];
        for step in self.t.drain(truncate_at..).rev() {
            self.lit_to_level[step.lit.variable() as usize] = 0;
            self.reasons[step.lit.variable() as usize] = Reason::Decision;
            on_unassign(step.lit);
        }

        self.level_starts.truncate(level);
        self.curr_idx = self.curr_idx.min(truncate_at);
    }
}
