#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Branching heuristics.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Variable;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Chooses the next decision variable.
pub trait VariableSelection {
    /// A heuristic over `num_vars` variables.
    fn new(num_vars: usize) -> Self;

    /// Next unassigned variable to branch on, or `None` when every variable
    /// is assigned.
    fn pick(&mut self, assignment: &Assignment) -> Option<Variable>;

    /// Raises the priority of variables seen in a conflict.
    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T);

    /// Called once per conflict.
    fn decay(&mut self);

    /// Called for each variable removed from the trail on backtrack.
    fn on_unassign(&mut self, var: Variable);
}

const DEFAULT_DECAY: f64 = 0.95;
const RESCALE_LIMIT: f64 = 1e100;

/// Variable State Independent Decaying Sum.
///
/// Rather than decaying every activity on each conflict, the bump increment
/// grows by `1 / decay`. Stale heap entries are tolerated and skipped on pop.
#[derive(Debug, Clone, Default)]
pub struct Vsids {
    activity: Vec<f64>,
    increment: f64,
    heap: BinaryHeap<(OrderedFloat<f64>, Reverse<Variable>)>,
}

impl Vsids {
    /// Current activity of `var`.
    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activity[var as usize]
    }

    fn bump(&mut self, var: Variable) {
        let a = &mut self.activity[var as usize];
        *a += self.increment;
        let a = *a;
        if a > RESCALE_LIMIT {
            self.rescale();
        } else {
            self.heap.push((OrderedFloat(a), Reverse(var)));
        }
    }

    fn rescale(&mut self) {
        for a in &mut self.activity {
            *a *= 1.0 / RESCALE_LIMIT;
        }
        self.increment *= 1.0 / RESCALE_LIMIT;
        self.rebuild();
    }

    #[allow(clippy::cast_possible_truncation)]
    fn rebuild(&mut self) {
        self.heap = self
            .activity
            .iter()
            .enumerate()
            .skip(1)
            .map(|(v, &a)| (OrderedFloat(a), Reverse(v as Variable)))
            .collect();
    }
}

impl VariableSelection for Vsids {
    fn new(num_vars: usize) -> Self {
        let mut vsids = Self {
            activity: vec![0.0; num_vars.max(1)],
            increment: 1.0,
            heap: BinaryHeap::with_capacity(num_vars),
        };
        vsids.rebuild();
        vsids
    }

    fn pick(&mut self, assignment: &Assignment) -> Option<Variable> {
        while let Some((activity, Reverse(var))) = self.heap.pop() {
            if assignment.is_assigned(var) || activity.0 != self.activity[var as usize] {
                continue;
            }
            return Some(var);
        }
        None
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        for var in vars {
            self.bump(var);
        }
    }

    fn decay(&mut self) {
        self.increment /= DEFAULT_DECAY;
        if self.heap.len() > 4 * self.activity.len() {
            self.rebuild();
        }
    }

    fn on_unassign(&mut self, var: Variable) {
        self.heap
            .push((OrderedFloat(self.activity[var as usize]), Reverse(var)));
    }
}

/// Branches on the lowest-numbered unassigned variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixedOrder(usize);

impl VariableSelection for FixedOrder {
    fn new(num_vars: usize) -> Self {
        Self(num_vars)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn pick(&mut self, assignment: &Assignment) -> Option<Variable> {
        (1..self.0)
            .map(|v| v as Variable)
            .find(|&v| !assignment.is_assigned(v))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self) {}

    fn on_unassign(&mut self, _: Variable) {}
}
