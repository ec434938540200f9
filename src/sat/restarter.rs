#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Restart strategies.
//!
//! A restart abandons the current partial assignment and resumes search from
//! the root, keeping learnt clauses and variable activities. The strategies
//! here only decide *when*: the solver asks after every conflict.
//!
//! - `Luby`: intervals follow the Luby sequence scaled by `N` conflicts.
//! - `Geometric`: intervals start at `N` conflicts and grow by half each time.
//! - `Never`: disables restarts.

use std::fmt::Debug;

/// Interface shared by the restart strategies.
pub trait Restarter: Debug + Clone {
    /// Creates the strategy in its initial state.
    fn new() -> Self;

    /// Records one conflict and reports whether the solver should restart
    /// now. A `true` result counts as a restart.
    fn should_restart(&mut self) -> bool;

    /// Total restarts triggered so far.
    fn num_restarts(&self) -> usize;
}

/// Restarts after `luby(1) * N, luby(2) * N, ...` conflicts.
///
/// The Luby sequence runs 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...
/// and is optimal, up to a constant factor, for restarting a randomised
/// search whose run-time distribution is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Luby<const N: usize> {
    restarts: usize,
    conflicts: usize,
    interval: usize,
}

impl<const N: usize> Luby<N> {
    /// The `i`-th element (1-based) of the Luby sequence.
    #[must_use]
    pub fn luby(i: usize) -> usize {
        let mut k = 1_u32;
        while (1_usize << k) - 1 < i {
            k += 1;
        }
        if (1_usize << k) - 1 == i {
            1 << (k - 1)
        } else {
            Self::luby(i - (1 << (k - 1)) + 1)
        }
    }
}

impl<const N: usize> Restarter for Luby<N> {
    fn new() -> Self {
        Self {
            restarts: 0,
            conflicts: 0,
            interval: N * Self::luby(1),
        }
    }

    fn should_restart(&mut self) -> bool {
        self.conflicts += 1;
        if self.conflicts < self.interval {
            return false;
        }
        self.restarts += 1;
        self.conflicts = 0;
        self.interval = N * Self::luby(self.restarts + 1);
        true
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

/// Restarts after `N` conflicts, then after intervals 1.5 times longer each
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometric<const N: usize> {
    restarts: usize,
    conflicts: usize,
    interval: usize,
}

impl<const N: usize> Restarter for Geometric<N> {
    fn new() -> Self {
        Self {
            restarts: 0,
            conflicts: 0,
            interval: N.max(1),
        }
    }

    fn should_restart(&mut self) -> bool {
        self.conflicts += 1;
        if self.conflicts < self.interval {
            return false;
        }
        self.restarts += 1;
        self.conflicts = 0;
        self.interval += self.interval / 2;
        true
    }

    fn num_restarts(&self) -> usize {
        self.restarts
    }
}

/// Never restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Never;

impl Restarter for Never {
    fn new() -> Self {
        Self
    }

    fn should_restart(&mut self) -> bool {
        false
    }

    fn num_restarts(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby_sequence() {
        let seq: Vec<usize> = (1..=15).map(Luby::<1>::luby).collect();
        assert_eq!(seq, vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8]);
    }

    #[test]
    fn test_luby_restart_intervals() {
        let mut r = Luby::<2>::new();
        let mut restart_points = Vec::new();
        for conflict in 1..=20 {
            if r.should_restart() {
                restart_points.push(conflict);
            }
        }
        // Intervals 2, 2, 4, 2, 2, 4, 8.
        assert_eq!(restart_points, vec![2, 4, 8, 10, 12, 16]);
        assert_eq!(r.num_restarts(), 6);
    }

    #[test]
    fn test_geometric_grows() {
        let mut r = Geometric::<4>::new();
        let points: Vec<usize> = (1..=20).filter(|_| r.should_restart()).collect();
        // Intervals 4, 6, 9.
        assert_eq!(points.len(), 3);
        assert_eq!(r.num_restarts(), 3);
    }

    #[test]
    fn test_never() {
        let mut r = Never::new();
        assert!((0..1000).all(|_| !r.should_restart()));
        assert_eq!(r.num_restarts(), 0);
    }
}
