use crate::csp::{EngineConfig, IntVar, Session, eq, le, sum};
use crate::error::PuzzleError;
use crate::extract::{Outcome, conclude, extract_grid};
use crate::grid::{Grid, declare_grid};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Places `size` non-attacking queens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Queens {
    size: usize,
}

impl Default for Queens {
    fn default() -> Self {
        Self { size: 8 }
    }
}

impl Queens {
    /// # Errors
    ///
    /// `InvalidSize` for an empty board.
    pub const fn new(size: usize) -> Result<Self, PuzzleError> {
        if size == 0 {
            return Err(PuzzleError::InvalidSize(size));
        }
        Ok(Self { size })
    }

    /// Board side, and number of queens.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Cells of every diagonal holding at least two squares.
    ///
    /// Descending diagonals (constant `row - col`) come first, then ascending
    /// ones (constant `row + col`). Each appears once, so there are
    /// `2 * (2n - 3)` of them for `n >= 2`.
    #[must_use]
    pub fn diagonals(&self) -> Vec<Vec<(usize, usize)>> {
        let n = self.size;
        // row - col == n - 1 - k
        let descending = (0..2 * n - 1).map(|k| {
            (0..n)
                .filter_map(|r| (r + n - 1).checked_sub(k).filter(|&c| c < n).map(|c| (r, c)))
                .collect_vec()
        });
        // row + col == s
        let ascending = (0..2 * n - 1).map(|s| {
            (0..n)
                .filter_map(|r| s.checked_sub(r).filter(|&c| c < n).map(|c| (r, c)))
                .collect_vec()
        });
        descending
            .chain(ascending)
            .filter(|cells| cells.len() >= 2)
            .collect()
    }

    /// Declares the 0/1 cells and asserts the row, column and diagonal sums.
    ///
    /// # Errors
    ///
    /// Engine failures while declaring or asserting.
    pub fn encode(&self, session: &mut Session) -> Result<Grid<IntVar>, PuzzleError> {
        let n = self.size;
        let cells = declare_grid(session, "board", n, n, 0, 1)?;

        for r in 0..n {
            session.assert(eq(sum(cells.row(r).copied()), 1))?;
        }
        for c in 0..n {
            session.assert(eq(sum(cells.column(c).copied()), 1))?;
        }
        for diagonal in self.diagonals() {
            session.assert(le(sum(diagonal.into_iter().map(|pos| cells[pos])), 1))?;
        }
        Ok(cells)
    }

    /// # Errors
    ///
    /// Engine failures; sizes 2 and 3 are [`Outcome::Infeasible`].
    pub fn solve(&self) -> Result<Outcome<Placement>, PuzzleError> {
        self.solve_with(EngineConfig::default())
    }

    /// # Errors
    ///
    /// See [`Queens::solve`].
    pub fn solve_with(&self, config: EngineConfig) -> Result<Outcome<Placement>, PuzzleError> {
        self.solve_in(&mut Session::new(config))
    }

    /// Solves in a caller-provided session. The board variables are declared
    /// by name, so each call needs a fresh session.
    ///
    /// # Errors
    ///
    /// See [`Queens::solve`]; a reused session fails with
    /// `DuplicateVariable`.
    pub fn solve_in(&self, session: &mut Session) -> Result<Outcome<Placement>, PuzzleError> {
        let cells = self.encode(session)?;
        log::debug!("{n}-queens", n = self.size);
        conclude(session, |s| extract_grid(s, &cells).map(Placement))
    }
}

/// A solved board, `1` where a queen stands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement(Grid<i64>);

impl Placement {
    /// The board, `1` where a queen stands.
    #[must_use]
    pub const fn grid(&self) -> &Grid<i64> {
        &self.0
    }

    /// Queen positions in row-major order.
    #[must_use]
    pub fn positions(&self) -> Vec<(usize, usize)> {
        self.0
            .indexed()
            .filter(|&(_, &v)| v == 1)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// True if every row and column holds exactly one queen and no two
    /// queens share a diagonal.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let n = self.0.rows();
        if self.0.cols() != n || self.0.iter().any(|&v| v != 0 && v != 1) {
            return false;
        }
        let one_each = (0..n).all(|i| {
            self.0.row(i).sum::<i64>() == 1 && self.0.column(i).sum::<i64>() == 1
        });
        one_each
            && self
                .positions()
                .iter()
                .tuple_combinations()
                .all(|(&(r1, c1), &(r2, c2))| r1.abs_diff(r2) != c1.abs_diff(c2))
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
