//! Row-major two-dimensional grids.
//!
//! Used for both the decision variables of the grid puzzles and their
//! decoded solutions, so that a cell is addressed by `(row, col)` rather than
//! by a parsed variable name.

use crate::csp::{IntVar, Session};
use crate::error::EngineError;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

/// A `rows x cols` grid stored row by row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Fills each cell with `f(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let cells = (0..rows)
            .cartesian_product(0..cols)
            .map(|(r, c)| f(r, c))
            .collect();
        Self { rows, cols, cells }
    }

    /// Like [`Grid::from_fn`], stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`.
    pub fn try_from_fn<E>(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> Result<T, E>,
    ) -> Result<Self, E> {
        let cells = (0..rows)
            .cartesian_product(0..cols)
            .map(|(r, c)| f(r, c))
            .collect::<Result<_, _>>()?;
        Ok(Self { rows, cols, cells })
    }

    /// Builds a grid from nested rows. Returns `None` if the rows are ragged.
    pub fn from_rows<R: IntoIterator<Item = T>>(rows: impl IntoIterator<Item = R>) -> Option<Self> {
        let mut cells = Vec::new();
        let mut cols = None;
        let mut n_rows = 0;
        for row in rows {
            let before = cells.len();
            cells.extend(row);
            let width = cells.len() - before;
            if *cols.get_or_insert(width) != width {
                return None;
            }
            n_rows += 1;
        }
        Some(Self {
            rows: n_rows,
            cols: cols.unwrap_or(0),
            cells,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    /// Cells of one row, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &T> {
        self.cells[row * self.cols..(row + 1) * self.cols].iter()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &T> {
        self.cells.iter().skip(col).step_by(self.cols.max(1))
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Cells with their `(row, col)` position.
    pub fn indexed(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i / cols, i % cols), v))
    }

    /// Applies `f` to every cell, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }

    /// The cells as nested rows.
    pub fn into_rows(self) -> Vec<Vec<T>> {
        let cols = self.cols.max(1);
        let mut it = self.cells.into_iter();
        (0..self.rows)
            .map(|_| it.by_ref().take(cols).collect())
            .collect()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(col < self.cols, "column {col} out of bounds");
        &self.cells[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(col < self.cols, "column {col} out of bounds");
        &mut self.cells[row * self.cols + col]
    }
}

/// One line per row, cells separated by a single space.
impl<T: Display> Display for Grid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for r in 0..self.rows {
            writeln!(f, "{}", self.row(r).join(" "))?;
        }
        Ok(())
    }
}

/// Declares a `rows x cols` grid of integer variables named `prefix(r,c)`,
/// each with domain `[lb, ub]`.
///
/// # Errors
///
/// Propagates declaration failures from the session.
pub fn declare_grid(
    session: &mut Session,
    prefix: &str,
    rows: usize,
    cols: usize,
    lb: i64,
    ub: i64,
) -> Result<Grid<IntVar>, EngineError> {
    Grid::try_from_fn(rows, cols, |r, c| {
        session.declare_integer(format!("{prefix}({r},{c})"), lb, ub)
    })
}
