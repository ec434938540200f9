#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Sudoku boards of size 4, 9, 16 and 25 as integer constraint problems.
//!
//! Each cell is an integer in `[1, n]`; every row, column and box is
//! all-different and every given is fixed by an equality.

/// Board parsing and validation, the encoding, and example givens.
pub mod solver;

pub use solver::{Board, EXAMPLE_FOUR, EXAMPLE_NINE, EXAMPLE_SIXTEEN, Size, Sudoku};
