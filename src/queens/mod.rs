#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! N-Queens on an `n x n` board of 0/1 cells.

/// Encoding, diagonals and placement checks.
pub mod solver;

pub use solver::{Placement, Queens};
