#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Buying an exact number of items across priced categories for an exact
//! budget.

/// Puzzle definition, encoding and allocation checks.
pub mod solver;

pub use solver::{Allocation, Category, ResourcePuzzle};
