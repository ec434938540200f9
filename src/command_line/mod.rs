//! Argument parsing and per-puzzle drivers for the binary.

pub(crate) mod cli;
