//! Error types for the integer engine and the puzzle encoders.

use thiserror::Error;

/// Failures raised by a [`crate::csp::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `lb > ub` at declaration.
    #[error("variable `{name}` has an empty domain [{lb}, {ub}]")]
    EmptyDomain {
        /// Variable name.
        name: String,
        /// Requested lower bound.
        lb: i64,
        /// Requested upper bound.
        ub: i64,
    },

    /// The name is already in use.
    #[error("variable `{0}` is already declared in this session")]
    DuplicateVariable(String),

    /// A constraint mentions a variable declared elsewhere.
    #[error("variable #{0} does not belong to this session")]
    UnknownVariable(usize),

    /// A model was requested without a satisfiable check.
    #[error("no model is available; the last check was not satisfiable")]
    NoModel,

    /// The decoded model breaks an asserted constraint.
    #[error("model violates asserted constraint #{index}: {constraint}")]
    ModelViolation {
        /// Position of the constraint in assertion order.
        index: usize,
        /// The constraint, rendered.
        constraint: String,
    },

    /// A domain, coefficient or partial sum is too large to encode.
    #[error("arithmetic overflow while encoding {0}")]
    Overflow(String),
}

/// Malformed puzzle input, or an engine failure surfaced while solving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// Board side or queen count not supported.
    #[error("unsupported size {0}")]
    InvalidSize(usize),

    /// A ragged or non-square board.
    #[error("expected a {expected}x{expected} board, found {found}")]
    DimensionMismatch {
        /// Side implied by the row count.
        expected: usize,
        /// What was found instead.
        found: String,
    },

    /// A given outside `0..=n`.
    #[error("given {value} at ({row}, {col}) is outside 0..={max}")]
    GivenOutOfRange {
        /// Row of the given.
        row: usize,
        /// Column of the given.
        col: usize,
        /// The given.
        value: usize,
        /// Board side.
        max: usize,
    },

    /// A decoded cell outside `1..=n`.
    #[error("solved cell ({row}, {col}) holds {value}, outside 1..={max}")]
    CellOutOfRange {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
        /// The decoded value.
        value: i64,
        /// Board side.
        max: usize,
    },

    /// Two equal givens in one row, column or box.
    #[error("given {value} appears twice in {unit}")]
    DuplicateGiven {
        /// The repeated value.
        value: usize,
        /// Row, column or box holding it twice.
        unit: String,
    },

    /// A category is missing, unnamed, repeated or negatively priced.
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// The minimums cannot fit in the total count.
    #[error("bounds are infeasible: {0}")]
    InfeasibleBounds(String),

    /// Board text that does not parse.
    #[error("unparseable board: {0}")]
    Parse(String),

    /// The engine failed while solving.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
