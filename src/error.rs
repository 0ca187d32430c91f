use thiserror::Error;

use crate::solver::SolveStatus;

pub type Result<T> = std::result::Result<T, SeatingError>;

/// Rejections raised while validating an affinity matrix and table count.
/// These never reach the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    #[error("affinity matrix has no guests")]
    Empty,

    #[error("affinity matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("affinity matrix is not symmetric at ({i}, {j})")]
    Asymmetric { i: usize, j: usize },

    #[error("guest {guest} has non-zero affinity {value} with themself")]
    NonZeroDiagonal { guest: usize, value: i64 },

    #[error("affinities too large: shifting or summing them overflows")]
    AffinityOverflow,

    #[error("number of tables must be positive")]
    ZeroTables,

    #[error("{n_guests} guests cannot be split evenly over {n_tables} tables")]
    UnevenTables { n_guests: usize, n_tables: usize },
}

#[derive(Debug, Error)]
pub enum SeatingError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInputError),

    #[error("solver finished without a usable solution (status: {status})")]
    Unsolvable { status: SolveStatus },

    #[error("invalid seating plan: {0}")]
    InvalidPlan(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
