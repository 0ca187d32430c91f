use serde::{Deserialize, Serialize};

use crate::affinity::AffinityMatrix;
use crate::error::MalformedInputError;
use crate::types::{ProblemInput, RelationsInput};

/// A wedding: who likes whom, and how many tables to spread them over.
///
/// Every table holds exactly `capacity()` guests. Partially filled tables
/// are not supported, so the guest count must divide evenly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProblemInput", into = "ProblemInput")]
pub struct Problem {
    relations: AffinityMatrix,
    n_tables: usize,
}

impl Problem {
    pub fn new(relations: AffinityMatrix, n_tables: usize) -> Result<Self, MalformedInputError> {
        if n_tables == 0 {
            return Err(MalformedInputError::ZeroTables);
        }
        let n_guests = relations.len();
        if n_guests % n_tables != 0 {
            return Err(MalformedInputError::UnevenTables { n_guests, n_tables });
        }
        Ok(Self {
            relations,
            n_tables,
        })
    }

    /// Validate a raw matrix and table count in one step.
    pub fn from_raw(
        relationships: Vec<Vec<i64>>,
        n_tables: usize,
    ) -> Result<Self, MalformedInputError> {
        Self::new(AffinityMatrix::new(relationships)?, n_tables)
    }

    pub fn relations(&self) -> &AffinityMatrix {
        &self.relations
    }

    pub fn n_guests(&self) -> usize {
        self.relations.len()
    }

    pub fn n_tables(&self) -> usize {
        self.n_tables
    }

    /// Guests per table.
    pub fn capacity(&self) -> usize {
        self.n_guests() / self.n_tables
    }

    /// The same problem with negative affinities shifted away, plus the
    /// shift applied. Table count and capacity are unchanged.
    pub fn shifted(&self) -> (Problem, i64) {
        let shifted = self.relations.shift_non_negative();
        let problem = Problem {
            relations: shifted.matrix,
            n_tables: self.n_tables,
        };
        (problem, shifted.shift)
    }
}

impl TryFrom<ProblemInput> for Problem {
    type Error = MalformedInputError;

    fn try_from(input: ProblemInput) -> Result<Self, Self::Error> {
        Self::from_raw(input.relations.relationships, input.n_tables)
    }
}

impl From<Problem> for ProblemInput {
    fn from(problem: Problem) -> Self {
        ProblemInput {
            relations: RelationsInput {
                relationships: problem.relations.into(),
            },
            n_tables: problem.n_tables,
        }
    }
}
