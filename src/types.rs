use serde::{Deserialize, Serialize};

/// A problem as it arrives on the wire:
/// `{"relations": {"relationships": [[...]]}, "n_tables": 2}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemInput {
    pub relations: RelationsInput,
    pub n_tables: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsInput {
    pub relationships: Vec<Vec<i64>>,
}

/// One line of a solved-run log, consumed by external reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub n_people: usize,
    pub n_tables: usize,
    pub total_happiness: i64,
    pub mean_happiness: f64,
    pub median_happiness: f64,
    pub min_happiness: i64,
    pub max_happiness: i64,
    pub n_lonely: usize,
    pub seconds: f64,
}
