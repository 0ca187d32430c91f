use serde::{Deserialize, Serialize};

use crate::affinity::AffinityMatrix;
use crate::decode::SeatingPlan;
use crate::problem::Problem;
use crate::types::RunRecord;

/// Each guest's happiness: the sum of their affinities to their tablemates.
/// Indexed by guest id.
///
/// # Panics
/// Panics if the plan names a guest outside the matrix.
pub fn guest_happiness(plan: &SeatingPlan, relations: &AffinityMatrix) -> Vec<i64> {
    let mut happiness = vec![0; relations.len()];
    for table in plan.tables() {
        for &guest1 in table {
            happiness[guest1] = table
                .iter()
                .map(|&guest2| relations.affinity(guest1, guest2))
                .sum();
        }
    }
    happiness
}

/// Sum of affinities over every co-seated pair, each pair counted once.
pub fn total_happiness(plan: &SeatingPlan, relations: &AffinityMatrix) -> i64 {
    let mut total = 0;
    for table in plan.tables() {
        for (i, &guest1) in table.iter().enumerate() {
            for &guest2 in &table[i + 1..] {
                total += relations.affinity(guest1, guest2);
            }
        }
    }
    total
}

/// Guests whose affinity to their tablemates sums to exactly zero.
pub fn lonely_guests(plan: &SeatingPlan, relations: &AffinityMatrix) -> usize {
    guest_happiness(plan, relations)
        .into_iter()
        .filter(|&h| h == 0)
        .count()
}

/// Summary statistics of a plan, on whatever matrix it is scored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HappinessSummary {
    pub total: i64,
    pub mean: f64,
    pub median: f64,
    pub min: i64,
    pub max: i64,
    pub n_lonely: usize,
}

impl HappinessSummary {
    pub fn of(plan: &SeatingPlan, relations: &AffinityMatrix) -> Self {
        let mut per_guest = guest_happiness(plan, relations);
        per_guest.sort_unstable();

        let n = per_guest.len();
        let mean = if n == 0 {
            0.0
        } else {
            per_guest.iter().sum::<i64>() as f64 / n as f64
        };
        let median = match n {
            0 => 0.0,
            n if n % 2 == 1 => per_guest[n / 2] as f64,
            n => (per_guest[n / 2 - 1] + per_guest[n / 2]) as f64 / 2.0,
        };

        Self {
            total: total_happiness(plan, relations),
            mean,
            median,
            min: per_guest.first().copied().unwrap_or(0),
            max: per_guest.last().copied().unwrap_or(0),
            n_lonely: per_guest.iter().filter(|&&h| h == 0).count(),
        }
    }

    pub fn record(&self, problem: &Problem, seconds: f64) -> RunRecord {
        RunRecord {
            n_people: problem.n_guests(),
            n_tables: problem.n_tables(),
            total_happiness: self.total,
            mean_happiness: self.mean,
            median_happiness: self.median,
            min_happiness: self.min,
            max_happiness: self.max,
            n_lonely: self.n_lonely,
            seconds,
        }
    }
}
