use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeatingError};
use crate::model::SeatingVariables;
use crate::problem::Problem;
use crate::solver::{Solution, SolveStatus, VariableValues};

/// Tables in order, each the ascending list of guest ids seated there.
/// Serialises as `[[0,1,2,3],[4,5,6,7]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<usize>>", into = "Vec<Vec<usize>>")]
pub struct SeatingPlan {
    tables: Vec<Vec<usize>>,
}

impl SeatingPlan {
    /// Guests within each table are sorted; table order is kept.
    pub fn new(mut tables: Vec<Vec<usize>>) -> Self {
        tables.iter_mut().for_each(|table| table.sort_unstable());
        Self { tables }
    }

    pub fn tables(&self) -> &[Vec<usize>] {
        &self.tables
    }

    pub fn n_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn table_of(&self, guest: usize) -> Option<usize> {
        self.tables.iter().position(|table| table.contains(&guest))
    }

    /// Check the plan seats every guest of `problem` exactly once and every
    /// table at exactly its capacity.
    pub fn validate(&self, problem: &Problem) -> Result<()> {
        if self.tables.len() != problem.n_tables() {
            return Err(SeatingError::InvalidPlan(format!(
                "expected {} tables, found {}",
                problem.n_tables(),
                self.tables.len()
            )));
        }

        let capacity = problem.capacity();
        if let Some((t, table)) = self
            .tables
            .iter()
            .enumerate()
            .find(|(_, table)| table.len() != capacity)
        {
            return Err(SeatingError::InvalidPlan(format!(
                "table {t} seats {} guests, expected {capacity}",
                table.len()
            )));
        }

        let mut seen = vec![false; problem.n_guests()];
        for &guest in self.tables.iter().flatten() {
            match seen.get_mut(guest) {
                None => {
                    return Err(SeatingError::InvalidPlan(format!(
                        "unknown guest {guest}"
                    )));
                }
                Some(true) => {
                    return Err(SeatingError::InvalidPlan(format!(
                        "guest {guest} is seated more than once"
                    )));
                }
                Some(slot) => *slot = true,
            }
        }
        // Table sizes sum to n_guests and nobody repeats, so nobody is missing.
        Ok(())
    }
}

impl From<Vec<Vec<usize>>> for SeatingPlan {
    fn from(tables: Vec<Vec<usize>>) -> Self {
        Self::new(tables)
    }
}

impl From<SeatingPlan> for Vec<Vec<usize>> {
    fn from(plan: SeatingPlan) -> Self {
        plan.tables
    }
}

/// For each table, the guests whose `at_table` variable reads as set.
fn read_tables(seating: &SeatingVariables, values: &impl VariableValues) -> Vec<Vec<usize>> {
    (0..seating.n_tables())
        .map(|table| {
            (0..seating.n_guests())
                .filter(|&guest| values.is_set(seating.at_table(table, guest)))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Whether resolved values seat every guest at exactly one table with no
/// table over `capacity`.
pub fn seats_everyone(
    seating: &SeatingVariables,
    values: &impl VariableValues,
    capacity: usize,
) -> bool {
    let tables = read_tables(seating, values);
    let mut seen = vec![0usize; seating.n_guests()];
    for &guest in tables.iter().flatten() {
        seen[guest] += 1;
    }
    tables.iter().all(|table| table.len() <= capacity) && seen.iter().all(|&n| n == 1)
}

/// Read the plan out of a solution's `at_table` variables.
///
/// Fails with [`SeatingError::Unsolvable`] unless the status is optimal or
/// feasible. An unproven incumbent that does not form a valid plan is
/// reported as `Unsolvable` with status aborted; an optimal one that does
/// not fails with [`SeatingError::InvalidPlan`].
pub fn decode_plan<V: VariableValues>(
    solution: &Solution<V>,
    problem: &Problem,
) -> Result<SeatingPlan> {
    let values = match &solution.values {
        Some(values) if solution.status.has_solution() => values,
        _ => {
            return Err(SeatingError::Unsolvable {
                status: solution.status,
            });
        }
    };

    let plan = SeatingPlan::new(read_tables(&solution.variables, values));
    debug!("decoded plan: {:?}", plan.tables());
    let validated = plan.validate(problem);
    match validated {
        Err(_) if solution.status == SolveStatus::Feasible => Err(SeatingError::Unsolvable {
            status: SolveStatus::Aborted,
        }),
        result => result.map(|()| plan),
    }
}
