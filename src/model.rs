use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable, variables};
use log::debug;
use std::fmt;

use crate::problem::Problem;

/// The named constraint families that together carve out the set of valid
/// seating plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintFamily {
    /// Each guest sits at exactly one table.
    Assignment,
    /// Each table holds at most `capacity` guests.
    Capacity,
    /// `sum_j pair_at_table[t][j][k] <= capacity * at_table[t][k]`
    PairByFirstGuest,
    /// `sum_k pair_at_table[t][j][k] <= capacity * at_table[t][j]`
    PairBySecondGuest,
    /// Guest 0 sits at table 0.
    SymmetryBreak,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 5] = [
        ConstraintFamily::Assignment,
        ConstraintFamily::Capacity,
        ConstraintFamily::PairByFirstGuest,
        ConstraintFamily::PairBySecondGuest,
        ConstraintFamily::SymmetryBreak,
    ];
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintFamily::Assignment => "assignment",
            ConstraintFamily::Capacity => "capacity",
            ConstraintFamily::PairByFirstGuest => "pair-by-first-guest",
            ConstraintFamily::PairBySecondGuest => "pair-by-second-guest",
            ConstraintFamily::SymmetryBreak => "symmetry-break",
        };
        f.write_str(name)
    }
}

/// Handles to every decision variable, indexed the way the formulation
/// reads. Kept after solving so resolved values can be looked up.
#[derive(Debug, Clone)]
pub struct SeatingVariables {
    /// `[table][guest]`: 1 iff the guest sits at the table.
    at_table: Vec<Vec<Variable>>,
    /// `[table][guest1][guest2]`: 1 only if both guests sit at the table.
    pair_at_table: Vec<Vec<Vec<Variable>>>,
}

impl SeatingVariables {
    pub fn at_table(&self, table: usize, guest: usize) -> Variable {
        self.at_table[table][guest]
    }

    pub fn pair_at_table(&self, table: usize, guest1: usize, guest2: usize) -> Variable {
        self.pair_at_table[table][guest1][guest2]
    }

    pub fn n_tables(&self) -> usize {
        self.at_table.len()
    }

    pub fn n_guests(&self) -> usize {
        self.at_table.first().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        let n_guests = self.n_guests();
        self.n_tables() * (n_guests + n_guests * n_guests)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The variables and constraints for one problem instance.
///
/// Built fresh for every solve and consumed by the solver.
pub struct Model {
    problem_vars: ProblemVariables,
    seating: SeatingVariables,
    constraints: Vec<(ConstraintFamily, Constraint)>,
    capacity: usize,
}

impl Model {
    pub fn variables(&self) -> &SeatingVariables {
        &self.seating
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn constraints(&self) -> impl Iterator<Item = &(ConstraintFamily, Constraint)> {
        self.constraints.iter()
    }

    pub fn constraint_count(&self, family: ConstraintFamily) -> usize {
        self.constraints.iter().filter(|(f, _)| *f == family).count()
    }

    pub fn into_parts(
        self,
    ) -> (
        ProblemVariables,
        Vec<(ConstraintFamily, Constraint)>,
        SeatingVariables,
    ) {
        (self.problem_vars, self.constraints, self.seating)
    }
}

/// Encodes a [`Problem`] as a binary program whose feasible points are
/// exactly the valid seating plans.
///
/// The pair variables are only bounded from above. A full AND linearisation
/// would also need `pair_at_table[t][j][k] >= at_table[t][j] + at_table[t][k] - 1`;
/// it is left out because the objective maximises non-negative weights over
/// pair variables and reads them nowhere else. Negating the objective or
/// penalising pairs requires putting that lower bound back.
pub struct ModelBuilder<'a> {
    problem: &'a Problem,
    break_symmetry: bool,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            break_symmetry: false,
        }
    }

    /// Pin guest 0 to table 0. Tables are interchangeable, so no optimum is
    /// lost.
    pub fn break_symmetry(mut self, enabled: bool) -> Self {
        self.break_symmetry = enabled;
        self
    }

    pub fn build(self) -> Model {
        let n_tables = self.problem.n_tables();
        let n_guests = self.problem.n_guests();
        let capacity = self.problem.capacity();

        let (problem_vars, seating) = init_variables(n_tables, n_guests);

        let mut constraints = Vec::new();
        constraints.extend(
            constrain_single_table_per_guest(&seating)
                .map(|c| (ConstraintFamily::Assignment, c)),
        );
        constraints.extend(
            constrain_table_capacities(&seating, capacity).map(|c| (ConstraintFamily::Capacity, c)),
        );
        constraints.extend(
            constrain_pairs_by_first_guest(&seating, capacity)
                .map(|c| (ConstraintFamily::PairByFirstGuest, c)),
        );
        constraints.extend(
            constrain_pairs_by_second_guest(&seating, capacity)
                .map(|c| (ConstraintFamily::PairBySecondGuest, c)),
        );
        if self.break_symmetry {
            let first = seating.at_table(0, 0);
            constraints.push((ConstraintFamily::SymmetryBreak, constraint!(first == 1.0)));
        }

        let model = Model {
            problem_vars,
            seating,
            constraints,
            capacity,
        };
        debug!(
            "built model: {} variables, {} constraints, capacity {}",
            model.seating.len(),
            model.constraints.len(),
            capacity
        );
        for family in ConstraintFamily::ALL {
            debug!("  {family}: {}", model.constraint_count(family));
        }
        model
    }
}

fn init_variables(n_tables: usize, n_guests: usize) -> (ProblemVariables, SeatingVariables) {
    let mut problem_vars = variables!();

    let at_table: Vec<Vec<Variable>> = (0..n_tables)
        .map(|_| {
            (0..n_guests)
                .map(|_| problem_vars.add(variable().binary()))
                .collect::<Vec<_>>()
        })
        .collect();

    let pair_at_table: Vec<Vec<Vec<Variable>>> = (0..n_tables)
        .map(|_| {
            (0..n_guests)
                .map(|_| {
                    (0..n_guests)
                        .map(|_| problem_vars.add(variable().binary()))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        })
        .collect();

    (
        problem_vars,
        SeatingVariables {
            at_table,
            pair_at_table,
        },
    )
}

/// `sum_t at_table[t][g] == 1` for every guest.
fn constrain_single_table_per_guest(
    seating: &SeatingVariables,
) -> impl Iterator<Item = Constraint> + '_ {
    (0..seating.n_guests()).map(move |guest| {
        let tables_seated_at = (0..seating.n_tables())
            .map(|table| seating.at_table(table, guest))
            .fold(Expression::from(0.0), |sum, v| sum + v);
        tables_seated_at.eq(1.0)
    })
}

/// `sum_g at_table[t][g] <= capacity` for every table. With exact
/// divisibility this is tight in every feasible solution.
fn constrain_table_capacities(
    seating: &SeatingVariables,
    capacity: usize,
) -> impl Iterator<Item = Constraint> + '_ {
    (0..seating.n_tables()).map(move |table| {
        let people_seated = (0..seating.n_guests())
            .map(|guest| seating.at_table(table, guest))
            .fold(Expression::from(0.0), |sum, v| sum + v);
        people_seated.leq(capacity as f64)
    })
}

/// Pairs naming guest `k` second can only be set when `k` is at the table.
/// Scaled by `capacity` rather than 1, which is looser but still valid.
fn constrain_pairs_by_first_guest(
    seating: &SeatingVariables,
    capacity: usize,
) -> impl Iterator<Item = Constraint> + '_ {
    let n_guests = seating.n_guests();
    (0..seating.n_tables()).flat_map(move |table| {
        (0..n_guests).map(move |k| {
            let lhs = (0..n_guests)
                .map(|j| seating.pair_at_table(table, j, k))
                .fold(Expression::from(0.0), |sum, v| sum + v);
            lhs.leq(capacity as f64 * seating.at_table(table, k))
        })
    })
}

/// Mirror of [`constrain_pairs_by_first_guest`].
fn constrain_pairs_by_second_guest(
    seating: &SeatingVariables,
    capacity: usize,
) -> impl Iterator<Item = Constraint> + '_ {
    let n_guests = seating.n_guests();
    (0..seating.n_tables()).flat_map(move |table| {
        (0..n_guests).map(move |j| {
            let lhs = (0..n_guests)
                .map(|k| seating.pair_at_table(table, j, k))
                .fold(Expression::from(0.0), |sum, v| sum + v);
            lhs.leq(capacity as f64 * seating.at_table(table, j))
        })
    })
}
