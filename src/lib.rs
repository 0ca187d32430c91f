pub mod affinity;
pub mod config;
pub mod decode;
pub mod error;
pub mod generate;
pub mod metrics;
pub mod model;
pub mod objective;
pub mod problem;
pub mod report;
pub mod solver;
pub mod types;

use log::info;
use std::time::Duration;

pub use affinity::{AffinityMatrix, Shifted};
pub use config::PlannerConfig;
pub use decode::{SeatingPlan, decode_plan};
pub use error::{MalformedInputError, Result, SeatingError};
pub use generate::{GenerationMethod, generate};
pub use metrics::HappinessSummary;
pub use model::{ConstraintFamily, Model, ModelBuilder, SeatingVariables};
pub use objective::Objective;
pub use problem::Problem;
pub use solver::{CbcSolver, Solution, SolveStatus, SolverAdapter, VariableValues};
pub use types::{ProblemInput, RunRecord};

/// A solved seating problem.
#[derive(Debug, Clone)]
pub struct Seating {
    pub status: SolveStatus,
    pub plan: SeatingPlan,
    /// Statistics against the affinities as given, before any shift.
    pub summary: HappinessSummary,
    /// The solver's objective, measured on the shifted matrix.
    pub objective_value: f64,
    /// Amount added to every off-diagonal affinity before modelling.
    pub shift: i64,
    pub elapsed: Duration,
}

impl Seating {
    pub fn record(&self, problem: &Problem) -> RunRecord {
        self.summary.record(problem, self.elapsed.as_secs_f64())
    }
}

impl Problem {
    /// Solve with CBC and default settings.
    pub fn solve(&self) -> Result<Seating> {
        self.solve_with(&PlannerConfig::default())
    }

    pub fn solve_with(&self, config: &PlannerConfig) -> Result<Seating> {
        self.solve_using(&CbcSolver::new(config.clone()), config)
    }

    /// Shift, model, solve and decode. Model options come from `config`;
    /// engine options are whatever `solver` was built with.
    pub fn solve_using<S: SolverAdapter>(
        &self,
        solver: &S,
        config: &PlannerConfig,
    ) -> Result<Seating> {
        let (shifted, shift) = self.shifted();

        // Create all variables and constraints
        let model = ModelBuilder::new(&shifted)
            .break_symmetry(config.break_symmetry)
            .build();
        let objective = Objective::linearize(shifted.relations(), model.variables());
        info!(
            "seating {} guests at {} tables of {}: {} variables, {} constraints, {} objective terms",
            self.n_guests(),
            self.n_tables(),
            self.capacity(),
            model.variables().len(),
            model.constraints().count(),
            objective.terms().len()
        );

        // Solve
        let solution = solver.solve(model, &objective);

        // Convert the solver's solution into a seating plan
        let plan = decode_plan(&solution, self)?;
        let summary = HappinessSummary::of(&plan, self.relations());

        Ok(Seating {
            status: solution.status,
            plan,
            summary,
            objective_value: solution.objective_value.unwrap_or_default(),
            shift,
            elapsed: solution.elapsed,
        })
    }

    /// Score an externally produced plan against this problem.
    pub fn score(&self, plan: &SeatingPlan) -> Result<HappinessSummary> {
        plan.validate(self)?;
        Ok(HappinessSummary::of(plan, self.relations()))
    }
}
