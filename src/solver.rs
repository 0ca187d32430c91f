use good_lp::Solution as LpSolution;
use good_lp::solvers::coin_cbc::coin_cbc;
use good_lp::solvers::{SolutionStatus, WithTimeLimit};
use good_lp::{ResolutionError, SolverModel, Variable};
use log::{info, warn};
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::PlannerConfig;
use crate::decode::seats_everyone;
use crate::model::{Model, SeatingVariables};
use crate::objective::Objective;

/// Where a solve ended up, independent of the engine's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Optimal,
    /// A valid plan was found but not proven optimal.
    Feasible,
    Infeasible,
    Unbounded,
    /// The engine stopped before producing a usable answer.
    Aborted,
    Unknown,
}

impl SolveStatus {
    /// Whether resolved variable values can be trusted to form a plan.
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unbounded => "UNBOUNDED",
            SolveStatus::Aborted => "ABORTED",
            SolveStatus::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Read access to the value a solver gave each variable.
pub trait VariableValues {
    fn value(&self, var: Variable) -> f64;

    /// Binary reading of a variable, tolerant of relaxation noise.
    fn is_set(&self, var: Variable) -> bool {
        self.value(var) > 0.5
    }
}

impl<S: LpSolution> VariableValues for S {
    fn value(&self, var: Variable) -> f64 {
        LpSolution::value(self, var)
    }
}

/// What comes back from a solver: a status and, when one exists, the
/// resolved values for the model's variables.
pub struct Solution<V> {
    pub status: SolveStatus,
    pub variables: SeatingVariables,
    pub values: Option<V>,
    /// Objective under `values`, on the matrix the model was built from.
    pub objective_value: Option<f64>,
    pub elapsed: Duration,
}

impl<V: VariableValues> Solution<V> {
    pub fn solved(
        status: SolveStatus,
        variables: SeatingVariables,
        values: V,
        objective: &Objective,
        elapsed: Duration,
    ) -> Self {
        let objective_value = Some(objective.evaluate(&values));
        Self {
            status,
            variables,
            values: Some(values),
            objective_value,
            elapsed,
        }
    }

    pub fn failed(status: SolveStatus, variables: SeatingVariables, elapsed: Duration) -> Self {
        Self {
            status,
            variables,
            values: None,
            objective_value: None,
            elapsed,
        }
    }
}

/// Boundary to a MILP engine: takes ownership of a model, maximises the
/// objective over it and reports back.
pub trait SolverAdapter {
    type Values: VariableValues;

    fn solve(&self, model: Model, objective: &Objective) -> Solution<Self::Values>;
}

/// COIN-OR CBC through `good_lp`.
#[derive(Debug, Clone, Default)]
pub struct CbcSolver {
    config: PlannerConfig,
}

impl CbcSolver {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }
}

impl SolverAdapter for CbcSolver {
    type Values = good_lp::solvers::coin_cbc::CoinCbcSolution;

    fn solve(&self, model: Model, objective: &Objective) -> Solution<Self::Values> {
        let capacity = model.capacity();
        let (variables, constraints, seating) = model.into_parts();

        let mut problem = variables.maximise(objective.expression()).using(coin_cbc);
        if !self.config.log_solver {
            problem.set_parameter("loglevel", "0");
        }
        if let Some(threads) = self.config.threads {
            problem.set_parameter("threads", &threads.to_string());
        }
        if let Some(seconds) = self.config.time_limit_seconds {
            problem = problem.with_time_limit(seconds);
        }
        let problem = constraints
            .into_iter()
            .fold(problem, |m, (_, constraint)| m.with(constraint));

        info!("solving with CBC");
        let started = Instant::now();
        let result = problem.solve();
        let elapsed = started.elapsed();

        match result {
            Ok(solution) => {
                let status = match status_of_engine(LpSolution::status(&solution)) {
                    // Stopped early, possibly before any incumbent existed.
                    SolveStatus::Feasible if !seats_everyone(&seating, &solution, capacity) => {
                        SolveStatus::Aborted
                    }
                    status => status,
                };
                if !status.has_solution() {
                    warn!(
                        "CBC stopped after {:.3}s without a complete plan",
                        elapsed.as_secs_f64()
                    );
                    return Solution::failed(status, seating, elapsed);
                }
                info!("CBC finished in {:.3}s: {status}", elapsed.as_secs_f64());
                Solution::solved(status, seating, solution, objective, elapsed)
            }
            Err(err) => {
                let status = status_of_error(&err);
                warn!("CBC failed after {:.3}s: {err} ({status})", elapsed.as_secs_f64());
                Solution::failed(status, seating, elapsed)
            }
        }
    }
}

/// Only a finished search proves optimality; a time or gap limit leaves the
/// incumbent unproven.
fn status_of_engine(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::TimeLimit | SolutionStatus::GapLimit => SolveStatus::Feasible,
    }
}

fn status_of_error(err: &ResolutionError) -> SolveStatus {
    match err {
        ResolutionError::Infeasible => SolveStatus::Infeasible,
        ResolutionError::Unbounded => SolveStatus::Unbounded,
        other => {
            let message = other.to_string().to_lowercase();
            let interrupted = ["stopped", "abandoned", "userevent", "interrupt", "limit"]
                .iter()
                .any(|marker| message.contains(marker));
            if interrupted {
                SolveStatus::Aborted
            } else {
                SolveStatus::Unknown
            }
        }
    }
}
