use good_lp::{Expression, Variable};

use crate::affinity::AffinityMatrix;
use crate::model::SeatingVariables;
use crate::solver::VariableValues;

/// The linear stand-in for "sum of affinities of every co-seated pair".
///
/// Each unordered pair `j < k` contributes `affinity[j][k] * pair_at_table[t][j][k]`
/// for every table `t`; only one table's term can be non-zero since a guest
/// sits at one table. Pairs with zero affinity are omitted.
#[derive(Debug, Clone, Default)]
pub struct Objective {
    terms: Vec<(Variable, f64)>,
}

impl Objective {
    /// # Panics
    /// Panics if `seating` was built for a different number of guests.
    pub fn linearize(relations: &AffinityMatrix, seating: &SeatingVariables) -> Self {
        let n_guests = relations.len();
        assert_eq!(n_guests, seating.n_guests(), "guest count mismatch");

        let mut terms = Vec::new();
        for table in 0..seating.n_tables() {
            for j in 0..n_guests {
                for k in (j + 1)..n_guests {
                    let weight = relations.affinity(j, k);
                    if weight != 0 {
                        terms.push((seating.pair_at_table(table, j, k), weight as f64));
                    }
                }
            }
        }
        Self { terms }
    }

    pub fn terms(&self) -> &[(Variable, f64)] {
        &self.terms
    }

    pub fn expression(&self) -> Expression {
        let mut objective = Expression::with_capacity(self.terms.len());
        for &(var, weight) in &self.terms {
            objective.add_mul(weight, var);
        }
        objective
    }

    /// Value of the objective under resolved variable values, with each
    /// binary read as 0 or 1.
    pub fn evaluate(&self, values: &impl VariableValues) -> f64 {
        self.terms
            .iter()
            .filter(|&&(var, _)| values.is_set(var))
            .map(|&(_, weight)| weight)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::tests::two_cliques;
    use crate::model::ModelBuilder;
    use crate::problem::Problem;

    #[test]
    fn one_term_per_table_and_weighted_pair() {
        let problem = Problem::from_raw(two_cliques(), 2).unwrap();
        let model = ModelBuilder::new(&problem).build();
        let objective = Objective::linearize(problem.relations(), model.variables());

        // 12 liked pairs (6 per clique), once per table.
        assert_eq!(objective.terms().len(), 24);
        assert!(objective.terms().iter().all(|&(_, w)| w == 1.0));

        let pair = model.variables().pair_at_table(1, 0, 3);
        assert!(objective.terms().iter().any(|&(v, _)| v == pair));
        // Only the upper triangle is read.
        let mirrored = model.variables().pair_at_table(1, 3, 0);
        assert!(objective.terms().iter().all(|&(v, _)| v != mirrored));
    }

    #[test]
    fn zero_matrix_has_empty_objective() {
        let problem = Problem::from_raw(vec![vec![0; 4]; 4], 2).unwrap();
        let model = ModelBuilder::new(&problem).build();
        let objective = Objective::linearize(problem.relations(), model.variables());
        assert!(objective.terms().is_empty());
    }

    #[test]
    fn evaluates_only_set_pairs() {
        struct Set(Vec<Variable>);
        impl VariableValues for Set {
            fn value(&self, var: Variable) -> f64 {
                if self.0.contains(&var) { 1.0 } else { 0.0 }
            }
        }

        let problem = Problem::from_raw(vec![vec![0, 5, 2], vec![5, 0, 7], vec![2, 7, 0]], 1)
            .unwrap();
        let model = ModelBuilder::new(&problem).build();
        let vars = model.variables();
        let objective = Objective::linearize(problem.relations(), vars);

        let values = Set(vec![vars.pair_at_table(0, 0, 1), vars.pair_at_table(0, 1, 2)]);
        assert_eq!(objective.evaluate(&values), 12.0);
    }
}
