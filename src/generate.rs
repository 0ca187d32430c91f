use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt;
use std::str::FromStr;

use crate::affinity::AffinityMatrix;
use crate::error::Result;
use crate::problem::Problem;

/// Shapes of synthetic weddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMethod {
    /// Friendship graph grown from random friends and friends of friends.
    Random,
    /// Each table's worth of guests all know each other.
    CompleteComponents,
    /// Each table's worth of guests form a ring of friends.
    Rings,
    /// Strong feelings, positive and negative, between everyone.
    Tense,
}

impl FromStr for GenerationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rand" | "random" => Ok(GenerationMethod::Random),
            "comp" | "complete" | "complete-components" => Ok(GenerationMethod::CompleteComponents),
            "ring" | "rings" => Ok(GenerationMethod::Rings),
            "tense" => Ok(GenerationMethod::Tense),
            other => Err(format!("unrecognised generation method: {other}")),
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationMethod::Random => "random",
            GenerationMethod::CompleteComponents => "complete-components",
            GenerationMethod::Rings => "rings",
            GenerationMethod::Tense => "tense",
        };
        f.write_str(name)
    }
}

/// Build a problem with `n_tables` tables of `table_size` guests.
pub fn generate(
    method: GenerationMethod,
    n_tables: usize,
    table_size: usize,
    rng: &mut impl Rng,
) -> Result<Problem> {
    let n_guests = n_tables * table_size;
    let relationships = match method {
        GenerationMethod::Random => random_relations(n_guests, rng),
        GenerationMethod::CompleteComponents => complete_components(n_tables, table_size),
        GenerationMethod::Rings => rings(n_tables, table_size),
        GenerationMethod::Tense => tense(n_guests, rng),
    };
    Ok(Problem::new(AffinityMatrix::new(relationships)?, n_tables)?)
}

fn tense(n_guests: usize, rng: &mut impl Rng) -> Vec<Vec<i64>> {
    let mut relations = vec![vec![0; n_guests]; n_guests];
    for i in 0..n_guests {
        for j in 0..i {
            // Irwin-Hall approximation of a standard normal.
            let r: f64 = (0..12).map(|_| rng.random::<f64>()).sum::<f64>() - 6.0;
            let affinity = (r * 30.0) as i64;
            relations[i][j] = affinity;
            relations[j][i] = affinity;
        }
    }
    relations
}

fn complete_components(n_tables: usize, table_size: usize) -> Vec<Vec<i64>> {
    let n_guests = n_tables * table_size;
    let mut relations = vec![vec![0; n_guests]; n_guests];
    for table in 0..n_tables {
        let members = table * table_size..(table + 1) * table_size;
        for i in members.clone() {
            for j in members.clone() {
                if i != j {
                    relations[i][j] = 1;
                }
            }
        }
    }
    relations
}

fn rings(n_tables: usize, table_size: usize) -> Vec<Vec<i64>> {
    let n_guests = n_tables * table_size;
    let mut relations = vec![vec![0; n_guests]; n_guests];
    if table_size < 2 {
        return relations;
    }
    for table in 0..n_tables {
        let base = table * table_size;
        for i in 0..table_size {
            let j = (i + 1) % table_size;
            relations[base + i][base + j] = 1;
            relations[base + j][base + i] = 1;
        }
    }
    relations
}

fn random_relations(n_guests: usize, rng: &mut impl Rng) -> Vec<Vec<i64>> {
    let mut relations = vec![vec![0; n_guests]; n_guests];
    if n_guests < 2 {
        return relations;
    }

    let mut friend_lists = random_friend_lists(n_guests, rng);
    friends_of_friends(&mut friend_lists, rng);

    for (guest, friends) in friend_lists.iter().enumerate() {
        for &friend in friends {
            // Nobody is their own friend.
            if friend != guest {
                relations[guest][friend] = 1;
                relations[friend][guest] = 1;
            }
        }
    }
    relations
}

/// Everyone gets at least one friend, and more with decreasing probability.
fn random_friend_lists(n_guests: usize, rng: &mut impl Rng) -> Vec<Vec<usize>> {
    let mut friend_lists = vec![Vec::new(); n_guests];
    for i in 0..n_guests {
        while rng.random_range(0..=friend_lists[i].len()) == 0 {
            let j = random_other(rng, i, n_guests);
            friend_lists[i].push(j);
            friend_lists[j].push(i);
        }
    }
    friend_lists
}

/// Introduce guests to friends of their friends, a random number of times.
fn friends_of_friends(friend_lists: &mut [Vec<usize>], rng: &mut impl Rng) {
    for i in 0..friend_lists.len() {
        while rng.random_range(0..=friend_lists[i].len()) == 0 {
            let Some(&mutual) = friend_lists[i].choose(rng) else {
                break;
            };
            let Some(&new_friend) = friend_lists[mutual].choose(rng) else {
                break;
            };
            friend_lists[i].push(new_friend);
            friend_lists[new_friend].push(i);
        }
    }
}

/// Requires `n_guests >= 2`.
fn random_other(rng: &mut impl Rng, guest: usize, n_guests: usize) -> usize {
    loop {
        let other = rng.random_range(0..n_guests);
        if other != guest {
            return other;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::SeatingPlan;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const METHODS: [GenerationMethod; 4] = [
        GenerationMethod::Random,
        GenerationMethod::CompleteComponents,
        GenerationMethod::Rings,
        GenerationMethod::Tense,
    ];

    #[test]
    fn every_method_yields_a_valid_problem() {
        let mut rng = StdRng::seed_from_u64(7);
        for method in METHODS {
            for (n_tables, table_size) in [(1, 1), (1, 2), (2, 3), (3, 4), (5, 5)] {
                let problem = generate(method, n_tables, table_size, &mut rng)
                    .unwrap_or_else(|e| panic!("{method} {n_tables}x{table_size}: {e}"));
                assert_eq!(problem.n_tables(), n_tables);
                assert_eq!(problem.capacity(), table_size);

                // Round-trips through the checked constructor.
                let rebuilt = Problem::from_raw(problem.relations().rows().to_vec(), n_tables);
                assert_eq!(rebuilt, Ok(problem));
            }
        }
    }

    #[test]
    fn random_guests_all_have_a_friend() {
        let mut rng = StdRng::seed_from_u64(42);
        let problem = generate(GenerationMethod::Random, 4, 5, &mut rng).unwrap();
        for row in problem.relations().rows() {
            assert!(row.iter().any(|&a| a == 1));
            assert!(row.iter().all(|&a| a == 0 || a == 1));
        }
    }

    #[test]
    fn complete_components_seat_cliques_together() {
        let mut rng = StdRng::seed_from_u64(0);
        let problem = generate(GenerationMethod::CompleteComponents, 3, 4, &mut rng).unwrap();
        let cliques = SeatingPlan::new(vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![8, 9, 10, 11],
        ]);
        let summary = problem.score(&cliques).unwrap();
        assert_eq!(summary.total, 3 * 6);
        assert_eq!(summary.n_lonely, 0);
    }

    #[test]
    fn complete_components_optimum_is_the_cliques() {
        let mut rng = StdRng::seed_from_u64(0);
        let problem = generate(GenerationMethod::CompleteComponents, 2, 4, &mut rng).unwrap();
        let seating = problem.solve().unwrap();
        assert_eq!(seating.summary.total, 2 * 6);
        let mut tables = seating.plan.tables().to_vec();
        tables.sort();
        assert_eq!(tables, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn rings_give_each_guest_two_neighbours() {
        let mut rng = StdRng::seed_from_u64(0);
        let problem = generate(GenerationMethod::Rings, 2, 5, &mut rng).unwrap();
        for row in problem.relations().rows() {
            assert_eq!(row.iter().sum::<i64>(), 2);
        }
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("comp".parse(), Ok(GenerationMethod::CompleteComponents));
        assert_eq!("Rings".parse(), Ok(GenerationMethod::Rings));
        assert_eq!("rand".parse(), Ok(GenerationMethod::Random));
        assert!("spiral".parse::<GenerationMethod>().is_err());
        for method in METHODS {
            assert_eq!(method.to_string().parse(), Ok(method));
        }
    }
}
