use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::MalformedInputError;

/// A complete, undirected graph of how much each pair of guests wants to sit
/// together. Guests are indexed `0..len()`.
///
/// Always square, symmetric and zero along the diagonal. Entries may be
/// negative until [`AffinityMatrix::shift_non_negative`] is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct AffinityMatrix {
    relationships: Vec<Vec<i64>>,
}

/// The outcome of normalising a matrix for the linearised model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shifted {
    pub matrix: AffinityMatrix,
    /// Amount added to every off-diagonal entry. Zero when the input was
    /// already non-negative.
    pub shift: i64,
}

impl AffinityMatrix {
    pub fn new(relationships: Vec<Vec<i64>>) -> Result<Self, MalformedInputError> {
        let n = relationships.len();
        if n == 0 {
            return Err(MalformedInputError::Empty);
        }

        if let Some((row, r)) = relationships.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(MalformedInputError::NotSquare {
                row,
                len: r.len(),
                expected: n,
            });
        }

        for (guest, row) in relationships.iter().enumerate() {
            if row[guest] != 0 {
                return Err(MalformedInputError::NonZeroDiagonal {
                    guest,
                    value: row[guest],
                });
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if relationships[i][j] != relationships[j][i] {
                    return Err(MalformedInputError::Asymmetric { i, j });
                }
            }
        }

        check_magnitude(&relationships)?;
        Ok(Self { relationships })
    }

    /// Returns the degree of friendship two guests have.
    /// Positive is good, negative is bad, 0 is either unmet or self.
    /// # Panics
    /// Panics if either guest is out of bounds.
    pub fn affinity(&self, guest1: usize, guest2: usize) -> i64 {
        self.relationships[guest1][guest2]
    }

    /// Number of guests.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.relationships
    }

    pub fn min_entry(&self) -> i64 {
        self.relationships
            .iter()
            .flatten()
            .copied()
            .min()
            .unwrap_or(0)
    }

    pub fn is_non_negative(&self) -> bool {
        self.min_entry() >= 0
    }

    /// Lift every off-diagonal entry by the magnitude of the most negative
    /// one. The pair linearisation only has upper bounds, so a negative
    /// coefficient would let the solver leave a co-seated pair at 0.
    ///
    /// The diagonal is left untouched and stays zero. Every co-seated pair
    /// gains `shift` in the objective; with equal table sizes every plan has
    /// the same number of pairs, so the offset is constant.
    pub fn shift_non_negative(&self) -> Shifted {
        let worst = self.min_entry();
        if worst >= 0 {
            return Shifted {
                matrix: self.clone(),
                shift: 0,
            };
        }

        // Bounded by check_magnitude at construction.
        let shift = worst.abs();
        warn!("negative affinities present; shifting off-diagonal entries by {shift}");

        let relationships = self
            .relationships
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, &a)| if i == j { 0 } else { a + shift })
                    .collect()
            })
            .collect();
        debug!("shifted {} guests' affinities by {shift}", self.len());

        Shifted {
            matrix: Self { relationships },
            shift,
        }
    }
}

/// Every sum of entries the planner takes, before or after shifting, is
/// bounded by the total absolute value of the shifted or unshifted matrix.
/// Reject matrices where either total does not fit.
fn check_magnitude(relationships: &[Vec<i64>]) -> Result<(), MalformedInputError> {
    let worst = relationships.iter().flatten().copied().min().unwrap_or(0);
    let shift = if worst < 0 {
        worst
            .checked_abs()
            .ok_or(MalformedInputError::AffinityOverflow)?
    } else {
        0
    };

    let mut total: i64 = 0;
    let mut shifted_total: i64 = 0;
    for (i, row) in relationships.iter().enumerate() {
        for (j, &a) in row.iter().enumerate() {
            if i == j {
                continue;
            }
            let overflow = || MalformedInputError::AffinityOverflow;
            let magnitude = a.checked_abs().ok_or_else(overflow)?;
            total = total.checked_add(magnitude).ok_or_else(overflow)?;
            let shifted = a.checked_add(shift).ok_or_else(overflow)?;
            shifted_total = shifted_total.checked_add(shifted).ok_or_else(overflow)?;
        }
    }
    Ok(())
}

impl TryFrom<Vec<Vec<i64>>> for AffinityMatrix {
    type Error = MalformedInputError;

    fn try_from(relationships: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        Self::new(relationships)
    }
}

impl From<AffinityMatrix> for Vec<Vec<i64>> {
    fn from(matrix: AffinityMatrix) -> Self {
        matrix.relationships
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two groups of four who all like each other, strangers across groups.
    pub(crate) fn two_cliques() -> Vec<Vec<i64>> {
        vec![
            vec![0, 1, 1, 1, 0, 0, 0, 0],
            vec![1, 0, 1, 1, 0, 0, 0, 0],
            vec![1, 1, 0, 1, 0, 0, 0, 0],
            vec![1, 1, 1, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 1, 1, 1],
            vec![0, 0, 0, 0, 1, 0, 1, 1],
            vec![0, 0, 0, 0, 1, 1, 0, 1],
            vec![0, 0, 0, 0, 1, 1, 1, 0],
        ]
    }

    #[test]
    fn accepts_valid_matrix() {
        let matrix = AffinityMatrix::new(two_cliques()).unwrap();
        assert_eq!(matrix.len(), 8);
        assert_eq!(matrix.affinity(0, 3), 1);
        assert_eq!(matrix.affinity(0, 4), 0);
    }

    #[test]
    fn rejects_empty_matrix() {
        assert_eq!(AffinityMatrix::new(vec![]), Err(MalformedInputError::Empty));
    }

    #[test]
    fn rejects_ragged_matrix() {
        let err = AffinityMatrix::new(vec![vec![0, 1], vec![1]]).unwrap_err();
        assert_eq!(
            err,
            MalformedInputError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn rejects_asymmetric_matrix() {
        let err = AffinityMatrix::new(vec![vec![0, 1, 0], vec![1, 0, 2], vec![0, 3, 0]])
            .unwrap_err();
        assert_eq!(err, MalformedInputError::Asymmetric { i: 1, j: 2 });
    }

    #[test]
    fn rejects_non_zero_diagonal() {
        let err = AffinityMatrix::new(vec![vec![0, 1], vec![1, 5]]).unwrap_err();
        assert_eq!(
            err,
            MalformedInputError::NonZeroDiagonal { guest: 1, value: 5 }
        );
    }

    #[test]
    fn rejects_affinities_that_overflow() {
        let overflowing = [
            vec![vec![0, i64::MIN], vec![i64::MIN, 0]],
            vec![
                vec![0, i64::MAX, 0],
                vec![i64::MAX, 0, -1],
                vec![0, -1, 0],
            ],
            vec![
                vec![0, i64::MAX / 2, i64::MAX / 2],
                vec![i64::MAX / 2, 0, 0],
                vec![i64::MAX / 2, 0, 0],
            ],
        ];
        for relationships in overflowing {
            assert_eq!(
                AffinityMatrix::new(relationships),
                Err(MalformedInputError::AffinityOverflow)
            );
        }
    }

    #[test]
    fn large_affinities_within_range_are_kept() {
        let big = i64::MAX / 8;
        let matrix = AffinityMatrix::new(vec![
            vec![0, big, -big],
            vec![big, 0, 0],
            vec![-big, 0, 0],
        ])
        .unwrap();
        let shifted = matrix.shift_non_negative();
        assert_eq!(shifted.shift, big);
        assert_eq!(shifted.matrix.affinity(0, 1), 2 * big);
        assert_eq!(shifted.matrix.affinity(0, 2), 0);
    }

    #[test]
    fn shifting_non_negative_matrix_is_noop() {
        let matrix = AffinityMatrix::new(two_cliques()).unwrap();
        let shifted = matrix.shift_non_negative();
        assert_eq!(shifted.shift, 0);
        assert_eq!(shifted.matrix, matrix);
    }

    #[test]
    fn shift_lifts_negative_entries_and_keeps_diagonal_zero() {
        let negated = two_cliques()
            .into_iter()
            .map(|row| row.into_iter().map(|a| -a).collect())
            .collect();
        let matrix = AffinityMatrix::new(negated).unwrap();
        assert_eq!(matrix.min_entry(), -1);

        let shifted = matrix.shift_non_negative();
        assert_eq!(shifted.shift, 1);
        assert!(shifted.matrix.is_non_negative());
        for i in 0..8 {
            assert_eq!(shifted.matrix.affinity(i, i), 0);
            for j in 0..8 {
                if i != j {
                    assert!(matches!(shifted.matrix.affinity(i, j), 0 | 1));
                    assert_eq!(shifted.matrix.affinity(i, j), matrix.affinity(i, j) + 1);
                }
            }
        }

        // Shifted output is itself a valid matrix, and shifting it again is a no-op.
        assert!(AffinityMatrix::new(shifted.matrix.rows().to_vec()).is_ok());
        assert_eq!(shifted.matrix.shift_non_negative().shift, 0);
    }

    #[test]
    fn deserialises_through_validation() {
        let ok: AffinityMatrix = serde_json::from_str("[[0,2],[2,0]]").unwrap();
        assert_eq!(ok.affinity(1, 0), 2);
        assert!(serde_json::from_str::<AffinityMatrix>("[[0,2],[1,0]]").is_err());
    }
}
