//! Pairwise Pearson correlation over numeric columns.

use crate::profiler::statistics::pearson;
use crate::utils::round_to;
use serde::{Deserialize, Serialize};

/// Square, symmetric correlation matrix. Undefined cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Build from column names and their row-aligned values.
    pub fn compute(columns: Vec<(String, Vec<Option<f64>>)>) -> Self {
        let n = columns.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pearson(&columns[i].1, &columns[j].1);
                values[i][j] = r;
                values[j][i] = r;
            }
        }
        Self {
            columns: columns.into_iter().map(|(name, _)| name).collect(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// A column pair whose |r| exceeds the strong-correlation threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrongCorrelation {
    pub column_a: String,
    pub column_b: String,
    /// Rounded to 3 decimals.
    pub correlation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub matrix: CorrelationMatrix,
    pub strong_pairs: Vec<StrongCorrelation>,
}

impl CorrelationAnalysis {
    /// Fewer than two columns yields an empty analysis.
    pub fn from_columns(columns: Vec<(String, Vec<Option<f64>>)>, threshold: f64) -> Self {
        if columns.len() < 2 {
            return Self::default();
        }

        let matrix = CorrelationMatrix::compute(columns);
        let mut strong_pairs = Vec::new();
        for i in 0..matrix.len() {
            for j in (i + 1)..matrix.len() {
                if let Some(r) = matrix.values[i][j].filter(|r| r.abs() > threshold) {
                    strong_pairs.push(StrongCorrelation {
                        column_a: matrix.columns[i].clone(),
                        column_b: matrix.columns[j].clone(),
                        correlation: round_to(r, 3),
                    });
                }
            }
        }

        Self {
            matrix,
            strong_pairs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: &[f64]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.iter().map(|v| Some(*v)).collect())
    }

    #[test]
    fn test_perfect_correlation() {
        let analysis = CorrelationAnalysis::from_columns(
            vec![
                col("x", &[1.0, 2.0, 3.0, 4.0, 5.0]),
                col("y", &[2.0, 4.0, 6.0, 8.0, 10.0]),
            ],
            0.7,
        );
        assert_eq!(analysis.strong_pairs.len(), 1);
        assert_eq!(analysis.strong_pairs[0].column_a, "x");
        assert_eq!(analysis.strong_pairs[0].column_b, "y");
        assert_eq!(analysis.strong_pairs[0].correlation, 1.0);
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let analysis = CorrelationAnalysis::from_columns(
            vec![
                col("a", &[1.0, 3.0, 2.0, 5.0, 4.0]),
                col("b", &[2.0, 1.0, 4.0, 3.0, 6.0]),
                col("c", &[9.0, 7.0, 8.0, 5.0, 6.0]),
            ],
            0.7,
        );
        let m = &analysis.matrix;
        for i in 0..m.len() {
            for j in 0..m.len() {
                assert_eq!(m.values[i][j], m.values[j][i]);
            }
            assert!((m.values[i][i].unwrap() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_negative_strong_pair() {
        let analysis = CorrelationAnalysis::from_columns(
            vec![col("a", &[1.0, 2.0, 3.0]), col("b", &[3.0, 2.0, 1.0])],
            0.7,
        );
        assert_eq!(analysis.strong_pairs[0].correlation, -1.0);
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let analysis = CorrelationAnalysis::from_columns(
            vec![col("a", &[1.0, 2.0, 3.0]), col("k", &[4.0, 4.0, 4.0])],
            0.7,
        );
        assert_eq!(analysis.matrix.get("a", "k"), None);
        assert!(analysis.strong_pairs.is_empty());
    }

    #[test]
    fn test_pairwise_complete_observations() {
        let analysis = CorrelationAnalysis::from_columns(
            vec![
                ("a".to_string(), vec![Some(1.0), Some(2.0), None, Some(4.0)]),
                ("b".to_string(), vec![Some(2.0), Some(4.0), Some(100.0), Some(8.0)]),
            ],
            0.7,
        );
        assert!((analysis.matrix.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_column_is_empty() {
        let analysis = CorrelationAnalysis::from_columns(vec![col("a", &[1.0, 2.0])], 0.7);
        assert!(analysis.matrix.is_empty());
        assert!(analysis.strong_pairs.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        // |r| = 1 is never above a threshold of 1
        let analysis = CorrelationAnalysis::from_columns(
            vec![col("a", &[1.0, 2.0, 3.0]), col("b", &[1.0, 2.0, 3.0])],
            1.0,
        );
        assert!(analysis.strong_pairs.is_empty());
    }
}
