//! Shape, normality and outliers of a single numeric column.

use super::normality::{NormalityResult, test_normality};
use crate::profiler::statistics::{IqrFences, population_kurtosis, population_skewness};
use crate::types::Statistic;
use crate::utils::{percentage, round_to, sort_floats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub column: String,
    pub sample_size: usize,
    /// Population skewness, 3 decimals.
    pub skewness: Statistic,
    /// Population excess kurtosis, 3 decimals.
    pub kurtosis: Statistic,
    pub normality: NormalityResult,
    pub outlier_count: usize,
    /// Share of present values outside the IQR fences, 2 decimals.
    pub outlier_percentage: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

impl DistributionSummary {
    /// `None` with fewer than 3 present values.
    pub fn from_values(
        column: impl Into<String>,
        values: &[f64],
        alpha: f64,
        large_sample_threshold: usize,
    ) -> Option<Self> {
        if values.len() < 3 {
            return None;
        }

        let mut sorted = values.to_vec();
        sort_floats(&mut sorted);
        let fences = IqrFences::from_sorted(&sorted);
        let outlier_count = fences.count_outliers(&sorted);

        let skewness = population_skewness(values).map(|v| round_to(v, 3));
        let kurtosis = population_kurtosis(values).map(|v| round_to(v, 3));
        let mut normality = test_normality(values, alpha, large_sample_threshold);
        if !skewness.is_defined() {
            normality.is_normal = false;
        }

        Some(Self {
            column: column.into(),
            sample_size: values.len(),
            skewness,
            kurtosis,
            normality,
            outlier_count,
            outlier_percentage: round_to(percentage(outlier_count, values.len()), 2),
            q1: fences.q1,
            q3: fences.q3,
            iqr: fences.iqr,
            lower_fence: fences.lower,
            upper_fence: fences.upper,
        })
    }

    /// Values of `values` lying outside this summary's fences, in input order.
    pub fn outliers_in(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .copied()
            .filter(|v| *v < self.lower_fence || *v > self.upper_fence)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UndefinedReason;

    #[test]
    fn test_single_outlier_flagged() {
        let values = [10.0, 12.0, 11.0, 13.0, 10.0, 1000.0];
        let summary = DistributionSummary::from_values("age", &values, 0.05, 5000).unwrap();
        assert_eq!(summary.outlier_count, 1);
        assert_eq!(summary.outliers_in(&values), vec![1000.0]);
        assert_eq!(summary.outlier_percentage, 16.67);
        assert_eq!(summary.q1, 10.25);
        assert_eq!(summary.q3, 12.75);
        assert!(summary.skewness.value().unwrap() > 1.0);
        assert!(!summary.normality.is_normal);
    }

    #[test]
    fn test_fence_values_are_not_outliers() {
        // q1 = 2, q3 = 4, fences at -1 and 7
        let values = [-1.0, 2.0, 3.0, 4.0, 7.0];
        let summary = DistributionSummary::from_values("x", &values, 0.05, 5000).unwrap();
        assert_eq!(summary.lower_fence, -1.0);
        assert_eq!(summary.upper_fence, 7.0);
        assert_eq!(summary.outlier_count, 0);
    }

    #[test]
    fn test_too_few_values() {
        assert!(DistributionSummary::from_values("x", &[1.0, 2.0], 0.05, 5000).is_none());
    }

    #[test]
    fn test_constant_column() {
        let summary = DistributionSummary::from_values("x", &[4.0; 8], 0.05, 5000).unwrap();
        assert_eq!(
            summary.skewness,
            Statistic::undefined(UndefinedReason::ZeroVariance)
        );
        assert_eq!(
            summary.kurtosis,
            Statistic::undefined(UndefinedReason::ZeroVariance)
        );
        assert!(!summary.normality.is_normal);
        assert_eq!(summary.outlier_count, 0);
    }

    #[test]
    fn test_symmetric_sample_is_normal() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let summary = DistributionSummary::from_values("x", &values, 0.05, 5000).unwrap();
        assert_eq!(summary.skewness.value(), Some(0.0));
        assert!(summary.normality.is_normal);
        assert_eq!(summary.sample_size, 10);
    }
}
