//! Per-column descriptive statistics.

use crate::profiler::statistics::{
    IqrFences, mean, quantile_sorted, sample_kurtosis, sample_skewness, sample_std,
};
use crate::types::{Statistic, UndefinedReason};
use crate::utils::{round_to, sort_floats};
use serde::{Deserialize, Serialize};

/// Summary of one numeric column over its present values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Statistic,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Bias-corrected sample skewness.
    pub skewness: Statistic,
    /// Bias-corrected excess kurtosis.
    pub kurtosis: Statistic,
    /// Coefficient of variation in percent, 2 decimals.
    pub cv: Statistic,
}

impl DescriptiveStats {
    /// `None` when there are no present values.
    pub fn from_values(column: impl Into<String>, values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let mut sorted = values.to_vec();
        sort_floats(&mut sorted);
        let fences = IqrFences::from_sorted(&sorted);
        let std = sample_std(values);

        let cv = if std.is_defined() && mean == 0.0 {
            Statistic::undefined(UndefinedReason::ZeroMean)
        } else {
            std.map(|s| round_to(s / mean * 100.0, 2))
        };

        Some(Self {
            column: column.into(),
            count: values.len(),
            mean,
            std,
            min: sorted[0],
            q1: fences.q1,
            median: quantile_sorted(&sorted, 0.5),
            q3: fences.q3,
            max: sorted[sorted.len() - 1],
            skewness: sample_skewness(values),
            kurtosis: sample_kurtosis(values),
            cv,
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let stats = DescriptiveStats::from_values("x", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.range(), 4.0);
        let std = stats.std.value().unwrap();
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.cv.value(), Some(52.7));
        assert!(stats.skewness.value().unwrap().abs() < 1e-12);
        assert!((stats.kurtosis.value().unwrap() + 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::from_values("x", &[7.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.median, 7.0);
        assert_eq!(
            stats.std,
            Statistic::undefined(UndefinedReason::InsufficientData)
        );
        assert_eq!(stats.cv, stats.std);
        assert!(!stats.skewness.is_defined());
    }

    #[test]
    fn test_zero_mean_cv() {
        let stats = DescriptiveStats::from_values("x", &[-1.0, 1.0, -2.0, 2.0]).unwrap();
        assert_eq!(stats.cv, Statistic::undefined(UndefinedReason::ZeroMean));
    }

    #[test]
    fn test_empty_is_none() {
        assert!(DescriptiveStats::from_values("x", &[]).is_none());
    }
}
