//! Statistical imputation methods.
//!
//! Median for numeric storage, mode for everything else, and a sentinel
//! string when a column has no present value to learn from.

use crate::profiler::statistics::median;
use crate::types::{ImputationRecord, ImputationStrategy};
use crate::utils::{
    StorageKind, constant_string_series, fill_boolean_nulls, fill_numeric_nulls,
    fill_string_nulls, fill_temporal_nulls, nan_to_null, numeric_values, string_mode,
};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing values of one column.
    ///
    /// NaN in float storage is filled like a null. Returns `None` when the
    /// column has nothing to fill. The returned series always has the input
    /// length and no missing values.
    pub fn impute(series: &Series, sentinel: &str) -> PolarsResult<Option<(Series, ImputationRecord)>> {
        let series = &nan_to_null(series)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        if missing == series.len() {
            return Ok(Some(Self::apply_sentinel(series, sentinel, missing)));
        }

        let filled = match StorageKind::of_series(series) {
            StorageKind::Integer | StorageKind::Float => Self::apply_numeric_median(series)?,
            StorageKind::Boolean => Self::apply_boolean_mode(series)?,
            StorageKind::Temporal => Self::apply_temporal_mode(series)?,
            StorageKind::Text | StorageKind::Other => Self::apply_mode_imputation(series)?,
        };

        Ok(Some(match filled {
            Some((filled, strategy, fill_value)) => {
                debug!(
                    "Filled {} missing values in '{}' with {:?} '{}'",
                    missing,
                    series.name(),
                    strategy,
                    fill_value
                );
                (
                    filled,
                    ImputationRecord {
                        column: series.name().to_string(),
                        strategy,
                        fill_value,
                        filled: missing,
                    },
                )
            }
            None => Self::apply_sentinel(series, sentinel, missing),
        }))
    }

    /// Median of present values; integer columns are widened to Float64.
    fn apply_numeric_median(
        series: &Series,
    ) -> PolarsResult<Option<(Series, ImputationStrategy, String)>> {
        let values = numeric_values(series)?;
        let Some(median_val) = median(&values) else {
            return Ok(None);
        };
        let filled = fill_numeric_nulls(series, median_val)?;
        Ok(Some((
            filled,
            ImputationStrategy::Median,
            median_val.to_string(),
        )))
    }

    /// Most frequent value, ties to the smallest.
    fn apply_mode_imputation(
        series: &Series,
    ) -> PolarsResult<Option<(Series, ImputationStrategy, String)>> {
        let Some(mode_val) = string_mode(series) else {
            return Ok(None);
        };
        let filled = fill_string_nulls(series, &mode_val)?;
        let filled = if filled.dtype() != series.dtype() {
            // keep dictionary encoding when the input had it
            filled.cast(series.dtype()).unwrap_or(filled)
        } else {
            filled
        };
        Ok(Some((filled, ImputationStrategy::Mode, mode_val)))
    }

    /// Majority value; a tie resolves to `false`.
    fn apply_boolean_mode(
        series: &Series,
    ) -> PolarsResult<Option<(Series, ImputationStrategy, String)>> {
        let ca = series.bool()?;
        let trues = ca.into_iter().flatten().filter(|v| *v).count();
        let falses = ca.into_iter().flatten().filter(|v| !*v).count();
        if trues + falses == 0 {
            return Ok(None);
        }
        let mode_val = trues > falses;
        let filled = fill_boolean_nulls(series, mode_val)?;
        Ok(Some((filled, ImputationStrategy::Mode, mode_val.to_string())))
    }

    /// Most frequent physical value, ties to the earliest.
    fn apply_temporal_mode(
        series: &Series,
    ) -> PolarsResult<Option<(Series, ImputationStrategy, String)>> {
        let physical = series.to_physical_repr().cast(&DataType::Int64)?;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for value in physical.i64()?.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }

        let Some((mode_val, _)) = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        else {
            return Ok(None);
        };

        let filled = fill_temporal_nulls(series, mode_val)?;
        let display = Series::new("".into(), [mode_val])
            .cast(series.dtype())
            .ok()
            .and_then(|s| s.get(0).ok().map(|v| v.to_string()))
            .unwrap_or_else(|| mode_val.to_string());
        Ok(Some((filled, ImputationStrategy::Mode, display)))
    }

    /// Replace the whole column with the sentinel string.
    fn apply_sentinel(series: &Series, sentinel: &str, missing: usize) -> (Series, ImputationRecord) {
        debug!(
            "Column '{}' has no usable values, filling with '{}'",
            series.name(),
            sentinel
        );
        let filled = constant_string_series(series.name().clone(), sentinel, series.len());
        (
            filled,
            ImputationRecord {
                column: series.name().to_string(),
                strategy: ImputationStrategy::Sentinel,
                fill_value: sentinel.to_string(),
                filled: missing,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::string_values;

    #[test]
    fn test_no_missing_returns_none() {
        let series = Series::new("x".into(), &[1.0, 2.0]);
        assert!(StatisticalImputer::impute(&series, "Unknown").unwrap().is_none());
    }

    #[test]
    fn test_numeric_median() {
        let series = Series::new(
            "x".into(),
            &[
                Some(1i64),
                Some(2),
                Some(3),
                Some(4),
                None,
                Some(5),
                Some(6),
                Some(7),
                Some(8),
            ],
        );
        let (filled, record) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();

        assert_eq!(filled.len(), 9);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.f64().unwrap().get(4), Some(4.5));
        assert_eq!(record.strategy, ImputationStrategy::Median);
        assert_eq!(record.filled, 1);
    }

    #[test]
    fn test_nan_is_filled_with_median() {
        let series = Series::new(
            "x".into(),
            &[Some(1.0), Some(f64::NAN), None, Some(4.0), Some(5.0)],
        );
        let (filled, record) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();

        assert_eq!(record.filled, 2);
        assert_eq!(record.fill_value, "4");
        let values: Vec<f64> = filled.f64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![1.0, 4.0, 4.0, 4.0, 5.0]);
    }

    #[test]
    fn test_all_nan_uses_sentinel() {
        let series = Series::new("x".into(), &[f64::NAN, f64::NAN]);
        let (filled, record) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();
        assert_eq!(record.strategy, ImputationStrategy::Sentinel);
        assert_eq!(filled.dtype(), &DataType::String);
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("c".into(), &[Some("a"), None, Some("b"), Some("b")]);
        let (filled, record) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();

        assert_eq!(
            string_values(&filled).unwrap(),
            vec!["a", "b", "b", "b"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(record.strategy, ImputationStrategy::Mode);
        assert_eq!(record.fill_value, "b");
    }

    #[test]
    fn test_all_missing_uses_sentinel() {
        let series = Series::new("c".into(), &[None::<&str>, None, None]);
        let (filled, record) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.len(), 3);
        assert!(string_values(&filled).unwrap().iter().all(|v| v == "Unknown"));
        assert_eq!(record.strategy, ImputationStrategy::Sentinel);
    }

    #[test]
    fn test_all_missing_numeric_uses_sentinel() {
        let series = Series::new("x".into(), &[None::<f64>, None]);
        let (filled, _) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();
        assert_eq!(filled.dtype(), &DataType::String);
        assert_eq!(filled.null_count(), 0);
    }

    #[test]
    fn test_boolean_mode() {
        let series = Series::new("b".into(), &[Some(true), None, Some(true), Some(false)]);
        let (filled, _) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();
        assert_eq!(filled.bool().unwrap().get(1), Some(true));
    }

    #[test]
    fn test_temporal_mode_keeps_dtype() {
        let series = Series::new("d".into(), &[Some(10i32), None, Some(10), Some(20)])
            .cast(&DataType::Date)
            .unwrap();
        let (filled, record) = StatisticalImputer::impute(&series, "Unknown")
            .unwrap()
            .unwrap();
        assert_eq!(filled.dtype(), &DataType::Date);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(record.strategy, ImputationStrategy::Mode);
    }
}
