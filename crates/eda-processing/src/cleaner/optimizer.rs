//! Storage narrowing to reduce the memory footprint of a cleaned table.
//!
//! Narrowed floats are single precision, so their values are approximate.
//! Float columns holding values beyond the `f32` range stay double precision.

use crate::error::Result;
use crate::types::{OptimizationReport, TypeConversion};
use crate::utils::{distinct_count, dtype_name, round_to};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Narrows integer, float and low-cardinality string columns.
#[derive(Debug, Clone)]
pub struct TypeNarrower {
    categorical_narrowing_ratio: f64,
}

impl TypeNarrower {
    pub fn new(categorical_narrowing_ratio: f64) -> Self {
        Self {
            categorical_narrowing_ratio,
        }
    }

    /// Narrow every eligible column. Memory is measured around this step only.
    pub fn narrow(&self, mut df: DataFrame) -> Result<(DataFrame, OptimizationReport)> {
        let memory_before = df.estimated_size();
        let mut conversions = Vec::new();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        for name in names {
            let series = df.column(&name)?.as_materialized_series().clone();
            let Some(target) = self.target_dtype(&series) else {
                continue;
            };

            match series.cast(&target) {
                Ok(narrowed) => {
                    debug!("Narrowed '{}' from {} to {}", name, series.dtype(), target);
                    conversions.push(TypeConversion {
                        column: name.clone(),
                        from: dtype_name(series.dtype()),
                        to: dtype_name(&target),
                    });
                    df.replace(&name, narrowed)?;
                }
                Err(e) => {
                    warn!("Keeping '{}' as {}: cast to {} failed: {}", name, series.dtype(), target, e);
                }
            }
        }

        let memory_after = df.estimated_size();
        let memory_saved = memory_before as i64 - memory_after as i64;
        let saved_percentage = if memory_before > 0 {
            round_to(memory_saved as f64 / memory_before as f64 * 100.0, 2)
        } else {
            0.0
        };

        info!(
            "Narrowed {} columns: {} -> {} bytes ({}% saved)",
            conversions.len(),
            memory_before,
            memory_after,
            saved_percentage
        );

        Ok((
            df,
            OptimizationReport {
                memory_before,
                memory_after,
                memory_saved,
                saved_percentage,
                conversions,
            },
        ))
    }

    /// The narrower dtype for a column, if any.
    pub fn target_dtype(&self, series: &Series) -> Option<DataType> {
        match series.dtype() {
            DataType::Int64 | DataType::Int32 | DataType::Int16 => {
                let (min, max) = integer_bounds(series)?;
                let target = smallest_int_dtype(min, max)?;
                (int_width(&target) < int_width(series.dtype())).then_some(target)
            }
            DataType::Float64 => fits_f32(series).then_some(DataType::Float32),
            DataType::String => {
                let total = series.len();
                if total == 0 {
                    return None;
                }
                let distinct = distinct_count(series).ok()?;
                let ratio = distinct as f64 / total as f64;
                (ratio < self.categorical_narrowing_ratio)
                    .then(|| DataType::from_categories(Categories::global()))
            }
            _ => None,
        }
    }
}

fn integer_bounds(series: &Series) -> Option<(i64, i64)> {
    let casted = series.cast(&DataType::Int64).ok()?;
    let values = casted.i64().ok()?;
    let mut bounds: Option<(i64, i64)> = None;
    for v in values.into_iter().flatten() {
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }
    bounds
}

/// Whether every finite value survives a cast to single precision without
/// overflowing to infinity.
fn fits_f32(series: &Series) -> bool {
    let Ok(values) = series.f64() else {
        return false;
    };
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .all(|v| v.abs() <= f32::MAX as f64)
}

/// Smallest signed width whose range strictly contains `[min, max]`.
pub fn smallest_int_dtype(min: i64, max: i64) -> Option<DataType> {
    if min > i8::MIN as i64 && max < i8::MAX as i64 {
        Some(DataType::Int8)
    } else if min > i16::MIN as i64 && max < i16::MAX as i64 {
        Some(DataType::Int16)
    } else if min > i32::MIN as i64 && max < i32::MAX as i64 {
        Some(DataType::Int32)
    } else {
        None
    }
}

fn int_width(dtype: &DataType) -> u8 {
    match dtype {
        DataType::Int8 => 8,
        DataType::Int16 => 16,
        DataType::Int32 => 32,
        _ => 64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_int_dtype_strict_bounds() {
        assert_eq!(smallest_int_dtype(0, 100), Some(DataType::Int8));
        assert_eq!(smallest_int_dtype(-127, 126), Some(DataType::Int8));
        assert_eq!(smallest_int_dtype(0, 127), Some(DataType::Int16));
        assert_eq!(smallest_int_dtype(-128, 0), Some(DataType::Int16));
        assert_eq!(smallest_int_dtype(0, 40_000), Some(DataType::Int32));
        assert_eq!(smallest_int_dtype(0, i64::from(i32::MAX)), None);
    }

    #[test]
    fn test_narrow_numeric_columns() {
        let df = df![
            "small" => [1i64, 2, 3, 100],
            "medium" => [1i64, 2, 3, 1000],
            "price" => [1.5, 2.5, 3.5, 4.5],
        ]
        .unwrap();

        let (narrowed, report) = TypeNarrower::new(0.5).narrow(df).unwrap();
        assert_eq!(narrowed.column("small").unwrap().dtype(), &DataType::Int8);
        assert_eq!(narrowed.column("medium").unwrap().dtype(), &DataType::Int16);
        assert_eq!(narrowed.column("price").unwrap().dtype(), &DataType::Float32);
        assert_eq!(report.conversions.len(), 3);
        assert!(report.memory_after < report.memory_before);
        assert!(report.saved_percentage > 0.0);
    }

    #[test]
    fn test_out_of_range_floats_stay_double() {
        let df = df![
            "huge" => [1.0, 1e300, 2.0],
            "regular" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let (narrowed, report) = TypeNarrower::new(0.5).narrow(df).unwrap();
        let huge = narrowed.column("huge").unwrap();
        assert_eq!(huge.dtype(), &DataType::Float64);
        assert_eq!(huge.f64().unwrap().get(1), Some(1e300));
        assert_eq!(narrowed.column("regular").unwrap().dtype(), &DataType::Float32);
        assert_eq!(report.conversions.len(), 1);
        assert_eq!(report.conversions[0].column, "regular");
    }

    #[test]
    fn test_low_cardinality_strings_become_categorical() {
        let cities: Vec<&str> = (0..100)
            .map(|i| ["Tashkent", "Samarkand", "Bukhara"][i % 3])
            .collect();
        let notes: Vec<String> = (0..100).map(|i| format!("note {}", i)).collect();
        let df = df![
            "city" => cities,
            "note" => notes,
        ]
        .unwrap();

        let (narrowed, report) = TypeNarrower::new(0.5).narrow(df).unwrap();
        assert!(matches!(
            narrowed.column("city").unwrap().dtype(),
            DataType::Categorical(_, _)
        ));
        assert_eq!(narrowed.column("note").unwrap().dtype(), &DataType::String);
        assert_eq!(report.conversions.len(), 1);
        assert_eq!(report.conversions[0].to, "categorical");
    }

    #[test]
    fn test_categorical_preserves_values() {
        let df = df!["c" => ["b", "a", "b", "b", "a", "a"]].unwrap();
        let (narrowed, _) = TypeNarrower::new(0.5).narrow(df.clone()).unwrap();
        let original = crate::utils::string_values(df.column("c").unwrap().as_materialized_series()).unwrap();
        let encoded =
            crate::utils::string_values(narrowed.column("c").unwrap().as_materialized_series()).unwrap();
        assert_eq!(original, encoded);
    }

    #[test]
    fn test_already_narrow_is_untouched() {
        let df = df!["x" => [1i8, 2, 3]].unwrap();
        let (_, report) = TypeNarrower::new(0.5).narrow(df).unwrap();
        assert!(report.conversions.is_empty());
        assert_eq!(report.memory_saved, 0);
    }

    #[test]
    fn test_empty_table() {
        let df = df!["x" => Vec::<i64>::new()].unwrap();
        let (narrowed, report) = TypeNarrower::new(0.5).narrow(df).unwrap();
        assert_eq!(narrowed.height(), 0);
        assert_eq!(narrowed.column("x").unwrap().dtype(), &DataType::Int64);
        assert_eq!(report.saved_percentage, 0.0);
    }
}
