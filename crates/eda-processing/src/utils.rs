//! Shared utilities for classification, cleaning and analysis.
//!
//! Storage dispatch goes through [`StorageKind`] so that no stage probes
//! polars dtypes on its own.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Storage Kind
// =============================================================================

/// Physical storage of a column, independent of its semantic [`crate::ColumnKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Signed or unsigned integers
    Integer,
    /// Floating point numbers
    Float,
    /// Plain or dictionary-encoded strings
    Text,
    /// Boolean values
    Boolean,
    /// Date, datetime, time or duration
    Temporal,
    /// Nested, binary or null-typed columns
    Other,
}

impl StorageKind {
    pub fn of(dtype: &DataType) -> Self {
        if is_integer_dtype(dtype) {
            Self::Integer
        } else if matches!(dtype, DataType::Float32 | DataType::Float64) {
            Self::Float
        } else if matches!(
            dtype,
            DataType::String | DataType::Categorical(_, _) | DataType::Enum(_, _)
        ) {
            Self::Text
        } else if matches!(dtype, DataType::Boolean) {
            Self::Boolean
        } else if is_temporal_dtype(dtype) {
            Self::Temporal
        } else {
            Self::Other
        }
    }

    pub fn of_series(series: &Series) -> Self {
        Self::of(series.dtype())
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    StorageKind::of(dtype).is_numeric()
}

#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Short display name of a dtype for reports.
pub fn dtype_name(dtype: &DataType) -> String {
    match dtype {
        DataType::Categorical(_, _) => "categorical".to_string(),
        DataType::Enum(_, _) => "enum".to_string(),
        other => format!("{}", other),
    }
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Percentage of `part` in `total`, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Present values of a numeric Series as f64, in row order.
///
/// NaN values are treated as missing.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// All values of a numeric Series as f64, keeping missing positions.
pub fn optional_numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Missing cells in a Series: nulls plus NaN in float storage.
pub fn missing_count(series: &Series) -> usize {
    let nan_count = match series.dtype() {
        DataType::Float64 => series
            .f64()
            .map(|ca| ca.into_iter().flatten().filter(|v| v.is_nan()).count())
            .unwrap_or(0),
        DataType::Float32 => series
            .f32()
            .map(|ca| ca.into_iter().flatten().filter(|v| v.is_nan()).count())
            .unwrap_or(0),
        _ => 0,
    };
    series.null_count() + nan_count
}

/// Replace NaN with null in float storage. Other dtypes are returned unchanged.
pub fn nan_to_null(series: &Series) -> PolarsResult<Series> {
    match series.dtype() {
        DataType::Float64 => {
            let values: Vec<Option<f64>> = series
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(Series::new(series.name().clone(), values))
        }
        DataType::Float32 => {
            let values: Vec<Option<f32>> = series
                .f32()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(Series::new(series.name().clone(), values))
        }
        _ => Ok(series.clone()),
    }
}

/// [`nan_to_null`] applied to every column of a table.
pub fn nan_to_null_frame(df: &DataFrame) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| nan_to_null(column.as_materialized_series()).map(Column::from))
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

/// Sort a slice of floats ascending.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Present values of a Series rendered as strings, in row order.
pub fn string_values(series: &Series) -> PolarsResult<Vec<String>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .flatten()
        .map(|value| value.to_string())
        .collect())
}

/// Value frequencies ordered by count descending, ties by value ascending.
pub fn value_frequencies(series: &Series) -> PolarsResult<Vec<(String, usize)>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in string_values(series)? {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(entries)
}

/// Calculate the mode (most frequent value) of a Series as a string.
///
/// Ties resolve to the smallest value so the result is deterministic.
pub fn string_mode(series: &Series) -> Option<String> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return None;
    }

    value_frequencies(&non_null)
        .ok()
        .and_then(|entries| entries.into_iter().next())
        .map(|(value, _)| value)
}

/// Number of distinct present values.
pub fn distinct_count(series: &Series) -> PolarsResult<usize> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(0);
    }
    non_null.n_unique()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null and NaN values in a numeric Series with a specific value (result is Float64).
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values: Vec<Option<f64>> = series
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| Some(v.filter(|x| !x.is_nan()).unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let casted = series.cast(&DataType::String)?;
    let values: Vec<Option<String>> = casted
        .str()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a boolean Series with a specific value.
pub fn fill_boolean_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let values: Vec<Option<bool>> = series
        .bool()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a temporal Series with a physical (integer) value,
/// keeping the original dtype.
pub fn fill_temporal_nulls(series: &Series, physical_fill: i64) -> PolarsResult<Series> {
    let values: Vec<Option<i64>> = series
        .to_physical_repr()
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(physical_fill)))
        .collect();

    Series::new(series.name().clone(), values).cast(series.dtype())
}

/// A column of `len` copies of `value`.
pub fn constant_string_series(name: PlSmallStr, value: &str, len: usize) -> Series {
    Series::new(name, vec![value.to_string(); len])
}

// =============================================================================
// Tests
// =============================================================================
