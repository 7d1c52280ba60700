//! Data profiling module.
//!
//! This module provides:
//! - Column type classification ([`ColumnClassifier`])
//! - Data quality snapshots ([`QualityProfiler`])
//! - Numeric kernels shared with the analyzer ([`statistics`])

pub mod statistics;
mod type_inference;

use crate::error::Result;
use crate::types::{MissingValueInfo, QualityReport};
use crate::utils::{distinct_count, dtype_name, missing_count, percentage, round_to};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use type_inference::{ColumnClassifier, parses_as_temporal};

/// Per-column overview used by previews and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
}

/// Observational profiler for table quality. Never mutates its input.
pub struct QualityProfiler;

impl QualityProfiler {
    /// Build a [`QualityReport`] snapshot of the table.
    ///
    /// NaN in float columns is counted as missing.
    pub fn profile(df: &DataFrame) -> Result<QualityReport> {
        let total_rows = df.height();
        let mut missing_values = Vec::new();

        for column in df.get_columns() {
            let null_count = missing_count(column.as_materialized_series());
            if null_count > 0 {
                debug!("Column '{}' has {} missing values", column.name(), null_count);
                missing_values.push(MissingValueInfo {
                    column: column.name().to_string(),
                    count: null_count,
                    percentage: round_to(percentage(null_count, total_rows), 2),
                });
            }
        }

        let duplicate_rows = Self::count_duplicates(df)?;
        let memory_bytes = df.estimated_size();

        info!(
            "Profiled {} rows x {} columns: {} columns with missing values, {} duplicate rows, {} bytes",
            total_rows,
            df.width(),
            missing_values.len(),
            duplicate_rows,
            memory_bytes
        );

        Ok(QualityReport {
            total_rows,
            total_columns: df.width(),
            missing_values,
            duplicate_rows,
            memory_bytes,
        })
    }

    /// Rows that exactly repeat an earlier row across all columns.
    pub fn count_duplicates(df: &DataFrame) -> Result<usize> {
        if df.height() < 2 || df.width() == 0 {
            return Ok(0);
        }
        let unique_rows = df
            .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
            .height();
        Ok(df.height() - unique_rows)
    }

    /// Column overview: dtype, present/missing counts and distinct values.
    pub fn column_info(df: &DataFrame) -> Result<Vec<ColumnInfo>> {
        let total_rows = df.height();
        df.get_columns()
            .iter()
            .map(|column| {
                let series = column.as_materialized_series();
                let null_count = missing_count(series);
                Ok(ColumnInfo {
                    name: series.name().to_string(),
                    dtype: dtype_name(series.dtype()),
                    non_null: series.len() - null_count,
                    null_count,
                    null_percentage: round_to(percentage(null_count, total_rows), 2),
                    unique_count: distinct_count(series)?,
                })
            })
            .collect()
    }
}
