//! Automatic cleaning of a table.
//!
//! Steps run in a fixed order, each on the output of the previous one:
//! 1. Profile the input
//! 2. Impute missing values (NaN in float columns counts as missing)
//! 3. Remove duplicate rows (the only step that changes row count)
//! 4. Narrow storage types
//! 5. Reclassify columns
//! 6. Assemble the [`CleaningReport`]
//!
//! Cleaning is best-effort: a column that cannot be filled or narrowed is
//! kept as it was and a warning is logged.

mod optimizer;

pub use optimizer::{TypeNarrower, smallest_int_dtype};

use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::profiler::{ColumnClassifier, QualityProfiler};
use crate::types::{CleaningReport, ImputationRecord, QualityReport};
use crate::utils::nan_to_null_frame;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Data cleaner for automatic dataset cleaning operations.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    config: AnalysisConfig,
}

impl DataCleaner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Clean a table, returning the cleaned copy and its report.
    ///
    /// The input is left untouched so the original and cleaned tables can be
    /// compared side by side.
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        info!("Step 1: Profiling input table");
        let quality_before = QualityProfiler::profile(df).context("Profiling input table")?;
        self.clean_profiled(df, quality_before)
    }

    /// Steps 2-6 of [`clean`](Self::clean), given the input's quality snapshot.
    pub fn clean_profiled(
        &self,
        df: &DataFrame,
        quality_before: QualityReport,
    ) -> Result<(DataFrame, CleaningReport)> {
        info!("Step 2: Imputing missing values");
        let normalized = nan_to_null_frame(df).context("Normalizing NaN values")?;
        let (imputed, imputations) = self.impute_missing(normalized);

        info!("Step 3: Removing duplicate rows");
        let rows_before = imputed.height();
        let deduplicated = Self::remove_duplicates(imputed).context("Removing duplicate rows")?;
        let duplicates_removed = rows_before - deduplicated.height();
        if duplicates_removed > 0 {
            info!("Removed {} duplicate rows", duplicates_removed);
        } else {
            debug!("No duplicate rows found");
        }

        info!("Step 4: Narrowing storage types");
        let (cleaned, optimization) = TypeNarrower::new(self.config.categorical_narrowing_ratio)
            .narrow(deduplicated)
            .context("Narrowing storage types")?;

        info!("Step 5: Reclassifying columns");
        let column_types = ColumnClassifier::from_config(&self.config).classify(&cleaned);

        info!("Step 6: Assembling cleaning report");
        let quality_after = QualityProfiler::profile(&cleaned).context("Profiling cleaned table")?;
        let final_shape = (cleaned.height(), cleaned.width());

        info!(
            "Cleaning complete: {} -> {} rows, {} columns imputed, {} bytes saved",
            quality_before.total_rows,
            final_shape.0,
            imputations.len(),
            optimization.memory_saved
        );

        Ok((
            cleaned,
            CleaningReport {
                quality_before,
                quality_after,
                imputations,
                duplicates_removed,
                optimization,
                column_types,
                final_shape,
            },
        ))
    }

    /// Fill every column that has missing values. Never changes row count.
    pub fn impute_missing(&self, mut df: DataFrame) -> (DataFrame, Vec<ImputationRecord>) {
        let mut records = Vec::new();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        for name in names {
            let series = match df.column(&name) {
                Ok(column) => column.as_materialized_series().clone(),
                Err(e) => {
                    warn!("Skipping imputation of '{}': {}", name, e);
                    continue;
                }
            };

            match StatisticalImputer::impute(&series, &self.config.missing_sentinel) {
                Ok(Some((filled, record))) => match df.replace(&name, filled) {
                    Ok(_) => records.push(record),
                    Err(e) => warn!("Could not replace '{}' after imputation: {}", name, e),
                },
                Ok(None) => {}
                Err(e) => warn!("Imputation of '{}' failed, keeping column as-is: {}", name, e),
            }
        }

        (df, records)
    }

    /// Drop rows identical across every column, keeping first occurrences in order.
    pub fn remove_duplicates(df: DataFrame) -> Result<DataFrame> {
        if df.height() < 2 || df.width() == 0 {
            return Ok(df);
        }
        Ok(df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?)
    }
}
