//! Statistical analysis of a cleaned table.
//!
//! This module provides:
//! - Descriptive statistics per numeric column ([`DescriptiveStats`])
//! - Pairwise correlation with strong-pair detection ([`CorrelationAnalysis`])
//! - Distribution shape, normality and IQR outliers ([`DistributionSummary`])
//! - Categorical value frequencies ([`CategoricalSummary`])
//! - Ordered findings ([`Insight`])
//!
//! The analyzer is read-only: it never mutates the table it is given.

mod categorical;
mod correlation;
mod descriptive;
mod distribution;
mod insights;
pub mod normality;

pub use categorical::{CategoricalSummary, CategoryCount};
pub use correlation::{CorrelationAnalysis, CorrelationMatrix, StrongCorrelation};
pub use descriptive::DescriptiveStats;
pub use distribution::DistributionSummary;
pub use insights::{Insight, InsightKind};
pub use normality::{NormalityResult, NormalityTest};

use crate::config::AnalysisConfig;
use crate::error::{EdaError, Result};
use crate::types::ColumnTypeMap;
use crate::utils::{StorageKind, dtype_name, numeric_values, optional_numeric_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Everything the analyzer produces for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub descriptive: Vec<DescriptiveStats>,
    pub correlation: CorrelationAnalysis,
    pub distributions: Vec<DistributionSummary>,
    pub categorical: Vec<CategoricalSummary>,
    pub insights: Vec<Insight>,
}

/// Stateless facade over the analysis kernels.
#[derive(Debug, Clone, Default)]
pub struct StatisticalAnalyzer {
    config: AnalysisConfig,
}

impl StatisticalAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every analysis over the table and its column map.
    pub fn analyze(&self, df: &DataFrame, column_types: &ColumnTypeMap) -> Result<AnalysisBundle> {
        info!(
            "Analyzing {} rows x {} columns",
            df.height(),
            df.width()
        );

        let descriptive = self.descriptive_statistics(df)?;
        let correlation = self.correlation_analysis(df)?;

        let mut distributions = Vec::new();
        for name in column_types.numeric() {
            match self.distribution_analysis(df, name) {
                Ok(Some(summary)) => distributions.push(summary),
                Ok(None) => debug!("Too few values in '{}' for distribution analysis", name),
                Err(e) => warn!("Skipping distribution of '{}': {}", name, e),
            }
        }

        let mut categorical = Vec::new();
        for name in column_types.categorical() {
            categorical.push(self.categorical_analysis(df, name)?);
        }

        let insights = self.generate_insights(df, column_types)?;

        info!(
            "Analysis complete: {} numeric summaries, {} strong correlations, {} insights",
            descriptive.len(),
            correlation.strong_pairs.len(),
            insights.len()
        );

        Ok(AnalysisBundle {
            descriptive,
            correlation,
            distributions,
            categorical,
            insights,
        })
    }

    /// Summary statistics for every numeric-storage column with at least one value.
    pub fn descriptive_statistics(&self, df: &DataFrame) -> Result<Vec<DescriptiveStats>> {
        let mut stats = Vec::new();
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            if !StorageKind::of_series(series).is_numeric() {
                continue;
            }
            let values = numeric_values(series)?;
            if let Some(summary) = DescriptiveStats::from_values(series.name().as_str(), &values) {
                stats.push(summary);
            }
        }
        Ok(stats)
    }

    /// Pearson matrix over numeric-storage columns plus strong pairs.
    pub fn correlation_analysis(&self, df: &DataFrame) -> Result<CorrelationAnalysis> {
        let mut columns = Vec::new();
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            if StorageKind::of_series(series).is_numeric() {
                columns.push((series.name().to_string(), optional_numeric_values(series)?));
            }
        }

        let analysis =
            CorrelationAnalysis::from_columns(columns, self.config.strong_correlation_threshold);
        debug!(
            "Correlation over {} columns, {} strong pairs",
            analysis.matrix.len(),
            analysis.strong_pairs.len()
        );
        Ok(analysis)
    }

    /// Shape, normality and outliers of one numeric column.
    ///
    /// `Ok(None)` when the column has fewer than 3 present values.
    pub fn distribution_analysis(
        &self,
        df: &DataFrame,
        column: &str,
    ) -> Result<Option<DistributionSummary>> {
        let series = numeric_series(df, column)?;
        let values = numeric_values(series)?;
        Ok(DistributionSummary::from_values(
            column,
            &values,
            self.config.normality_alpha,
            self.config.large_sample_threshold,
        ))
    }

    /// Value frequencies of one column.
    pub fn categorical_analysis(&self, df: &DataFrame, column: &str) -> Result<CategoricalSummary> {
        Ok(CategoricalSummary::from_series(column_series(df, column)?)?)
    }

    /// Findings in a fixed order: per numeric column, then strong
    /// correlations, then dominant categories.
    pub fn generate_insights(&self, df: &DataFrame, column_types: &ColumnTypeMap) -> Result<Vec<Insight>> {
        let mut found = Vec::new();

        for name in column_types
            .numeric()
            .into_iter()
            .take(self.config.insight_numeric_limit)
        {
            match self.distribution_analysis(df, name) {
                Ok(Some(summary)) => {
                    found.extend(insights::distribution_insights(&summary, &self.config))
                }
                Ok(None) => {}
                Err(e) => warn!("No insights for '{}': {}", name, e),
            }
        }

        let correlation = self.correlation_analysis(df)?;
        found.extend(
            correlation
                .strong_pairs
                .iter()
                .take(self.config.insight_correlation_limit)
                .map(insights::correlation_insight),
        );

        for name in column_types
            .categorical()
            .into_iter()
            .take(self.config.insight_categorical_limit)
        {
            let summary = self.categorical_analysis(df, name)?;
            found.extend(insights::dominant_category_insight(&summary, &self.config));
        }

        debug!("Generated {} insights", found.len());
        Ok(found)
    }
}

pub(crate) fn column_series<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    Ok(df
        .column(column)
        .map_err(|_| EdaError::ColumnNotFound(column.to_string()))?
        .as_materialized_series())
}

pub(crate) fn numeric_series<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    let series = column_series(df, column)?;
    if !StorageKind::of_series(series).is_numeric() {
        return Err(EdaError::NotNumeric {
            column: column.to_string(),
            dtype: dtype_name(series.dtype()),
        });
    }
    Ok(series)
}
