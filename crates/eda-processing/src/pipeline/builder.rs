//! Main EDA pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for running
//! clean, analyze and visualize over one table.

use crate::analysis::{AnalysisBundle, StatisticalAnalyzer};
use crate::cleaner::DataCleaner;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{Result, ResultExt};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::QualityProfiler;
use crate::types::CleaningReport;
use crate::visualization::{ChartSelector, ChartSpec};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct EdaOutcome {
    pub cleaned: DataFrame,
    pub report: CleaningReport,
    pub analysis: AnalysisBundle,
    pub charts: Vec<ChartSpec>,
    pub duration_ms: u64,
}

/// The EDA pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use eda_processing::{AnalysisConfig, Pipeline};
///
/// let outcome = Pipeline::builder()
///     .config(AnalysisConfig::builder().strong_correlation_threshold(0.8).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&df)?;
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    analyzer: StatisticalAnalyzer,
    selector: ChartSelector,
}

// Pipeline may be moved to a worker thread
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the pipeline. The input table is not modified.
    pub fn run(&self, df: &DataFrame) -> Result<EdaOutcome> {
        match self.run_internal(df) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, df: &DataFrame) -> Result<EdaOutcome> {
        let start_time = Instant::now();
        info!("Starting EDA pipeline on {} rows x {} columns", df.height(), df.width());

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Profiling,
            0.0,
            "Profiling dataset...",
        ));
        let quality_before = QualityProfiler::profile(df).context("Profiling input table")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Profiling,
            1.0,
            format!(
                "Found {} columns with missing values and {} duplicate rows",
                quality_before.missing_values.len(),
                quality_before.duplicate_rows
            ),
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        let (cleaned, report) = self.cleaner.clean_profiled(df, quality_before)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!(
                "Cleaned: {} duplicates removed, {} columns imputed",
                report.duplicates_removed,
                report.imputations.len()
            ),
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Analyzing,
            0.0,
            "Analyzing dataset...",
        ));
        let analysis = self
            .analyzer
            .analyze(&cleaned, &report.column_types)
            .context("Analyzing cleaned table")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Analyzing,
            1.0,
            format!("Generated {} insights", analysis.insights.len()),
        ));

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Visualizing,
            0.0,
            "Selecting charts...",
        ));
        let charts = self
            .selector
            .auto_charts(&cleaned, &report.column_types)
            .context("Selecting charts")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Visualizing,
            1.0,
            format!("Selected {} charts", charts.len()),
        ));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("EDA pipeline completed in {}ms", duration_ms);

        Ok(EdaOutcome {
            cleaned,
            report,
            analysis,
            charts,
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| {
    ///         println!("[{:.0}%] {:?}: {}",
    ///             update.progress * 100.0,
    ///             update.stage,
    ///             update.message
    ///         );
    ///     })
    ///     .build()?;
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            cleaner: DataCleaner::new(config.clone()),
            analyzer: StatisticalAnalyzer::new(config.clone()),
            selector: ChartSelector::new(config.clone()),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sample_table() -> DataFrame {
        df![
            "age" => [Some(25.0), None, Some(35.0), Some(40.0), Some(25.0)],
            "income" => [Some(50_000.0), Some(62_000.0), Some(71_000.0), Some(80_000.0), Some(50_000.0)],
            "city" => [Some("A"), Some("B"), None, Some("B"), Some("A")],
        ]
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &AnalysisConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = AnalysisConfig {
            strong_correlation_threshold: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_run_produces_full_outcome() {
        let outcome = Pipeline::builder().build().unwrap().run(&sample_table()).unwrap();

        assert_eq!(outcome.report.quality_before.missing_values.len(), 2);
        assert!(outcome.report.quality_after.missing_values.is_empty());
        // rows 0 and 4 are identical
        assert_eq!(outcome.report.duplicates_removed, 1);
        assert_eq!(outcome.cleaned.height(), 4);
        assert_eq!(outcome.analysis.descriptive.len(), 2);
        assert!(!outcome.charts.is_empty());
    }

    #[test]
    fn test_progress_stages_in_order() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        Pipeline::builder()
            .on_progress(move |update| {
                if let Ok(mut seen) = stages_clone.lock() {
                    if seen.last() != Some(&update.stage) {
                        seen.push(update.stage);
                    }
                }
            })
            .build()
            .unwrap()
            .run(&sample_table())
            .unwrap();

        let seen = stages.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                PipelineStage::Profiling,
                PipelineStage::Cleaning,
                PipelineStage::Analyzing,
                PipelineStage::Visualizing,
                PipelineStage::Complete,
            ]
        );
    }

    #[test]
    fn test_progress_is_monotonic() {
        let progress = Arc::new(Mutex::new(Vec::new()));
        let progress_clone = progress.clone();

        Pipeline::builder()
            .on_progress(move |update| {
                if let Ok(mut seen) = progress_clone.lock() {
                    seen.push(update.progress);
                }
            })
            .build()
            .unwrap()
            .run(&sample_table())
            .unwrap();

        let seen = progress.lock().unwrap().clone();
        assert!(seen.windows(2).all(|w| w[0] <= w[1] + 1e-6));
        assert_eq!(seen.last(), Some(&1.0));
    }

    #[test]
    fn test_input_table_untouched() {
        let df = sample_table();
        Pipeline::builder().build().unwrap().run(&df).unwrap();
        assert_eq!(df.height(), 5);
        assert_eq!(df.column("age").unwrap().null_count(), 1);
    }
}
