use crate::analysis::{
    CategoricalSummary, CorrelationAnalysis, DescriptiveStats, DistributionSummary, Insight,
};
use crate::error::{Result, ResultExt};
use crate::pipeline::EdaOutcome;
use crate::profiler::{ColumnInfo, QualityProfiler};
use crate::types::CleaningReport;
use crate::visualization::ChartSpec;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Full EDA report for one input table.
///
/// Used for JSON output to stdout (`--json`), JSON files (`--report`) and
/// programmatic access in library mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaReport {
    // Metadata
    /// Local timestamp when the report was generated
    pub generated_at: String,
    /// Name or path of the input
    pub input_file: String,
    /// Path of the exported cleaned table, if one was written
    pub output_file: Option<String>,

    pub summary: ProcessingSummary,
    pub cleaning: CleaningReport,

    // Column overviews before and after cleaning
    pub original_columns: Vec<ColumnInfo>,
    pub cleaned_columns: Vec<ColumnInfo>,

    // Analysis
    pub descriptive: Vec<DescriptiveStats>,
    pub correlation: CorrelationAnalysis,
    pub distributions: Vec<DistributionSummary>,
    pub categorical: Vec<CategoricalSummary>,
    pub insights: Vec<Insight>,

    pub charts: Vec<ChartSpec>,
}

/// Headline numbers of one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub duration_ms: u64,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: usize,
    pub duplicates_removed: usize,
    pub missing_cells_before: usize,
    pub missing_cells_after: usize,
    pub memory_saved: i64,
    pub memory_saved_percent: f64,
}

impl ProcessingSummary {
    fn from_outcome(outcome: &EdaOutcome) -> Self {
        let report = &outcome.report;
        Self {
            duration_ms: outcome.duration_ms,
            rows_before: report.quality_before.total_rows,
            rows_after: report.final_shape.0,
            columns: report.final_shape.1,
            duplicates_removed: report.duplicates_removed,
            missing_cells_before: report.quality_before.total_missing(),
            missing_cells_after: report.quality_after.total_missing(),
            memory_saved: report.optimization.memory_saved,
            memory_saved_percent: report.optimization.saved_percentage,
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Builds [`EdaReport`]s and writes them as pretty JSON.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Assemble a report from a pipeline outcome and the table it ran on.
    pub fn build_report(
        input_file: &str,
        output_file: Option<&str>,
        original_df: &DataFrame,
        outcome: &EdaOutcome,
    ) -> Result<EdaReport> {
        let original_columns =
            QualityProfiler::column_info(original_df).context("Summarising original columns")?;
        let cleaned_columns =
            QualityProfiler::column_info(&outcome.cleaned).context("Summarising cleaned columns")?;
        let analysis = outcome.analysis.clone();

        Ok(EdaReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            summary: ProcessingSummary::from_outcome(outcome),
            cleaning: outcome.report.clone(),
            original_columns,
            cleaned_columns,
            descriptive: analysis.descriptive,
            correlation: analysis.correlation,
            distributions: analysis.distributions,
            categorical: analysis.categorical,
            insights: analysis.insights,
            charts: outcome.charts.clone(),
        })
    }

    /// Write the report as pretty JSON to any writer.
    pub fn write_report<W: Write>(report: &EdaReport, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write `<output_dir>/<report_base_name>_report.json`.
    pub fn write_report_to_file(
        &self,
        report: &EdaReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let file = File::create(&report_path)?;
        Self::write_report(report, file)?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
