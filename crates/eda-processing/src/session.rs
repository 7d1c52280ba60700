//! Session context for one interactive analysis.
//!
//! A [`Session`] owns the only mutable state in the crate: the original
//! table, its cleaned copy and the [`CleaningReport`] tying them together.
//! The three are always replaced as a unit.
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_processing::Session;
//!
//! let mut session = Session::default();
//! session.load(df)?;
//! let bundle = session.analysis()?;
//! let charts = session.charts()?;
//! session.export_csv(std::fs::File::create("cleaned.csv")?)?;
//! session.export_to_path("cleaned.xlsx")?;
//! ```

use crate::analysis::{AnalysisBundle, StatisticalAnalyzer};
use crate::cleaner::DataCleaner;
use crate::config::AnalysisConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::export;
use crate::pipeline::EdaOutcome;
use crate::types::CleaningReport;
use crate::visualization::{ChartSelector, ChartSpec};
use polars::prelude::*;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// The (original, cleaned, report) triple produced by one load.
#[derive(Debug, Clone)]
struct LoadedTables {
    original: DataFrame,
    cleaned: DataFrame,
    report: CleaningReport,
}

/// Holds the currently loaded dataset and the configuration used on it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: AnalysisConfig,
    loaded: Option<LoadedTables>,
}

// Session may be handed to a worker thread
static_assertions::assert_impl_all!(Session: Send);

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            loaded: None,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Clean `df` and make it the current dataset.
    ///
    /// The previous dataset is kept if cleaning fails.
    pub fn load(&mut self, df: DataFrame) -> Result<&CleaningReport> {
        let (cleaned, report) = DataCleaner::new(self.config.clone())
            .clean(&df)
            .context("Loading dataset")?;
        info!(
            "Loaded dataset: {} rows -> {} rows after cleaning",
            df.height(),
            cleaned.height()
        );

        let loaded = self.loaded.insert(LoadedTables {
            original: df,
            cleaned,
            report,
        });
        Ok(&loaded.report)
    }

    /// Make an already cleaned pipeline run the current dataset.
    pub fn adopt(&mut self, original: DataFrame, outcome: &EdaOutcome) {
        self.loaded = Some(LoadedTables {
            original,
            cleaned: outcome.cleaned.clone(),
            report: outcome.report.clone(),
        });
    }

    /// Drop the current dataset.
    pub fn clear(&mut self) {
        if self.loaded.take().is_some() {
            info!("Session cleared");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn original(&self) -> Result<&DataFrame> {
        self.tables().map(|t| &t.original)
    }

    pub fn cleaned(&self) -> Result<&DataFrame> {
        self.tables().map(|t| &t.cleaned)
    }

    pub fn report(&self) -> Result<&CleaningReport> {
        self.tables().map(|t| &t.report)
    }

    /// Analyze the current cleaned table with its column map.
    pub fn analysis(&self) -> Result<AnalysisBundle> {
        let tables = self.tables()?;
        StatisticalAnalyzer::new(self.config.clone())
            .analyze(&tables.cleaned, &tables.report.column_types)
    }

    /// Automatic charts for the current cleaned table.
    pub fn charts(&self) -> Result<Vec<ChartSpec>> {
        let tables = self.tables()?;
        ChartSelector::new(self.config.clone())
            .auto_charts(&tables.cleaned, &tables.report.column_types)
    }

    /// Write the cleaned table as CSV with a header row.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        export::write_csv(self.cleaned()?, writer).context("Exporting cleaned table")
    }

    /// Write the cleaned table as a single-sheet `.xlsx` workbook.
    pub fn export_xlsx<W: Write>(&self, writer: W) -> Result<()> {
        export::write_xlsx(self.cleaned()?, writer).context("Exporting cleaned table")
    }

    /// Write the cleaned table to `path` as CSV or `.xlsx`, by extension.
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        export::write_table(self.cleaned()?, path.as_ref())
    }

    fn tables(&self) -> Result<&LoadedTables> {
        self.loaded.as_ref().ok_or(EdaError::NoDataLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DataFrame {
        df![
            "score" => [Some(1.0), None, Some(3.0), Some(4.0)],
            "group" => ["a", "b", "a", "b"],
        ]
        .unwrap()
    }

    // ========================================================================
    // Empty session
    // ========================================================================

    #[test]
    fn test_empty_session_errors() {
        let session = Session::default();
        assert!(!session.is_loaded());
        assert!(matches!(session.cleaned(), Err(EdaError::NoDataLoaded)));
        assert!(matches!(session.analysis(), Err(EdaError::NoDataLoaded)));
        assert!(matches!(session.charts(), Err(EdaError::NoDataLoaded)));
        assert!(matches!(
            session.export_csv(Vec::new()),
            Err(EdaError::NoDataLoaded)
        ));
    }

    // ========================================================================
    // Load / clear
    // ========================================================================

    #[test]
    fn test_load_keeps_original_and_cleaned() {
        let mut session = Session::default();
        let report = session.load(sample_table()).unwrap();
        assert_eq!(report.quality_before.missing_values.len(), 1);

        assert_eq!(session.original().unwrap().column("score").unwrap().null_count(), 1);
        assert_eq!(session.cleaned().unwrap().column("score").unwrap().null_count(), 0);
    }

    #[test]
    fn test_reload_replaces_triple() {
        let mut session = Session::default();
        session.load(sample_table()).unwrap();
        session.load(df!["x" => [1, 2, 3]].unwrap()).unwrap();

        assert_eq!(session.original().unwrap().width(), 1);
        assert_eq!(session.cleaned().unwrap().width(), 1);
        assert!(session.report().unwrap().column_types.get("x").is_some());
    }

    #[test]
    fn test_clear() {
        let mut session = Session::default();
        session.load(sample_table()).unwrap();
        session.clear();
        assert!(!session.is_loaded());
        assert!(session.report().is_err());
    }

    // ========================================================================
    // Downstream
    // ========================================================================

    #[test]
    fn test_analysis_and_charts_use_cleaned_table() {
        let mut session = Session::default();
        session.load(sample_table()).unwrap();

        let bundle = session.analysis().unwrap();
        assert_eq!(bundle.descriptive.len(), 1);
        assert_eq!(bundle.descriptive[0].count, 4);

        let charts = session.charts().unwrap();
        assert!(charts.iter().any(|c| c.key() == "hist_score"));
    }

    #[test]
    fn test_export_csv_has_header() {
        let mut session = Session::default();
        session.load(sample_table()).unwrap();

        let mut buffer = Vec::new();
        session.export_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("score,group"));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn test_export_xlsx_reloads() {
        let mut session = Session::default();
        session.load(sample_table()).unwrap();

        let path = std::env::temp_dir().join(format!("{}_session_export.xlsx", std::process::id()));
        session.export_to_path(&path).unwrap();
        let reloaded = crate::loader::load_table(&path).unwrap();
        assert_eq!(reloaded.shape(), (4, 2));
        assert_eq!(reloaded.column("score").unwrap().null_count(), 0);
        std::fs::remove_file(path).ok();

        let mut buffer = Vec::new();
        session.export_xlsx(&mut buffer).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_export_to_unsupported_extension() {
        let mut session = Session::default();
        session.load(sample_table()).unwrap();
        let err = session.export_to_path("cleaned.json").unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_adopt_pipeline_outcome() {
        let df = sample_table();
        let outcome = crate::pipeline::Pipeline::builder()
            .build()
            .unwrap()
            .run(&df)
            .unwrap();

        let mut session = Session::default();
        session.adopt(df, &outcome);
        assert!(session.is_loaded());
        assert!(session.cleaned().unwrap().equals(&outcome.cleaned));
        assert_eq!(session.report().unwrap(), &outcome.report);
    }
}
