//! Exploratory Data Analysis Library
//!
//! Automatic cleaning, profiling and statistical analysis of tabular data,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Column Classification**: numeric, categorical, datetime or text per column
//! - **Quality Profiling**: missing values, duplicate rows, memory footprint
//! - **Data Cleaning**: median/mode imputation, deduplication, storage narrowing
//! - **Statistical Analysis**: descriptive stats, correlation, normality, outliers, insights
//! - **Chart Selection**: passive chart specifications for a renderer
//! - **Progress Reporting**: per-stage progress updates from the pipeline
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_processing::{AnalysisConfig, Pipeline, loader};
//!
//! let df = loader::load_table("data.csv")?;
//!
//! let config = AnalysisConfig::builder()
//!     .strong_correlation_threshold(0.8)
//!     .build()?;
//!
//! let outcome = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(&df)?;
//!
//! for insight in &outcome.analysis.insights {
//!     println!("{}", insight);
//! }
//! ```
//!
//! # Sessions
//!
//! Interactive frontends keep the original table, the cleaned table and the
//! cleaning report together in a [`Session`]:
//!
//! ```rust,ignore
//! use eda_processing::Session;
//!
//! let mut session = Session::default();
//! session.load(df)?;
//! let charts = session.charts()?;
//! session.export_to_path("cleaned.xlsx")?;
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod session;
pub mod types;
pub mod utils;
pub mod visualization;

// Re-exports for convenient access
pub use analysis::{AnalysisBundle, Insight, InsightKind, StatisticalAnalyzer};
pub use cleaner::DataCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    ClosureProgressReporter, EdaOutcome, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::{ColumnClassifier, ColumnInfo, QualityProfiler};
pub use reporting::{EdaReport, ReportGenerator};
pub use session::Session;
pub use types::{
    CleaningReport, ColumnKind, ColumnTypeMap, OptimizationReport, QualityReport, Statistic,
    UndefinedReason,
};
pub use visualization::{ChartSelector, ChartSpec};
