//! Report generation module.
//!
//! Assembles an [`EdaReport`] from a pipeline run and writes it as JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_processing::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("data/sales.csv", None, &df, &outcome)?;
//!
//! // Print as JSON
//! ReportGenerator::write_report(&report, std::io::stdout().lock())?;
//!
//! // Or write to file
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report_to_file(&report, "sales")?;
//! ```

mod generator;

pub use generator::{EdaReport, ProcessingSummary, ReportGenerator};
