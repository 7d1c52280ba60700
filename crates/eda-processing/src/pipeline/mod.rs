//! Pipeline module.
//!
//! This module provides the EDA pipeline and its progress reporting.

mod builder;
pub mod progress;

pub use builder::{EdaOutcome, Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
