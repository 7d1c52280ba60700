//! Error types for the EDA processing library.
//!
//! Only caller misuse and I/O failures surface as errors. Degenerate data
//! (too few values, zero variance, zero mean) is reported through
//! [`crate::types::Statistic::Undefined`] or empty results instead.
//!
//! Errors are serializable so a frontend can receive them as
//! `{ "code": ..., "message": ... }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for EDA operations.
#[derive(Error, Debug)]
pub enum EdaError {
    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Column exists but does not have numeric storage.
    #[error("Column '{column}' is not numeric (storage type {dtype})")]
    NotNumeric { column: String, dtype: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No dataset loaded in the session.
    #[error("No data loaded")]
    NoDataLoaded,

    /// Input file extension is not supported by the loader.
    #[error("Unsupported file format '{0}' (expected csv, parquet, xlsx or xls)")]
    UnsupportedFormat(String),

    /// Input file exceeds the upload ceiling.
    #[error("File is {size} bytes, exceeding the limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// Workbook could not be read or written.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NotNumeric { .. } => "NOT_NUMERIC",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error comes from calling an operation with arguments that
    /// do not fit the current table.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::NotNumeric { .. } => true,
            Self::WithContext { source, .. } => source.is_contract_violation(),
            _ => false,
        }
    }

    /// Whether the error was raised by input validation before any processing.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::FileTooLarge { .. })
    }
}

impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for EDA operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(EdaError::NoDataLoaded.error_code(), "NO_DATA_LOADED");
        assert_eq!(
            EdaError::ColumnNotFound("age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            EdaError::NotNumeric {
                column: "city".to_string(),
                dtype: "str".to_string()
            }
            .error_code(),
            "NOT_NUMERIC"
        );
    }

    #[test]
    fn test_contract_violation() {
        assert!(EdaError::ColumnNotFound("x".to_string()).is_contract_violation());
        assert!(
            EdaError::ColumnNotFound("x".to_string())
                .with_context("During distribution analysis")
                .is_contract_violation()
        );
        assert!(!EdaError::NoDataLoaded.is_contract_violation());
    }

    #[test]
    fn test_input_error() {
        assert!(EdaError::UnsupportedFormat("txt".to_string()).is_input_error());
        assert!(
            EdaError::FileTooLarge {
                size: 60,
                limit: 50
            }
            .is_input_error()
        );
        assert!(!EdaError::NoDataLoaded.is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = EdaError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = EdaError::ColumnNotFound("test".to_string()).with_context("During profiling");
        assert!(error.to_string().contains("During profiling"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
