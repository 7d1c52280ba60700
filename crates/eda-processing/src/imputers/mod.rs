//! Imputation module for handling missing values.
//!
//! Median for numeric columns, mode for categorical and text columns, and a
//! sentinel fallback for columns with no present values.

mod statistical;

pub use statistical::StatisticalImputer;
