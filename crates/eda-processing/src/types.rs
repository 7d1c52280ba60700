use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Column classification
// ============================================================================

/// Semantic category assigned to every column by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
    Text,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Datetime => "datetime",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeEntry {
    pub name: String,
    pub kind: ColumnKind,
}

/// Column name to [`ColumnKind`] mapping, kept in table column order.
///
/// Downstream stages take "the first N numeric columns" from this map, so
/// iteration order is part of its contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeMap {
    columns: Vec<ColumnTypeEntry>,
}

impl ColumnTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a kind to a column. Re-assigning keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, kind: ColumnKind) {
        let name = name.into();
        match self.columns.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.kind = kind,
            None => self.columns.push(ColumnTypeEntry { name, kind }),
        }
    }

    pub fn get(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of the columns of one kind, in table order.
    pub fn columns_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub fn numeric(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Numeric)
    }

    pub fn categorical(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Categorical)
    }

    pub fn datetime(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Datetime)
    }

    pub fn text(&self) -> Vec<&str> {
        self.columns_of(ColumnKind::Text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnKind)> {
        self.columns
            .iter()
            .map(|entry| (entry.name.as_str(), entry.kind))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Quality and cleaning reports
// ============================================================================

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueInfo {
    pub column: String,
    pub count: usize,
    /// Percentage of total rows, rounded to 2 decimals.
    pub percentage: f64,
}

/// Snapshot of a table's data quality. Built once per table, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Only columns with at least one missing value, in table order.
    pub missing_values: Vec<MissingValueInfo>,
    pub duplicate_rows: usize,
    pub memory_bytes: usize,
}

impl QualityReport {
    pub fn missing_for(&self, column: &str) -> Option<&MissingValueInfo> {
        self.missing_values.iter().find(|info| info.column == column)
    }

    pub fn total_missing(&self) -> usize {
        self.missing_values.iter().map(|info| info.count).sum()
    }

    /// Share of non-missing cells (0.0 - 1.0). An empty table counts as complete.
    pub fn completeness(&self) -> f64 {
        let cells = self.total_rows * self.total_columns;
        if cells == 0 {
            1.0
        } else {
            1.0 - self.total_missing() as f64 / cells as f64
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.missing_values.is_empty() || self.duplicate_rows > 0
    }
}

/// One storage narrowing applied by the cleaner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConversion {
    pub column: String,
    pub from: String,
    pub to: String,
}

/// Memory effect of storage narrowing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub memory_before: usize,
    pub memory_after: usize,
    /// Negative when narrowing grew the table.
    pub memory_saved: i64,
    /// `memory_saved / memory_before * 100`, rounded to 2 decimals.
    pub saved_percentage: f64,
    pub conversions: Vec<TypeConversion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    Median,
    Mode,
    Sentinel,
}

/// A fill applied to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub strategy: ImputationStrategy,
    pub fill_value: String,
    pub filled: usize,
}

/// Everything the cleaning pass produced, threaded into analysis and charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub quality_before: QualityReport,
    pub quality_after: QualityReport,
    pub imputations: Vec<ImputationRecord>,
    pub duplicates_removed: usize,
    pub optimization: OptimizationReport,
    pub column_types: ColumnTypeMap,
    /// (rows, columns) of the cleaned table.
    pub final_shape: (usize, usize),
}

// ============================================================================
// Statistic results
// ============================================================================

/// Why a statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    InsufficientData,
    ZeroVariance,
    ZeroMean,
    NonFinite,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InsufficientData => "insufficient data",
            Self::ZeroVariance => "zero variance",
            Self::ZeroMean => "zero mean",
            Self::NonFinite => "non-finite result",
        };
        f.write_str(text)
    }
}

/// A computed statistic or an explicit reason it is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Statistic {
    Computed { value: f64 },
    Undefined { reason: UndefinedReason },
}

impl Statistic {
    /// Wrap a raw value, mapping NaN and infinities to `Undefined(NonFinite)`.
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() {
            Self::Computed { value }
        } else {
            Self::Undefined {
                reason: UndefinedReason::NonFinite,
            }
        }
    }

    pub fn undefined(reason: UndefinedReason) -> Self {
        Self::Undefined { reason }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Computed { value } => Some(*value),
            Self::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Computed { value } => Self::from_value(f(value)),
            undefined => undefined,
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed { value } => write!(f, "{}", value),
            Self::Undefined { reason } => write!(f, "undefined ({})", reason),
        }
    }
}
