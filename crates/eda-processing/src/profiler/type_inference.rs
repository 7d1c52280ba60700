//! Column type classification.
//!
//! Precedence per column: numeric storage, then temporal (native or strictly
//! parseable text), then categorical by distinct-value counts, then text.

use crate::config::AnalysisConfig;
use crate::types::{ColumnKind, ColumnTypeMap};
use crate::utils::{StorageKind, distinct_count};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

// Shapes a date-like value can take; anything else is rejected before chrono runs.
static DATE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/.]\d{1,2}[-/.]\d{1,2}([ T].*)?$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{4}$").expect("Invalid regex: DD-MM-YYYY"),
        Regex::new(r"^[A-Za-z]{3,9} \d{1,2}, \d{4}$").expect("Invalid regex: Mon DD, YYYY"),
        Regex::new(r"^\d{1,2} [A-Za-z]{3,9} \d{4}$").expect("Invalid regex: DD Mon YYYY"),
    ]
});

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%m-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
];

/// Strict parse of a single value as a calendar date or date-time.
pub fn parses_as_temporal(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || !DATE_SHAPES.iter().any(|re| re.is_match(value)) {
        return false;
    }

    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
    {
        return true;
    }
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

/// Assigns a [`ColumnKind`] to every column of a table.
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    categorical_ratio: f64,
    categorical_max_distinct: usize,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ColumnClassifier {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            categorical_ratio: config.categorical_ratio,
            categorical_max_distinct: config.categorical_max_distinct,
        }
    }

    /// Classify every column, in table order.
    pub fn classify(&self, df: &DataFrame) -> ColumnTypeMap {
        let mut map = ColumnTypeMap::new();
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let kind = self.classify_series(series);
            debug!("Classified '{}' ({}) as {}", series.name(), series.dtype(), kind);
            map.insert(series.name().to_string(), kind);
        }
        map
    }

    /// Classify a single column.
    pub fn classify_series(&self, series: &Series) -> ColumnKind {
        let storage = StorageKind::of_series(series);

        if storage.is_numeric() {
            return ColumnKind::Numeric;
        }

        if storage == StorageKind::Temporal
            || (storage == StorageKind::Text && is_temporal_text(series))
        {
            return ColumnKind::Datetime;
        }

        let distinct = match distinct_count(series) {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    "Could not count distinct values of '{}': {}. Treating as text",
                    series.name(),
                    e
                );
                return ColumnKind::Text;
            }
        };

        if self.is_categorical(distinct, series.len()) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Text
        }
    }

    /// Ratio test is skipped for empty tables; the distinct-count test alone decides.
    fn is_categorical(&self, distinct: usize, rows: usize) -> bool {
        if distinct < self.categorical_max_distinct {
            return true;
        }
        rows > 0 && (distinct as f64 / rows as f64) < self.categorical_ratio
    }
}

/// Every present value parses as a date or date-time. Columns without present
/// values do not qualify.
fn is_temporal_text(series: &Series) -> bool {
    let Ok(casted) = series.cast(&DataType::String) else {
        return false;
    };
    let Ok(values) = casted.str() else {
        return false;
    };

    let mut seen_any = false;
    for value in values.into_iter().flatten() {
        if !parses_as_temporal(value) {
            return false;
        }
        seen_any = true;
    }
    seen_any
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Temporal parsing tests ====================

    #[test]
    fn test_parses_common_formats() {
        assert!(parses_as_temporal("2024-01-15"));
        assert!(parses_as_temporal("2024/01/15"));
        assert!(parses_as_temporal("15/01/2024"));
        assert!(parses_as_temporal("01/15/2024"));
        assert!(parses_as_temporal("2024-01-15 10:30:00"));
        assert!(parses_as_temporal("2024-01-15T10:30:00Z"));
        assert!(parses_as_temporal("Jan 15, 2024"));
        assert!(parses_as_temporal("15 Jan 2024"));
        assert!(parses_as_temporal("  2024-01-15  "));
    }

    #[test]
    fn test_rejects_non_dates() {
        assert!(!parses_as_temporal(""));
        assert!(!parses_as_temporal("12345"));
        assert!(!parses_as_temporal("hello"));
        assert!(!parses_as_temporal("2024-13-45"));
        assert!(!parses_as_temporal("1.5"));
    }

    // ==================== Classification tests ====================

    #[test]
    fn test_numeric_storage_wins() {
        let df = df![
            "ints" => [1i64, 2, 3],
            "floats" => [1.5, 2.5, 3.5],
        ]
        .unwrap();
        let map = ColumnClassifier::default().classify(&df);
        assert_eq!(map.get("ints"), Some(ColumnKind::Numeric));
        assert_eq!(map.get("floats"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn test_datetime_requires_every_value() {
        let df = df![
            "good" => ["2024-01-01", "2024-02-01", "2024-03-01"],
            "bad" => ["2024-01-01", "not a date", "2024-03-01"],
        ]
        .unwrap();
        let map = ColumnClassifier::default().classify(&df);
        assert_eq!(map.get("good"), Some(ColumnKind::Datetime));
        assert_eq!(map.get("bad"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_datetime_ignores_missing_values() {
        let series = Series::new("d".into(), &[Some("2024-01-01"), None, Some("2024-01-03")]);
        assert_eq!(
            ColumnClassifier::default().classify_series(&series),
            ColumnKind::Datetime
        );

        let all_missing = Series::new("d".into(), &[None::<&str>, None]);
        assert_eq!(
            ColumnClassifier::default().classify_series(&all_missing),
            ColumnKind::Categorical
        );
    }

    #[test]
    fn test_categorical_vs_text() {
        let few: Vec<String> = (0..100).map(|i| format!("city_{}", i % 3)).collect();
        let many: Vec<String> = (0..100).map(|i| format!("note {}", i)).collect();
        let df = df![
            "city" => few,
            "note" => many,
        ]
        .unwrap();

        let map = ColumnClassifier::default().classify(&df);
        assert_eq!(map.get("city"), Some(ColumnKind::Categorical));
        assert_eq!(map.get("note"), Some(ColumnKind::Text));
    }

    #[test]
    fn test_low_ratio_makes_categorical_even_with_many_values() {
        // 25 distinct values over 1000 rows: 2.5% < 5%
        let values: Vec<String> = (0..1000).map(|i| format!("v{}", i % 25)).collect();
        let series = Series::new("code".into(), values);
        assert_eq!(
            ColumnClassifier::default().classify_series(&series),
            ColumnKind::Categorical
        );
    }

    #[test]
    fn test_boolean_and_single_value_are_categorical() {
        let df = df![
            "flag" => [true, false, true, true],
            "same" => ["x", "x", "x", "x"],
        ]
        .unwrap();
        let map = ColumnClassifier::default().classify(&df);
        assert_eq!(map.get("flag"), Some(ColumnKind::Categorical));
        assert_eq!(map.get("same"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_empty_table_does_not_divide_by_zero() {
        let df = df![
            "a" => Vec::<String>::new(),
            "b" => Vec::<f64>::new(),
        ]
        .unwrap();
        let map = ColumnClassifier::default().classify(&df);
        assert_eq!(map.get("a"), Some(ColumnKind::Categorical));
        assert_eq!(map.get("b"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn test_classification_is_total() {
        let df = df![
            "n" => [1, 2, 3],
            "c" => ["a", "b", "a"],
            "d" => ["2024-01-01", "2024-01-02", "2024-01-03"],
            "b" => [true, false, true],
        ]
        .unwrap();
        let map = ColumnClassifier::default().classify(&df);
        assert_eq!(map.len(), df.width());
        for name in df.get_column_names() {
            assert!(map.contains(name));
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let config = AnalysisConfig::builder()
            .categorical_max_distinct(2)
            .categorical_ratio(0.01)
            .build()
            .unwrap();
        let series = Series::new("c".into(), &["a", "b", "c"]);
        assert_eq!(
            ColumnClassifier::from_config(&config).classify_series(&series),
            ColumnKind::Text
        );
    }
}
