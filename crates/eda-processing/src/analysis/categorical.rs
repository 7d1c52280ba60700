//! Value frequencies of a categorical column.

use crate::utils::{percentage, round_to, value_frequencies};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One distinct value and its share of all rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub unique_count: usize,
    pub most_common: Option<String>,
    pub most_common_count: usize,
    /// Share of total rows, missing rows included, 2 decimals.
    pub most_common_pct: f64,
    /// Ordered by count descending, ties by value.
    pub value_counts: Vec<CategoryCount>,
}

impl CategoricalSummary {
    pub fn from_series(series: &Series) -> PolarsResult<Self> {
        let total_rows = series.len();
        let value_counts: Vec<CategoryCount> = value_frequencies(series)?
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value,
                count,
                percentage: round_to(percentage(count, total_rows), 2),
            })
            .collect();

        let (most_common, most_common_count, most_common_pct) = match value_counts.first() {
            Some(top) => (Some(top.value.clone()), top.count, top.percentage),
            None => (None, 0, 0.0),
        };

        Ok(Self {
            column: series.name().to_string(),
            unique_count: value_counts.len(),
            most_common,
            most_common_count,
            most_common_pct,
            value_counts,
        })
    }

    /// The `n` most frequent values.
    pub fn top(&self, n: usize) -> &[CategoryCount] {
        &self.value_counts[..n.min(self.value_counts.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_value() {
        let values: Vec<&str> = (0..100)
            .map(|i| if i < 60 { "Tashkent" } else if i < 85 { "Samarkand" } else { "Bukhara" })
            .collect();
        let series = Series::new("city".into(), values);

        let summary = CategoricalSummary::from_series(&series).unwrap();
        assert_eq!(summary.unique_count, 3);
        assert_eq!(summary.most_common.as_deref(), Some("Tashkent"));
        assert_eq!(summary.most_common_count, 60);
        assert_eq!(summary.most_common_pct, 60.0);
        assert_eq!(summary.value_counts[1].value, "Samarkand");
        assert_eq!(summary.value_counts[2].percentage, 15.0);
    }

    #[test]
    fn test_percentage_counts_missing_rows() {
        let series = Series::new("c".into(), &[Some("a"), Some("a"), None, Some("b")]);
        let summary = CategoricalSummary::from_series(&series).unwrap();
        assert_eq!(summary.most_common_pct, 50.0);
        assert_eq!(summary.unique_count, 2);
    }

    #[test]
    fn test_ties_ordered_by_value() {
        let series = Series::new("c".into(), &["b", "a", "b", "a"]);
        let summary = CategoricalSummary::from_series(&series).unwrap();
        assert_eq!(summary.most_common.as_deref(), Some("a"));
        assert_eq!(summary.top(1).len(), 1);
        assert_eq!(summary.top(10).len(), 2);
    }

    #[test]
    fn test_empty_column() {
        let series = Series::new("c".into(), Vec::<String>::new());
        let summary = CategoricalSummary::from_series(&series).unwrap();
        assert_eq!(summary.unique_count, 0);
        assert!(summary.most_common.is_none());
        assert_eq!(summary.most_common_count, 0);
        assert_eq!(summary.most_common_pct, 0.0);
    }
}
