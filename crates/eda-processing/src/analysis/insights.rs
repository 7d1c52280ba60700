//! Human-readable findings derived from analysis results.
//!
//! Every insight carries a machine-readable [`InsightKind`] so callers can
//! format it in another language.

use super::categorical::CategoricalSummary;
use super::correlation::StrongCorrelation;
use super::distribution::DistributionSummary;
use crate::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Outlier,
    Skew,
    Normal,
    Correlation,
    DominantCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub columns: Vec<String>,
    pub message: String,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outlier, skew and normality findings for one numeric column, in that order.
pub fn distribution_insights(summary: &DistributionSummary, config: &AnalysisConfig) -> Vec<Insight> {
    let mut insights = Vec::new();
    let column = &summary.column;

    if summary.outlier_percentage > config.outlier_percentage_threshold {
        insights.push(Insight {
            kind: InsightKind::Outlier,
            columns: vec![column.clone()],
            message: format!(
                "'{}' has {:.1}% outliers ({} values outside the IQR fences)",
                column, summary.outlier_percentage, summary.outlier_count
            ),
        });
    }

    if let Some(skew) = summary
        .skewness
        .value()
        .filter(|s| s.abs() > config.skew_threshold)
    {
        let direction = if skew > 0.0 { "right" } else { "left" };
        insights.push(Insight {
            kind: InsightKind::Skew,
            columns: vec![column.clone()],
            message: format!(
                "'{}' is strongly skewed to the {} (skewness {:.2})",
                column, direction, skew
            ),
        });
    }

    if summary.normality.is_normal {
        insights.push(Insight {
            kind: InsightKind::Normal,
            columns: vec![column.clone()],
            message: format!("'{}' looks normally distributed", column),
        });
    }

    insights
}

pub fn correlation_insight(pair: &StrongCorrelation) -> Insight {
    let sign = if pair.correlation > 0.0 { "positive" } else { "negative" };
    Insight {
        kind: InsightKind::Correlation,
        columns: vec![pair.column_a.clone(), pair.column_b.clone()],
        message: format!(
            "Strong {} correlation between '{}' and '{}' (r = {:.2})",
            sign, pair.column_a, pair.column_b, pair.correlation
        ),
    }
}

/// `None` unless the most common value exceeds the dominance threshold.
pub fn dominant_category_insight(
    summary: &CategoricalSummary,
    config: &AnalysisConfig,
) -> Option<Insight> {
    if summary.most_common_pct <= config.dominant_category_threshold {
        return None;
    }
    let value = summary.most_common.as_deref()?;
    Some(Insight {
        kind: InsightKind::DominantCategory,
        columns: vec![summary.column.clone()],
        message: format!(
            "'{}' is dominated by '{}' ({:.1}% of rows)",
            summary.column, value, summary.most_common_pct
        ),
    })
}
