//! Configuration types for classification, cleaning, analysis and charts.
//!
//! All thresholds are configurable. The defaults are the literal constants
//! of the dashboard this engine backs (0.7 strong correlation, 5% outliers,
//! fewer than 20 distinct values or a 5% distinct ratio for categoricals).

use serde::{Deserialize, Serialize};

/// Configuration shared by every stage of the EDA pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use eda_processing::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .strong_correlation_threshold(0.8)
///     .outlier_percentage_threshold(10.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A column is categorical when distinct / rows is below this ratio.
    /// Default: 0.05
    pub categorical_ratio: f64,

    /// A column is categorical when it has fewer distinct values than this.
    /// Default: 20
    pub categorical_max_distinct: usize,

    /// Text columns with distinct / total below this ratio are dictionary-encoded
    /// during storage narrowing.
    /// Default: 0.5
    pub categorical_narrowing_ratio: f64,

    /// Pairs with |r| strictly above this are reported as strong correlations.
    /// Default: 0.7
    pub strong_correlation_threshold: f64,

    /// Outlier percentage above which an outlier insight is emitted.
    /// Default: 5.0
    pub outlier_percentage_threshold: f64,

    /// |skewness| above which a skew insight is emitted.
    /// Default: 1.0
    pub skew_threshold: f64,

    /// Most-common share (percent) above which a dominant-category insight is emitted.
    /// Default: 50.0
    pub dominant_category_threshold: f64,

    /// Significance level of the normality tests.
    /// Default: 0.05
    pub normality_alpha: f64,

    /// Sample size from which Anderson-Darling replaces Shapiro-Wilk.
    /// Default: 5000
    pub large_sample_threshold: usize,

    /// Number of numeric columns inspected for insights.
    /// Default: 5
    pub insight_numeric_limit: usize,

    /// Number of strong correlation pairs turned into insights.
    /// Default: 3
    pub insight_correlation_limit: usize,

    /// Number of categorical columns inspected for insights.
    /// Default: 3
    pub insight_categorical_limit: usize,

    /// Number of numeric columns that get an automatic histogram.
    /// Default: 6
    pub histogram_limit: usize,

    /// Bins per histogram.
    /// Default: 30
    pub histogram_bins: usize,

    /// Number of categorical columns that get an automatic bar chart.
    /// Default: 4
    pub bar_chart_limit: usize,

    /// Categorical columns with more distinct values than this get no bar chart.
    /// Default: 20
    pub bar_chart_max_distinct: usize,

    /// Number of categories shown per bar or pie chart.
    /// Default: 10
    pub bar_chart_top_n: usize,

    /// Fill value for columns that have no present value at all.
    /// Default: "Unknown"
    pub missing_sentinel: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            categorical_ratio: 0.05,
            categorical_max_distinct: 20,
            categorical_narrowing_ratio: 0.5,
            strong_correlation_threshold: 0.7,
            outlier_percentage_threshold: 5.0,
            skew_threshold: 1.0,
            dominant_category_threshold: 50.0,
            normality_alpha: 0.05,
            large_sample_threshold: 5000,
            insight_numeric_limit: 5,
            insight_correlation_limit: 3,
            insight_categorical_limit: 3,
            histogram_limit: 6,
            histogram_bins: 30,
            bar_chart_limit: 4,
            bar_chart_max_distinct: 20,
            bar_chart_top_n: 10,
            missing_sentinel: "Unknown".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        check_ratio("categorical_ratio", self.categorical_ratio, false)?;
        check_ratio(
            "categorical_narrowing_ratio",
            self.categorical_narrowing_ratio,
            false,
        )?;
        check_ratio(
            "strong_correlation_threshold",
            self.strong_correlation_threshold,
            true,
        )?;

        for (field, value) in [
            (
                "outlier_percentage_threshold",
                self.outlier_percentage_threshold,
            ),
            (
                "dominant_category_threshold",
                self.dominant_category_threshold,
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigValidationError::InvalidPercentage {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(self.skew_threshold >= 0.0 && self.skew_threshold.is_finite()) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "skew_threshold".to_string(),
                value: self.skew_threshold,
            });
        }

        if !(self.normality_alpha > 0.0 && self.normality_alpha < 1.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "normality_alpha".to_string(),
                value: self.normality_alpha,
            });
        }

        if self.categorical_max_distinct == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "categorical_max_distinct".to_string(),
                value: 0,
                min: 1,
            });
        }

        if self.large_sample_threshold < 3 {
            return Err(ConfigValidationError::InvalidCount {
                field: "large_sample_threshold".to_string(),
                value: self.large_sample_threshold,
                min: 3,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
                value: 0,
                min: 1,
            });
        }

        if self.missing_sentinel.is_empty() {
            return Err(ConfigValidationError::EmptySentinel);
        }

        Ok(())
    }
}

fn check_ratio(field: &str, value: f64, allow_zero: bool) -> Result<(), ConfigValidationError> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if lower_ok && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidThreshold {
            field: field.to_string(),
            value,
        })
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value}")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid percentage for '{field}': {value} (must be between 0 and 100)")]
    InvalidPercentage { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be at least {min})")]
    InvalidCount {
        field: String,
        value: usize,
        min: usize,
    },

    #[error("Missing-value sentinel must not be empty")]
    EmptySentinel,
}

impl From<ConfigValidationError> for crate::error::EdaError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::EdaError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    categorical_ratio: Option<f64>,
    categorical_max_distinct: Option<usize>,
    categorical_narrowing_ratio: Option<f64>,
    strong_correlation_threshold: Option<f64>,
    outlier_percentage_threshold: Option<f64>,
    skew_threshold: Option<f64>,
    dominant_category_threshold: Option<f64>,
    normality_alpha: Option<f64>,
    large_sample_threshold: Option<usize>,
    insight_numeric_limit: Option<usize>,
    insight_correlation_limit: Option<usize>,
    insight_categorical_limit: Option<usize>,
    histogram_limit: Option<usize>,
    histogram_bins: Option<usize>,
    bar_chart_limit: Option<usize>,
    bar_chart_max_distinct: Option<usize>,
    bar_chart_top_n: Option<usize>,
    missing_sentinel: Option<String>,
}

impl AnalysisConfigBuilder {
    /// Set the distinct-ratio below which a column is categorical.
    pub fn categorical_ratio(mut self, ratio: f64) -> Self {
        self.categorical_ratio = Some(ratio);
        self
    }

    /// Set the distinct-count below which a column is categorical.
    pub fn categorical_max_distinct(mut self, count: usize) -> Self {
        self.categorical_max_distinct = Some(count);
        self
    }

    /// Set the distinct-ratio below which text storage is dictionary-encoded.
    pub fn categorical_narrowing_ratio(mut self, ratio: f64) -> Self {
        self.categorical_narrowing_ratio = Some(ratio);
        self
    }

    /// Set the |r| threshold for strong correlations.
    pub fn strong_correlation_threshold(mut self, threshold: f64) -> Self {
        self.strong_correlation_threshold = Some(threshold);
        self
    }

    /// Set the outlier percentage that triggers an insight.
    pub fn outlier_percentage_threshold(mut self, percentage: f64) -> Self {
        self.outlier_percentage_threshold = Some(percentage);
        self
    }

    /// Set the |skewness| that triggers an insight.
    pub fn skew_threshold(mut self, threshold: f64) -> Self {
        self.skew_threshold = Some(threshold);
        self
    }

    /// Set the most-common share that triggers a dominant-category insight.
    pub fn dominant_category_threshold(mut self, percentage: f64) -> Self {
        self.dominant_category_threshold = Some(percentage);
        self
    }

    /// Set the normality test significance level.
    pub fn normality_alpha(mut self, alpha: f64) -> Self {
        self.normality_alpha = Some(alpha);
        self
    }

    /// Set the sample size from which Anderson-Darling is used.
    pub fn large_sample_threshold(mut self, n: usize) -> Self {
        self.large_sample_threshold = Some(n);
        self
    }

    /// Set the caps on insight sources (numeric columns, correlation pairs,
    /// categorical columns).
    pub fn insight_limits(mut self, numeric: usize, correlations: usize, categorical: usize) -> Self {
        self.insight_numeric_limit = Some(numeric);
        self.insight_correlation_limit = Some(correlations);
        self.insight_categorical_limit = Some(categorical);
        self
    }

    /// Set how many histograms are generated and with how many bins.
    pub fn histograms(mut self, limit: usize, bins: usize) -> Self {
        self.histogram_limit = Some(limit);
        self.histogram_bins = Some(bins);
        self
    }

    /// Set bar chart generation limits.
    pub fn bar_charts(mut self, limit: usize, max_distinct: usize, top_n: usize) -> Self {
        self.bar_chart_limit = Some(limit);
        self.bar_chart_max_distinct = Some(max_distinct);
        self.bar_chart_top_n = Some(top_n);
        self
    }

    /// Set the fill value used for entirely missing columns.
    pub fn missing_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.missing_sentinel = Some(sentinel.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            categorical_ratio: self.categorical_ratio.unwrap_or(defaults.categorical_ratio),
            categorical_max_distinct: self
                .categorical_max_distinct
                .unwrap_or(defaults.categorical_max_distinct),
            categorical_narrowing_ratio: self
                .categorical_narrowing_ratio
                .unwrap_or(defaults.categorical_narrowing_ratio),
            strong_correlation_threshold: self
                .strong_correlation_threshold
                .unwrap_or(defaults.strong_correlation_threshold),
            outlier_percentage_threshold: self
                .outlier_percentage_threshold
                .unwrap_or(defaults.outlier_percentage_threshold),
            skew_threshold: self.skew_threshold.unwrap_or(defaults.skew_threshold),
            dominant_category_threshold: self
                .dominant_category_threshold
                .unwrap_or(defaults.dominant_category_threshold),
            normality_alpha: self.normality_alpha.unwrap_or(defaults.normality_alpha),
            large_sample_threshold: self
                .large_sample_threshold
                .unwrap_or(defaults.large_sample_threshold),
            insight_numeric_limit: self
                .insight_numeric_limit
                .unwrap_or(defaults.insight_numeric_limit),
            insight_correlation_limit: self
                .insight_correlation_limit
                .unwrap_or(defaults.insight_correlation_limit),
            insight_categorical_limit: self
                .insight_categorical_limit
                .unwrap_or(defaults.insight_categorical_limit),
            histogram_limit: self.histogram_limit.unwrap_or(defaults.histogram_limit),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            bar_chart_limit: self.bar_chart_limit.unwrap_or(defaults.bar_chart_limit),
            bar_chart_max_distinct: self
                .bar_chart_max_distinct
                .unwrap_or(defaults.bar_chart_max_distinct),
            bar_chart_top_n: self.bar_chart_top_n.unwrap_or(defaults.bar_chart_top_n),
            missing_sentinel: self.missing_sentinel.unwrap_or(defaults.missing_sentinel),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.strong_correlation_threshold, 0.7);
        assert_eq!(config.outlier_percentage_threshold, 5.0);
        assert_eq!(config.categorical_ratio, 0.05);
        assert_eq!(config.categorical_max_distinct, 20);
        assert_eq!(config.large_sample_threshold, 5000);
        assert_eq!(config.missing_sentinel, "Unknown");
    }

    #[test]
    fn test_builder_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .strong_correlation_threshold(0.9)
            .outlier_percentage_threshold(10.0)
            .insight_limits(2, 1, 1)
            .histograms(3, 15)
            .missing_sentinel("N/A")
            .build()
            .unwrap();

        assert_eq!(config.strong_correlation_threshold, 0.9);
        assert_eq!(config.outlier_percentage_threshold, 10.0);
        assert_eq!(config.insight_numeric_limit, 2);
        assert_eq!(config.insight_correlation_limit, 1);
        assert_eq!(config.histogram_limit, 3);
        assert_eq!(config.histogram_bins, 15);
        assert_eq!(config.missing_sentinel, "N/A");
    }

    #[test]
    fn test_validation_invalid_ratio() {
        let result = AnalysisConfig::builder().categorical_ratio(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));

        let result = AnalysisConfig::builder().categorical_ratio(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_percentage() {
        let result = AnalysisConfig::builder()
            .outlier_percentage_threshold(120.0)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPercentage { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_alpha_and_counts() {
        assert!(AnalysisConfig::builder().normality_alpha(1.0).build().is_err());
        assert!(matches!(
            AnalysisConfig::builder()
                .large_sample_threshold(2)
                .build()
                .unwrap_err(),
            ConfigValidationError::InvalidCount { min: 3, .. }
        ));
        assert!(AnalysisConfig::builder().histograms(6, 0).build().is_err());
    }

    #[test]
    fn test_validation_empty_sentinel() {
        let result = AnalysisConfig::builder().missing_sentinel("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptySentinel
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "strong_correlation_threshold": 0.8, "histogram_bins": 20 }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.strong_correlation_threshold, 0.8);
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.outlier_percentage_threshold, 5.0);
        assert!(config.validate().is_ok());
    }
}
