//! Chart selection.
//!
//! [`ChartSelector::auto_charts`] picks a default set of charts from the
//! column map. The explicit builders produce single charts on request.
//! Rendering happens elsewhere; every spec is plain serializable data.

mod charts;

pub use charts::{
    BarChart, BoxPlot, BoxSummary, ChartSpec, CorrelationHeatmap, Histogram, HistogramBin,
    MultiHistogram, PieChart, ScatterPlot, ScatterPoint, TimeLine, TimePoint, TimeSeries, Trendline,
    ViolinGroup, ViolinPlot, build_histogram, grid_shape,
};

use crate::analysis::{CategoricalSummary, StatisticalAnalyzer, column_series, numeric_series};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::types::ColumnTypeMap;
use crate::utils::{distinct_count, numeric_values, optional_numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Builds [`ChartSpec`]s from a cleaned table.
#[derive(Debug, Clone, Default)]
pub struct ChartSelector {
    config: AnalysisConfig,
}

impl ChartSelector {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Default charts, in order: histograms, correlation heatmap, bar
    /// charts, time series.
    pub fn auto_charts(&self, df: &DataFrame, column_types: &ColumnTypeMap) -> Result<Vec<ChartSpec>> {
        let mut charts = Vec::new();
        let numeric = column_types.numeric();

        for name in numeric.iter().take(self.config.histogram_limit) {
            charts.push(self.histogram(df, name)?);
        }

        if numeric.len() >= 2 {
            charts.extend(self.correlation_heatmap(df)?);
        }

        for name in column_types
            .categorical()
            .into_iter()
            .take(self.config.bar_chart_limit)
        {
            let distinct = distinct_count(column_series(df, name)?)?;
            if distinct <= self.config.bar_chart_max_distinct {
                charts.push(self.bar_chart(df, name)?);
            } else {
                debug!("Skipping bar chart for '{}': {} distinct values", name, distinct);
            }
        }

        if let (Some(x), Some(y)) = (column_types.datetime().first(), numeric.first()) {
            charts.push(self.time_series(df, x, y, None)?);
        }

        info!("Selected {} charts", charts.len());
        Ok(charts)
    }

    /// Equal-width histogram of a numeric column.
    pub fn histogram(&self, df: &DataFrame, column: &str) -> Result<ChartSpec> {
        Ok(ChartSpec::Histogram(self.histogram_panel(df, column)?))
    }

    fn histogram_panel(&self, df: &DataFrame, column: &str) -> Result<Histogram> {
        let values = numeric_values(numeric_series(df, column)?)?;
        Ok(Histogram {
            title: format!("Distribution: {}", column),
            column: column.to_string(),
            bins: build_histogram(&values, self.config.histogram_bins),
        })
    }

    /// `None` with fewer than two numeric-storage columns.
    pub fn correlation_heatmap(&self, df: &DataFrame) -> Result<Option<ChartSpec>> {
        let analysis = StatisticalAnalyzer::new(self.config.clone()).correlation_analysis(df)?;
        if analysis.matrix.len() < 2 {
            return Ok(None);
        }
        Ok(Some(ChartSpec::CorrelationHeatmap(CorrelationHeatmap {
            title: "Correlation Heatmap".to_string(),
            columns: analysis.matrix.columns,
            values: analysis.matrix.values,
        })))
    }

    /// Most frequent values of a column.
    pub fn bar_chart(&self, df: &DataFrame, column: &str) -> Result<ChartSpec> {
        let top_n = self.config.bar_chart_top_n;
        let summary = CategoricalSummary::from_series(column_series(df, column)?)?;
        Ok(ChartSpec::Bar(BarChart {
            title: format!("Top Categories: {} (Top {})", column, top_n),
            column: column.to_string(),
            bars: summary.top(top_n).to_vec(),
        }))
    }

    /// Share of the most frequent values of a column.
    pub fn pie_chart(&self, df: &DataFrame, column: &str) -> Result<ChartSpec> {
        let top_n = self.config.bar_chart_top_n;
        let summary = CategoricalSummary::from_series(column_series(df, column)?)?;
        Ok(ChartSpec::Pie(PieChart {
            title: format!("{} Distribution (Top {})", column, top_n),
            column: column.to_string(),
            slices: summary.top(top_n).to_vec(),
        }))
    }

    /// Line of `y` over `x`, in row order, optionally one line per group.
    ///
    /// Rows with a missing `x` label are dropped, and so are rows with a
    /// missing group label when grouping.
    pub fn time_series(
        &self,
        df: &DataFrame,
        x: &str,
        y: &str,
        group_by: Option<&str>,
    ) -> Result<ChartSpec> {
        let x_labels = row_labels(column_series(df, x)?)?;
        let y_values = optional_numeric_values(numeric_series(df, y)?)?;
        let groups = match group_by {
            Some(group_column) => row_labels(column_series(df, group_column)?)?,
            None => vec![None; x_labels.len()],
        };

        let mut lines: Vec<TimeLine> = Vec::new();
        for ((label, value), group) in x_labels.into_iter().zip(y_values).zip(groups) {
            let Some(label) = label else {
                continue;
            };
            if group_by.is_some() && group.is_none() {
                continue;
            }
            let point = TimePoint { x: label, y: value };
            match lines.iter_mut().find(|line| line.group == group) {
                Some(line) => line.points.push(point),
                None => lines.push(TimeLine {
                    group,
                    points: vec![point],
                }),
            }
        }

        let title = match group_by {
            Some(group) => format!("Time Series: {} over {} by {}", y, x, group),
            None => format!("Time Series: {} over {}", y, x),
        };
        Ok(ChartSpec::TimeSeries(TimeSeries {
            title,
            x_column: x.to_string(),
            y_column: y.to_string(),
            group_by: group_by.map(str::to_string),
            lines,
        }))
    }

    /// Box plot of a numeric column, optionally one box per group.
    pub fn box_plot(&self, df: &DataFrame, column: &str, group_by: Option<&str>) -> Result<ChartSpec> {
        let boxes = grouped_values(df, column, group_by)?
            .into_iter()
            .filter_map(|(group, values)| BoxSummary::from_values(group, &values))
            .collect();

        let title = match group_by {
            Some(group) => format!("Box Plot: {} by {}", column, group),
            None => format!("Box Plot: {}", column),
        };
        Ok(ChartSpec::Box(BoxPlot {
            title,
            column: column.to_string(),
            group_by: group_by.map(str::to_string),
            boxes,
        }))
    }

    /// Violin plot of a numeric column, optionally one violin per group.
    pub fn violin(&self, df: &DataFrame, column: &str, group_by: Option<&str>) -> Result<ChartSpec> {
        let groups = grouped_values(df, column, group_by)?
            .into_iter()
            .filter_map(|(group, values)| {
                let summary = BoxSummary::from_values(group.clone(), &values)?;
                Some(ViolinGroup {
                    group,
                    values,
                    summary,
                })
            })
            .collect();

        let title = match group_by {
            Some(group) => format!("Violin Plot: {} by {}", column, group),
            None => format!("Violin Plot: {}", column),
        };
        Ok(ChartSpec::Violin(ViolinPlot {
            title,
            column: column.to_string(),
            group_by: group_by.map(str::to_string),
            groups,
        }))
    }

    /// Scatter of two numeric columns with a least-squares trendline.
    /// Rows missing either coordinate are dropped.
    pub fn scatter(&self, df: &DataFrame, x: &str, y: &str, color: Option<&str>) -> Result<ChartSpec> {
        let xs = optional_numeric_values(numeric_series(df, x)?)?;
        let ys = optional_numeric_values(numeric_series(df, y)?)?;
        let colors: Vec<Option<String>> = match color {
            Some(name) => row_labels(column_series(df, name)?)?,
            None => vec![None; xs.len()],
        };

        let points: Vec<ScatterPoint> = xs
            .into_iter()
            .zip(ys)
            .zip(colors)
            .filter_map(|((x, y), color)| Some(ScatterPoint { x: x?, y: y?, color }))
            .collect();
        let trendline = Trendline::fit(&points);

        Ok(ChartSpec::Scatter(ScatterPlot {
            title: format!("Scatter Plot: {} vs {}", x, y),
            x_column: x.to_string(),
            y_column: y.to_string(),
            color_column: color.map(str::to_string),
            points,
            trendline,
        }))
    }

    /// Histogram grid over several numeric columns.
    pub fn multi_histogram(&self, df: &DataFrame, columns: &[&str]) -> Result<ChartSpec> {
        let panels = columns
            .iter()
            .map(|column| self.histogram_panel(df, column))
            .collect::<Result<Vec<_>>>()?;
        let (rows, cols) = grid_shape(panels.len());
        Ok(ChartSpec::MultiHistogram(MultiHistogram {
            title: "Distribution of Numeric Variables".to_string(),
            rows,
            cols,
            panels,
        }))
    }
}

/// Row labels as strings, missing values kept as `None`.
fn row_labels(series: &Series) -> Result<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Present values of a numeric column, split by group in order of first
/// appearance. Rows with a missing group label are dropped.
fn grouped_values(
    df: &DataFrame,
    column: &str,
    group_by: Option<&str>,
) -> Result<Vec<(Option<String>, Vec<f64>)>> {
    let series = numeric_series(df, column)?;
    let Some(group_column) = group_by else {
        return Ok(vec![(None, numeric_values(series)?)]);
    };

    let values = optional_numeric_values(series)?;
    let labels = row_labels(column_series(df, group_column)?)?;

    let mut groups: Vec<(Option<String>, Vec<f64>)> = Vec::new();
    for (value, label) in values.into_iter().zip(labels) {
        let (Some(value), Some(label)) = (value, label) else {
            continue;
        };
        match groups
            .iter_mut()
            .find(|(group, _)| group.as_deref() == Some(label.as_str()))
        {
            Some((_, bucket)) => bucket.push(value),
            None => groups.push((Some(label), vec![value])),
        }
    }
    Ok(groups)
}
