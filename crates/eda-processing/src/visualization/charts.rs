//! Passive chart specifications.
//!
//! Each spec carries the data a renderer needs (bins, counts, points) and a
//! title. Nothing here draws.

use crate::analysis::CategoryCount;
use crate::profiler::statistics::{IqrFences, quantile_sorted};
use crate::utils::sort_floats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub title: String,
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationHeatmap {
    pub title: String,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub column: String,
    pub bars: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub x: String,
    pub y: Option<f64>,
}

/// One line of a time series; `group` is `None` when the chart is not split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLine {
    pub group: Option<String>,
    pub points: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub title: String,
    pub x_column: String,
    pub y_column: String,
    pub group_by: Option<String>,
    pub lines: Vec<TimeLine>,
}

/// Five-number summary with whiskers at the most extreme non-outlier values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub group: Option<String>,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// `None` for an empty group.
    pub fn from_values(group: Option<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sort_floats(&mut sorted);
        let fences = IqrFences::from_sorted(&sorted);

        let (inside, outliers): (Vec<f64>, Vec<f64>) =
            sorted.iter().copied().partition(|v| !fences.is_outlier(*v));
        let lower_whisker = inside.first().copied().unwrap_or(fences.q1);
        let upper_whisker = inside.last().copied().unwrap_or(fences.q3);

        Some(Self {
            group,
            lower_whisker,
            q1: fences.q1,
            median: quantile_sorted(&sorted, 0.5),
            q3: fences.q3,
            upper_whisker,
            outliers,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    pub title: String,
    pub column: String,
    pub group_by: Option<String>,
    pub boxes: Vec<BoxSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    pub column: String,
    pub slices: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Option<String>,
}

/// Ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Trendline {
    /// `None` with fewer than 2 points or constant x.
    pub fn fit(points: &[ScatterPoint]) -> Option<Self> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;
        let mean_x = points.iter().map(|p| p.x).sum::<f64>() / nf;
        let mean_y = points.iter().map(|p| p.y).sum::<f64>() / nf;

        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for p in points {
            let dx = p.x - mean_x;
            let dy = p.y - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }
        if sxx <= 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy > 0.0 {
            (sxy * sxy / (sxx * syy)).min(1.0)
        } else {
            1.0
        };
        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlot {
    pub title: String,
    pub x_column: String,
    pub y_column: String,
    pub color_column: Option<String>,
    pub points: Vec<ScatterPoint>,
    pub trendline: Option<Trendline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolinGroup {
    pub group: Option<String>,
    pub values: Vec<f64>,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolinPlot {
    pub title: String,
    pub column: String,
    pub group_by: Option<String>,
    pub groups: Vec<ViolinGroup>,
}

/// Histograms laid out on a grid at most three panels wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiHistogram {
    pub title: String,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Histogram>,
}

/// Any chart the selector can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart", rename_all = "snake_case")]
pub enum ChartSpec {
    Histogram(Histogram),
    CorrelationHeatmap(CorrelationHeatmap),
    Bar(BarChart),
    TimeSeries(TimeSeries),
    Box(BoxPlot),
    Pie(PieChart),
    Scatter(ScatterPlot),
    Violin(ViolinPlot),
    MultiHistogram(MultiHistogram),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            Self::Histogram(c) => &c.title,
            Self::CorrelationHeatmap(c) => &c.title,
            Self::Bar(c) => &c.title,
            Self::TimeSeries(c) => &c.title,
            Self::Box(c) => &c.title,
            Self::Pie(c) => &c.title,
            Self::Scatter(c) => &c.title,
            Self::Violin(c) => &c.title,
            Self::MultiHistogram(c) => &c.title,
        }
    }

    /// Stable identifier, e.g. `hist_age` or `correlation_heatmap`.
    pub fn key(&self) -> String {
        match self {
            Self::Histogram(c) => format!("hist_{}", c.column),
            Self::CorrelationHeatmap(_) => "correlation_heatmap".to_string(),
            Self::Bar(c) => format!("bar_{}", c.column),
            Self::TimeSeries(_) => "time_series".to_string(),
            Self::Box(c) => format!("box_{}", c.column),
            Self::Pie(c) => format!("pie_{}", c.column),
            Self::Scatter(c) => format!("scatter_{}_{}", c.x_column, c.y_column),
            Self::Violin(c) => format!("violin_{}", c.column),
            Self::MultiHistogram(_) => "histograms".to_string(),
        }
    }
}

/// Equal-width bins over the value range. A constant column gets one bin;
/// the last bin includes the maximum.
pub fn build_histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &sorted {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + idx as f64 * width,
            end: if idx + 1 == bins {
                max
            } else {
                min + (idx as f64 + 1.0) * width
            },
            count,
        })
        .collect()
}

/// `(rows, cols)` of a grid holding `n` panels, three per row.
pub fn grid_shape(n: usize) -> (usize, usize) {
    (n.div_ceil(3), n.min(3))
}
