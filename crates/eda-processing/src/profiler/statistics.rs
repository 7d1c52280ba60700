//! Numeric kernels shared by the cleaner and the analyzer.
//!
//! All functions take plain slices of present values. Degenerate inputs
//! return [`Statistic::Undefined`] instead of NaN.

use crate::types::{Statistic, UndefinedReason};

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

/// Median of unsorted values. `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    crate::utils::sort_floats(&mut sorted);
    Some(quantile_sorted(&sorted, 0.5))
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Statistic {
    let n = values.len();
    if n < 2 {
        return Statistic::undefined(UndefinedReason::InsufficientData);
    }
    let Some(m) = mean(values) else {
        return Statistic::undefined(UndefinedReason::InsufficientData);
    };
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    Statistic::from_value(variance.sqrt())
}

/// Central moments m2, m3, m4 (population, n denominator).
#[derive(Debug, Clone, Copy)]
struct Moments {
    m2: f64,
    m3: f64,
    m4: f64,
}

fn central_moments(values: &[f64]) -> Option<Moments> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let (mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        s2 += d2;
        s3 += d2 * d;
        s4 += d2 * d2;
    }
    Some(Moments {
        m2: s2 / n,
        m3: s3 / n,
        m4: s4 / n,
    })
}

/// Relative variance below which a column counts as constant.
const ZERO_VARIANCE_EPS: f64 = 1e-14;

fn is_zero_variance(values: &[f64], m2: f64) -> bool {
    let scale = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    m2 <= ZERO_VARIANCE_EPS * scale.max(1.0).powi(2)
}

/// Biased (population) skewness g1 = m3 / m2^1.5.
pub fn population_skewness(values: &[f64]) -> Statistic {
    if values.len() < 3 {
        return Statistic::undefined(UndefinedReason::InsufficientData);
    }
    match central_moments(values) {
        Some(mo) if is_zero_variance(values, mo.m2) => {
            Statistic::undefined(UndefinedReason::ZeroVariance)
        }
        Some(mo) => Statistic::from_value(mo.m3 / mo.m2.powf(1.5)),
        None => Statistic::undefined(UndefinedReason::InsufficientData),
    }
}

/// Biased (population) excess kurtosis g2 = m4 / m2^2 - 3.
pub fn population_kurtosis(values: &[f64]) -> Statistic {
    if values.len() < 3 {
        return Statistic::undefined(UndefinedReason::InsufficientData);
    }
    match central_moments(values) {
        Some(mo) if is_zero_variance(values, mo.m2) => {
            Statistic::undefined(UndefinedReason::ZeroVariance)
        }
        Some(mo) => Statistic::from_value(mo.m4 / (mo.m2 * mo.m2) - 3.0),
        None => Statistic::undefined(UndefinedReason::InsufficientData),
    }
}

/// Bias-corrected sample skewness G1 = g1 * sqrt(n(n-1)) / (n-2).
pub fn sample_skewness(values: &[f64]) -> Statistic {
    let n = values.len() as f64;
    population_skewness(values).map(|g1| g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Bias-corrected sample excess kurtosis
/// G2 = ((n+1) g2 + 6) (n-1) / ((n-2)(n-3)).
pub fn sample_kurtosis(values: &[f64]) -> Statistic {
    if values.len() < 4 {
        return Statistic::undefined(UndefinedReason::InsufficientData);
    }
    let n = values.len() as f64;
    population_kurtosis(values)
        .map(|g2| ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0)))
}

/// Tukey fences for an ascending slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFences {
    pub fn from_sorted(sorted: &[f64]) -> Self {
        let q1 = quantile_sorted(sorted, 0.25);
        let q3 = quantile_sorted(sorted, 0.75);
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            lower: q1 - 1.5 * iqr,
            upper: q3 + 1.5 * iqr,
        }
    }

    /// Values exactly on a fence are not outliers.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    pub fn count_outliers(&self, values: &[f64]) -> usize {
        values.iter().filter(|v| self.is_outlier(**v)).count()
    }
}

/// Pearson correlation over pairwise-complete observations.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    if xs.len() < 2 {
        return None;
    }

    let mx = mean(&xs)?;
    let my = mean(&ys)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in xs.iter().zip(ys.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_quantile_sorted_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&values, 0.5), 2.5);
        assert_eq!(quantile_sorted(&values, 0.25), 1.75);
        assert_eq!(quantile_sorted(&values, 0.0), 1.0);
        assert_eq!(quantile_sorted(&values, 1.0), 4.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[8.0, 1.0, 5.0, 3.0, 2.0, 4.0, 7.0, 6.0]), Some(4.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_sample_std() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(approx(std.value().unwrap(), 2.138089935, 1e-8));
        assert!(!sample_std(&[1.0]).is_defined());
    }

    #[test]
    fn test_population_skewness_and_kurtosis() {
        let values = [1.0, 2.0, 3.0, 4.0, 10.0];
        // m2 = 10, m3 = 36, m4 = 278.8
        let skew = population_skewness(&values).value().unwrap();
        assert!(approx(skew, 36.0 / 10f64.powf(1.5), 1e-12));
        let kurt = population_kurtosis(&values).value().unwrap();
        assert!(approx(kurt, 278.8 / 100.0 - 3.0, 1e-12));
    }

    #[test]
    fn test_sample_corrections() {
        let values = [1.0, 2.0, 3.0, 4.0, 10.0];
        let g1 = population_skewness(&values).value().unwrap();
        let big_g1 = sample_skewness(&values).value().unwrap();
        assert!(approx(big_g1, g1 * (20f64).sqrt() / 3.0, 1e-12));

        let g2 = population_kurtosis(&values).value().unwrap();
        let big_g2 = sample_kurtosis(&values).value().unwrap();
        assert!(approx(big_g2, (6.0 * g2 + 6.0) * 4.0 / 6.0, 1e-12));
    }

    #[test]
    fn test_constant_column_is_zero_variance() {
        let values = [3.0, 3.0, 3.0, 3.0];
        assert_eq!(
            population_skewness(&values),
            Statistic::undefined(UndefinedReason::ZeroVariance)
        );
        assert_eq!(
            population_kurtosis(&values),
            Statistic::undefined(UndefinedReason::ZeroVariance)
        );
    }

    #[test]
    fn test_iqr_fences_are_strict() {
        let sorted = [10.0, 10.0, 11.0, 12.0, 13.0, 1000.0];
        let fences = IqrFences::from_sorted(&sorted);
        assert_eq!(fences.count_outliers(&sorted), 1);
        assert!(!fences.is_outlier(fences.upper));
        assert!(!fences.is_outlier(fences.lower));
    }

    #[test]
    fn test_pearson() {
        let x: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0, 5.0].iter().map(|v| Some(*v)).collect();
        let y: Vec<Option<f64>> = [2.0, 4.0, 6.0, 8.0, 10.0].iter().map(|v| Some(*v)).collect();
        assert!(approx(pearson(&x, &y).unwrap(), 1.0, 1e-12));
        assert_eq!(pearson(&x, &y), pearson(&y, &x));

        let constant = vec![Some(1.0); 5];
        assert_eq!(pearson(&x, &constant), None);
    }

    #[test]
    fn test_pearson_pairwise_complete() {
        let x = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let y = vec![Some(1.0), Some(100.0), Some(3.0), None];
        assert!(approx(pearson(&x, &y).unwrap(), 1.0, 1e-12));
    }
}
