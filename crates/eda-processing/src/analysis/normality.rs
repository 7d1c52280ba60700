//! Normality tests.
//!
//! Small samples use Shapiro-Wilk with Royston's (1992) coefficient and
//! p-value approximations. Large samples use Anderson-Darling against a
//! normal with estimated mean and variance, judged at the 5% level.

use crate::types::{Statistic, UndefinedReason};
use crate::utils::sort_floats;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_SMALL_MEAN: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_SMALL_SIGMA: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_LARGE_MEAN: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_LARGE_SIGMA: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_GAMMA: [f64; 2] = [-2.273, 0.459];

/// Which test produced a [`NormalityResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalityTest {
    ShapiroWilk,
    AndersonDarling,
}

/// Outcome of a normality test on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    pub test: NormalityTest,
    /// W for Shapiro-Wilk, A² for Anderson-Darling.
    pub statistic: Statistic,
    /// Shapiro-Wilk only.
    pub p_value: Option<f64>,
    /// Anderson-Darling only.
    pub critical_value: Option<f64>,
    pub is_normal: bool,
}

impl NormalityResult {
    fn undefined(test: NormalityTest, reason: UndefinedReason) -> Self {
        Self {
            test,
            statistic: Statistic::undefined(reason),
            p_value: None,
            critical_value: None,
            is_normal: false,
        }
    }
}

/// Pick the test by sample size and judge normality.
pub fn test_normality(values: &[f64], alpha: f64, large_sample_threshold: usize) -> NormalityResult {
    let n = values.len();
    if n < large_sample_threshold {
        if n < 3 {
            return NormalityResult::undefined(NormalityTest::ShapiroWilk, UndefinedReason::InsufficientData);
        }
        match shapiro_wilk(values) {
            Some((w, p)) => NormalityResult {
                test: NormalityTest::ShapiroWilk,
                statistic: Statistic::from_value(w),
                p_value: Some(p),
                critical_value: None,
                is_normal: p > alpha,
            },
            None => NormalityResult::undefined(NormalityTest::ShapiroWilk, UndefinedReason::ZeroVariance),
        }
    } else {
        match anderson_darling(values) {
            Some((a2, critical)) => NormalityResult {
                test: NormalityTest::AndersonDarling,
                statistic: Statistic::from_value(a2),
                p_value: None,
                critical_value: Some(critical),
                is_normal: a2 < critical,
            },
            None => NormalityResult::undefined(NormalityTest::AndersonDarling, UndefinedReason::ZeroVariance),
        }
    }
}

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Shapiro-Wilk W and its p-value. `None` for fewer than 3 values or a
/// constant sample.
pub fn shapiro_wilk(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let mut x = values.to_vec();
    sort_floats(&mut x);
    if x[n - 1] - x[0] <= f64::EPSILON * x[n - 1].abs().max(1.0) {
        return None;
    }

    let a = shapiro_wilk_coefficients(n)?;
    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    if ssq <= 0.0 {
        return None;
    }
    let numerator: f64 = a.iter().zip(x.iter()).map(|(ai, xi)| ai * xi).sum();
    let w = (numerator * numerator / ssq).min(1.0);

    Some((w, shapiro_wilk_p_value(w, n)?))
}

/// Antisymmetric weights `a_1..a_n` for an ordered sample of size `n`.
fn shapiro_wilk_coefficients(n: usize) -> Option<Vec<f64>> {
    if n == 3 {
        let s = 0.5f64.sqrt();
        return Some(vec![-s, 0.0, s]);
    }

    let normal = standard_normal()?;
    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2: f64 = m.iter().map(|v| v * v).sum();
    let ssumm2 = summ2.sqrt();
    let u = 1.0 / nf.sqrt();

    let mut a = vec![0.0; n];
    let an = poly(&SW_C1, u) + m[n - 1] / ssumm2;
    a[n - 1] = an;
    a[0] = -an;

    if n > 5 {
        let an1 = poly(&SW_C2, u) + m[n - 2] / ssumm2;
        let phi = (summ2 - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * an.powi(2) - 2.0 * an1.powi(2));
        a[n - 2] = an1;
        a[1] = -an1;
        for i in 2..n - 2 {
            a[i] = m[i] / phi.sqrt();
        }
    } else {
        let phi = (summ2 - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * an.powi(2));
        for i in 1..n - 1 {
            a[i] = m[i] / phi.sqrt();
        }
    }

    Some(a)
}

fn shapiro_wilk_p_value(w: f64, n: usize) -> Option<f64> {
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return Some(p.clamp(0.0, 1.0));
    }

    let normal = standard_normal()?;
    let nf = n as f64;
    if w >= 1.0 {
        return Some(1.0);
    }
    let w1 = (1.0 - w).ln();

    let (y, mu, sigma) = if n <= 11 {
        let gamma = poly(&SW_GAMMA, nf);
        if w1 >= gamma {
            return Some(0.0);
        }
        (
            -(gamma - w1).ln(),
            poly(&SW_SMALL_MEAN, nf),
            poly(&SW_SMALL_SIGMA, nf).exp(),
        )
    } else {
        let ln_n = nf.ln();
        (w1, poly(&SW_LARGE_MEAN, ln_n), poly(&SW_LARGE_SIGMA, ln_n).exp())
    };

    Some((1.0 - normal.cdf((y - mu) / sigma)).clamp(0.0, 1.0))
}

/// Anderson-Darling A² and the 5% critical value adjusted for sample size.
/// `None` for fewer than 3 values or zero variance.
pub fn anderson_darling(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0)).sqrt();
    if std.is_nan() || std <= 0.0 {
        return None;
    }

    let normal = standard_normal()?;
    let mut z: Vec<f64> = values.iter().map(|v| (v - mean) / std).collect();
    sort_floats(&mut z);

    let tail = f64::MIN_POSITIVE;
    let sum: f64 = (0..n)
        .map(|i| {
            let lower = normal.cdf(z[i]).max(tail).ln();
            let upper = (1.0 - normal.cdf(z[n - 1 - i])).max(tail).ln();
            (2.0 * (i as f64 + 1.0) - 1.0) * (lower + upper)
        })
        .sum();

    let a2 = -nf - sum / nf;
    let critical = 0.787 / (1.0 + 4.0 / nf - 25.0 / (nf * nf));
    Some((a2, critical))
}
