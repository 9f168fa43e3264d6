//! Hypothesis tests and effect sizes.
//!
//! All tests are two-sided and evaluated at [`SIGNIFICANCE_LEVEL`].
//! Distribution functions come from `statrs`.

use super::descriptive::{mean, sample_variance};
use crate::constants::{SHAPIRO_MAX_RELIABLE_N, SIGNIFICANCE_LEVEL};
use crate::error::{Result, RidershipError};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use std::fmt;
use tracing::warn;

/// Test statistic and its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    pub fn is_significant(&self) -> bool {
        self.p_value < SIGNIFICANCE_LEVEL
    }
}

/// Interpretation band of an effect size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectMagnitude {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EffectMagnitude::Small => "small effect",
            EffectMagnitude::Medium => "medium effect",
            EffectMagnitude::Large => "large effect",
            EffectMagnitude::VeryLarge => "very large effect",
        };
        f.write_str(label)
    }
}

fn band(value: f64, thresholds: [f64; 3]) -> EffectMagnitude {
    if value < thresholds[0] {
        EffectMagnitude::Small
    } else if value < thresholds[1] {
        EffectMagnitude::Medium
    } else if value < thresholds[2] {
        EffectMagnitude::Large
    } else {
        EffectMagnitude::VeryLarge
    }
}

/// Band of |d|: below 0.2, 0.5, 0.8, or above
pub fn interpret_cohens_d(d: f64) -> EffectMagnitude {
    band(d.abs(), [0.2, 0.5, 0.8])
}

/// Band of η²: below 0.01, 0.06, 0.14, or above
pub fn interpret_eta_squared(eta_squared: f64) -> EffectMagnitude {
    band(eta_squared, [0.01, 0.06, 0.14])
}

fn statistics_error(e: impl fmt::Display) -> RidershipError {
    RidershipError::Statistics {
        message: e.to_string(),
    }
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(statistics_error)
}

fn two_sided_t(t: f64, dof: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, dof).map_err(statistics_error)?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Polynomial with coefficients in increasing degree
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk normality test, with Royston's approximation of the
/// coefficients and of the p-value.
///
/// Needs at least 3 observations that are not all equal. Above 5000
/// observations the p-value is computed but may be inaccurate.
pub fn shapiro_wilk(values: &[f64]) -> Result<TestResult> {
    const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
    const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
    const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
    const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
    const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
    const G: [f64; 2] = [-2.273, 0.459];

    let n = values.len();
    if n < 3 {
        return Err(RidershipError::insufficient_data(
            "Shapiro-Wilk",
            format!("{} observations, at least 3 required", n),
        ));
    }
    if n > SHAPIRO_MAX_RELIABLE_N {
        warn!(
            "Shapiro-Wilk p-value may be inaccurate for n = {} (> {})",
            n, SHAPIRO_MAX_RELIABLE_N
        );
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    if sorted[n - 1] - sorted[0] <= 0.0 {
        return Err(RidershipError::insufficient_data(
            "Shapiro-Wilk",
            "all observations are equal",
        ));
    }

    let normal = standard_normal()?;
    let an = n as f64;
    let half = n / 2;

    // Coefficients for the lower half, as positive weights
    let mut a = vec![0.0; half];
    if n == 3 {
        a[0] = 0.5f64.sqrt();
    } else {
        let m: Vec<f64> = (1..=half)
            .map(|i| -normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
            .collect();
        let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
        let ssumm2 = summ2.sqrt();
        let rsn = 1.0 / an.sqrt();

        let a1 = poly(&C1, rsn) + m[0] / ssumm2;
        let (first_scaled, fac) = if n > 5 {
            let a2 = poly(&C2, rsn) + m[1] / ssumm2;
            let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
                / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
            .sqrt();
            a[1] = a2;
            (2, fac)
        } else {
            let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
            (1, fac)
        };
        a[0] = a1;
        for i in first_scaled..half {
            a[i] = m[i] / fac;
        }
    }

    let sample_mean = sorted.iter().sum::<f64>() / an;
    let ss: f64 = sorted.iter().map(|v| (v - sample_mean).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (sorted[n - 1 - i] - sorted[i]))
        .sum();
    let w = (numerator * numerator / ss).min(1.0);

    let p_value = if n == 3 {
        let stqr = std::f64::consts::FRAC_PI_3;
        (6.0 / std::f64::consts::PI * (w.sqrt().asin() - stqr)).clamp(0.0, 1.0)
    } else {
        let w1 = (1.0 - w).ln();
        let (y, m, s) = if n <= 11 {
            let gamma = poly(&G, an);
            if w1 >= gamma {
                return Ok(TestResult {
                    statistic: w,
                    p_value: 0.0,
                });
            }
            (-(gamma - w1).ln(), poly(&C3, an), poly(&C4, an).exp())
        } else {
            let ln_n = an.ln();
            (w1, poly(&C5, ln_n), poly(&C6, ln_n).exp())
        };
        normal.sf((y - m) / s)
    };

    Ok(TestResult {
        statistic: w,
        p_value,
    })
}

fn require_spread(test: &'static str, values: &[f64], name: &str) -> Result<f64> {
    sample_variance(values).ok_or_else(|| {
        RidershipError::insufficient_data(
            test,
            format!("{} has {} observations, at least 2 required", name, values.len()),
        )
    })
}

/// Welch's t-test for two independent samples with unequal variances
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TestResult> {
    const TEST: &str = "Welch t-test";
    let var_a = require_spread(TEST, a, "first sample")?;
    let var_b = require_spread(TEST, b, "second sample")?;
    let (n_a, n_b) = (a.len() as f64, b.len() as f64);

    let se_a = var_a / n_a;
    let se_b = var_b / n_b;
    let se = (se_a + se_b).sqrt();
    if se == 0.0 {
        return Err(RidershipError::insufficient_data(TEST, "both samples have zero variance"));
    }

    let diff = mean(a).unwrap_or_default() - mean(b).unwrap_or_default();
    let t = diff / se;
    let dof = (se_a + se_b).powi(2) / (se_a.powi(2) / (n_a - 1.0) + se_b.powi(2) / (n_b - 1.0));

    Ok(TestResult {
        statistic: t,
        p_value: two_sided_t(t, dof)?,
    })
}

/// Average ranks (1-based) of `values`, ties sharing their mean rank, plus
/// the tie correction term Σ(t³ - t)
fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_term = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        let t = (end - start) as f64;
        tie_term += t * t * t - t;
        start = end;
    }

    (ranks, tie_term)
}

/// Two-sided Mann-Whitney U test.
///
/// The statistic is U of the first sample. The p-value uses the normal
/// approximation with tie correction and a 0.5 continuity correction.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TestResult> {
    const TEST: &str = "Mann-Whitney U";
    if a.is_empty() || b.is_empty() {
        return Err(RidershipError::insufficient_data(TEST, "both samples must be non-empty"));
    }

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let combined: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, tie_term) = average_ranks(&combined);

    let rank_sum_a: f64 = ranks[..a.len()].iter().sum();
    let u1 = rank_sum_a - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;

    let n = n1 + n2;
    let sigma = (n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
    if !(sigma > 0.0) {
        return Err(RidershipError::insufficient_data(TEST, "all observations are tied"));
    }

    let z = (u1.max(u2) - n1 * n2 / 2.0 - 0.5) / sigma;
    let p_value = (2.0 * standard_normal()?.sf(z)).min(1.0);

    Ok(TestResult {
        statistic: u1,
        p_value,
    })
}

struct SumsOfSquares {
    between: f64,
    total: f64,
    observations: usize,
}

fn sums_of_squares(test: &'static str, groups: &[&[f64]]) -> Result<SumsOfSquares> {
    if groups.len() < 2 || groups.iter().any(|g| g.is_empty()) {
        return Err(RidershipError::insufficient_data(
            test,
            "at least two non-empty groups required",
        ));
    }

    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand_mean = all.iter().sum::<f64>() / all.len() as f64;

    let between = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g).unwrap_or_default() - grand_mean).powi(2))
        .sum();
    let total = all.iter().map(|v| (v - grand_mean).powi(2)).sum();

    Ok(SumsOfSquares {
        between,
        total,
        observations: all.len(),
    })
}

/// One-way analysis of variance across independent groups
pub fn one_way_anova(groups: &[&[f64]]) -> Result<TestResult> {
    const TEST: &str = "ANOVA";
    let ss = sums_of_squares(TEST, groups)?;

    let k = groups.len();
    if ss.observations <= k {
        return Err(RidershipError::insufficient_data(
            TEST,
            "more observations than groups required",
        ));
    }

    let within = ss.total - ss.between;
    if within <= 0.0 {
        return Err(RidershipError::insufficient_data(TEST, "zero variance within groups"));
    }

    let df_between = (k - 1) as f64;
    let df_within = (ss.observations - k) as f64;
    let f = (ss.between / df_between) / (within / df_within);

    let dist = FisherSnedecor::new(df_between, df_within).map_err(statistics_error)?;
    Ok(TestResult {
        statistic: f,
        p_value: dist.sf(f),
    })
}

/// Share of total variance explained by group membership
pub fn eta_squared(groups: &[&[f64]]) -> Result<f64> {
    const TEST: &str = "eta squared";
    let ss = sums_of_squares(TEST, groups)?;
    if ss.total <= 0.0 {
        return Err(RidershipError::insufficient_data(TEST, "zero total variance"));
    }
    Ok(ss.between / ss.total)
}

/// Standardized mean difference using the pooled sample standard deviation
pub fn cohens_d(a: &[f64], b: &[f64]) -> Result<f64> {
    const TEST: &str = "Cohen's d";
    let var_a = require_spread(TEST, a, "first sample")?;
    let var_b = require_spread(TEST, b, "second sample")?;
    let (n_a, n_b) = (a.len() as f64, b.len() as f64);

    let pooled = (((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / (n_a + n_b - 2.0)).sqrt();
    if pooled == 0.0 {
        return Err(RidershipError::insufficient_data(TEST, "zero pooled variance"));
    }

    Ok((mean(a).unwrap_or_default() - mean(b).unwrap_or_default()) / pooled)
}

/// Pearson correlation coefficient, or `None` with fewer than two pairs or
/// a constant series
pub fn pearson_r(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let (dx, dy) = (xi - mx, yi - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Pearson correlation with a two-sided test of zero correlation
pub fn pearson(x: &[f64], y: &[f64]) -> Result<TestResult> {
    const TEST: &str = "Pearson correlation";
    if x.len() != y.len() {
        return Err(RidershipError::insufficient_data(
            TEST,
            format!("series lengths differ ({} vs {})", x.len(), y.len()),
        ));
    }
    if x.len() < 3 {
        return Err(RidershipError::insufficient_data(
            TEST,
            "at least 3 paired observations required",
        ));
    }

    let r = pearson_r(x, y)
        .ok_or_else(|| RidershipError::insufficient_data(TEST, "a series is constant"))?;

    let dof = (x.len() - 2) as f64;
    let p_value = if r.abs() >= 1.0 {
        0.0
    } else {
        two_sided_t(r * (dof / (1.0 - r * r)).sqrt(), dof)?
    };

    Ok(TestResult {
        statistic: r,
        p_value,
    })
}
