//! Descriptive statistics of flow samples.

use crate::error::{Result, RidershipError};
use serde::Serialize;

/// Count, location and spread of one group's daily flows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for a single observation
    pub std_dev: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Variance with `n - 1` denominator
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Quantile of sorted data by linear interpolation between closest ranks
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn summarize(values: &[f64]) -> Result<GroupSummary> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let insufficient = || RidershipError::insufficient_data("summary", "no observations");
    let mean = mean(&sorted).ok_or_else(insufficient)?;
    let q = |p: f64| quantile(&sorted, p).ok_or_else(insufficient);

    Ok(GroupSummary {
        count: sorted.len(),
        mean,
        std_dev: sample_std_dev(&sorted),
        min: q(0.0)?,
        q1: q(0.25)?,
        median: q(0.5)?,
        q3: q(0.75)?,
        max: q(1.0)?,
    })
}
