//! Per-category arithmetic over sparse series.
//!
//! Everything here returns raw numbers; `None` marks a statistic with no
//! input to work on (rendered as "no data" by the table builder).

use crate::series::{BUCKET_SECS, TimeSeries};
use serde::Serialize;

/// Statistics for continuous metrics (transactions, connect/page/request)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuousStats {
    pub highest_mean: Option<f64>,
    pub lowest_mean: Option<f64>,
    pub mean: Option<f64>,
    pub highest_rate: Option<f64>,
    pub mean_rate: Option<f64>,
    pub total: i64,
}

/// Statistics for plain counters (HTTP codes, matches, errors)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterStats {
    pub highest_rate: Option<f64>,
    pub mean_rate: Option<f64>,
    pub total: i64,
}

/// Statistics for byte counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStats {
    /// Highest bytes per second over the non-empty buckets
    pub highest_rate: Option<f64>,
    pub total_bytes: i64,
}

fn rate(count: i64) -> f64 {
    count as f64 / BUCKET_SECS as f64
}

fn max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().reduce(f64::max)
}

fn min(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().reduce(f64::min)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn continuous_stats(series: &TimeSeries) -> ContinuousStats {
    // a zero-count bucket carries a meaningless mean
    let means: Vec<f64> = series
        .means
        .as_deref()
        .unwrap_or_default()
        .iter()
        .zip(&series.counts)
        .filter(|&(_, &count)| count != 0)
        .map(|(&mean, _)| mean)
        .collect();
    let rates: Vec<f64> = series.counts.iter().map(|&c| rate(c)).collect();

    ContinuousStats {
        highest_mean: max(means.iter().copied()),
        lowest_mean: min(means.iter().copied()),
        mean: mean(&means),
        highest_rate: max(rates.iter().copied()),
        mean_rate: mean(&rates),
        total: sum(&series.counts),
    }
}

/// Counter statistics; the mean rate spreads the total over the seconds
/// between the metric's first appearance and `end_timestamp`
pub fn counter_stats(series: &TimeSeries, end_timestamp: i64) -> CounterStats {
    let total = sum(&series.counts);
    let elapsed = end_timestamp.saturating_sub(series.first_timestamp);

    CounterStats {
        highest_rate: max(nonzero_rates(series)),
        mean_rate: (elapsed > 0).then(|| total as f64 / elapsed as f64),
        total,
    }
}

pub fn network_stats(series: &TimeSeries) -> NetworkStats {
    NetworkStats {
        highest_rate: max(nonzero_rates(series)),
        total_bytes: sum(&series.counts),
    }
}

/// Highest and lowest bucket mean
pub fn mean_range(series: &TimeSeries) -> (Option<f64>, Option<f64>) {
    let means = series.means.as_deref().unwrap_or_default();
    (max(means.iter().copied()), min(means.iter().copied()))
}

pub fn max_count(series: &TimeSeries) -> Option<i64> {
    series.counts.iter().copied().max()
}

/// Saturates instead of overflowing on absurd counts
fn sum(counts: &[i64]) -> i64 {
    counts.iter().copied().fold(0i64, i64::saturating_add)
}

fn nonzero_rates(series: &TimeSeries) -> impl Iterator<Item = f64> + '_ {
    series
        .counts
        .iter()
        .filter(|&&c| c != 0)
        .map(|&c| rate(c))
}
