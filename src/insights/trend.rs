use crate::model::{Period, Trend, TrendDirection, TrendPoint};
use crate::util::{next_period_start, period_label};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Bucket {
    pub commits: u64,
    pub lines_changed: u64,
}

/// Expands sparse buckets into one point per period between the first and last key.
pub(crate) fn fill_gaps(buckets: &BTreeMap<NaiveDate, Bucket>, period: Period) -> Vec<TrendPoint> {
    let (Some(first), Some(last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut cursor = *first;
    while cursor <= *last {
        let bucket = buckets.get(&cursor).copied().unwrap_or_default();
        points.push(TrendPoint {
            period_start: cursor,
            label: period_label(cursor, period),
            commits: bucket.commits,
            lines_changed: bucket.lines_changed,
        });
        match next_period_start(cursor, period) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    points
}

pub(crate) fn build_trend(buckets: &BTreeMap<NaiveDate, Bucket>, period: Period) -> Trend {
    let points = fill_gaps(buckets, period);
    let counts: Vec<f64> = points.iter().map(|p| p.commits as f64).collect();

    let direction = direction(&counts);
    let mean = mean(&counts);
    let std = sample_std(&counts, mean);
    let stability = if mean > 0.0 { 1.0 - std / mean } else { 0.0 };

    let peaks: Vec<&TrendPoint> = if points.len() < 2 {
        Vec::new()
    } else {
        points.iter().filter(|p| p.commits as f64 > mean + std).collect()
    };
    let peak_counts: Vec<f64> = peaks.iter().map(|p| p.commits as f64).collect();
    let peak_intensity = if peak_counts.is_empty() || mean == 0.0 {
        0.0
    } else {
        self::mean(&peak_counts) / mean
    };
    let peak_periods = peaks.iter().map(|p| p.label.clone()).collect();

    Trend {
        period,
        points,
        direction,
        average_per_period: mean,
        stability,
        peak_periods,
        peak_intensity,
    }
}

fn direction(counts: &[f64]) -> TrendDirection {
    if counts.len() < 2 {
        return TrendDirection::InsufficientData;
    }
    let non_decreasing = counts.windows(2).all(|w| w[0] <= w[1]);
    let non_increasing = counts.windows(2).all(|w| w[0] >= w[1]);
    match (non_decreasing, non_increasing) {
        (true, true) => TrendDirection::Flat,
        (true, false) => TrendDirection::Increasing,
        (false, true) => TrendDirection::Decreasing,
        (false, false) => TrendDirection::Fluctuating,
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
