//! Numeric building blocks shared by both statistic presets.
//!
//! All functions return `None` rather than `NaN`/`inf` when their inputs do
//! not support a result.

use crate::table::{IndexRow, Period};
use std::cmp::Ordering;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sum_squared_deviation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    Some(values.iter().map(|v| (v - avg).powi(2)).sum())
}

/// Standard deviation with divisor `n`.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let ss = sum_squared_deviation(values)?;
    Some((ss / values.len() as f64).sqrt())
}

/// Standard deviation with divisor `n - 1`; needs two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let ss = sum_squared_deviation(values)?;
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Least-squares slope of `values` against their 0-based position.
pub fn ols_slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values)?;
    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (idx, y)| {
            let dx = idx as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
    (den > 0.0).then(|| num / den)
}

/// Mean of the non-missing cells of `row` in the column range.
pub fn window_mean(row: &IndexRow, columns: std::ops::Range<usize>) -> Option<f64> {
    let values: Vec<f64> = row.values[columns].iter().flatten().copied().collect();
    mean(&values)
}

/// Percent change from the mean of the `window` columns preceding the last
/// `window` columns to the mean of the last `window` columns. Needs at least
/// `2 * window` columns.
pub fn trailing_window_change(row: &IndexRow, window: usize) -> Option<f64> {
    let len = row.values.len();
    if window == 0 || len < window * 2 {
        return None;
    }
    let recent = window_mean(row, len - window..len)?;
    let previous = window_mean(row, len - window * 2..len - window)?;
    percent_change(previous, recent)
}

/// Percent change from `base` to `current`; undefined for non-positive bases.
pub fn percent_change(base: f64, current: f64) -> Option<f64> {
    (base > 0.0).then(|| (current - base) / base * 100.0)
}

/// Year-over-year percent change for each requested column that has a
/// same-month partner one year earlier, both values present and a positive
/// prior value. Each change is rounded to one decimal place.
pub fn yoy_series(
    periods: &[Period],
    row: &IndexRow,
    columns: std::ops::Range<usize>,
) -> Vec<(Period, f64)> {
    columns
        .filter_map(|idx| {
            let period = periods[idx];
            let prior = period.year_ago()?;
            let prior_idx = periods.binary_search(&prior).ok()?;
            let current = row.values[idx]?;
            let base = row.values[prior_idx]?;
            percent_change(base, current).map(|change| (period, round_to(change, 1)))
        })
        .collect()
}

/// Round to `places` decimal places, ties to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Index of the largest item; the first of equal maxima wins.
pub fn first_max_by<T, F>(items: &[T], key: F) -> Option<usize>
where
    F: Fn(&T) -> f64,
{
    first_extreme_by(items, key, Ordering::Greater)
}

/// Index of the smallest item; the first of equal minima wins.
pub fn first_min_by<T, F>(items: &[T], key: F) -> Option<usize>
where
    F: Fn(&T) -> f64,
{
    first_extreme_by(items, key, Ordering::Less)
}

fn first_extreme_by<T, F>(items: &[T], key: F, wins: Ordering) -> Option<usize>
where
    F: Fn(&T) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, item) in items.iter().enumerate() {
        let value = key(item);
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value.partial_cmp(&current) != Some(wins) => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}
