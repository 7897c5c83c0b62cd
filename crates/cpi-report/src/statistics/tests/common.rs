use std::collections::BTreeMap;

use crate::table::{IndexTable, Period};

pub(super) const TOTAL: &str = "0 총지수";

pub(super) fn period(label: &str) -> Period {
    label.parse().expect("valid period")
}

pub(super) fn series(points: &[(&str, Option<f64>)]) -> BTreeMap<Period, Option<f64>> {
    points
        .iter()
        .map(|(label, value)| (period(label), *value))
        .collect()
}

pub(super) type SeriesRow = (String, String, BTreeMap<Period, Option<f64>>);

pub(super) fn row(category: &str, points: &[(&str, Option<f64>)]) -> SeriesRow {
    ("전국".to_string(), category.to_string(), series(points))
}

pub(super) fn table(rows: Vec<SeriesRow>) -> IndexTable {
    IndexTable::from_series(TOTAL, rows)
}

/// `count` consecutive months starting at `start`, valued by `value(i)`.
pub(super) fn monthly(
    category: &str,
    start: &str,
    count: usize,
    value: impl Fn(usize) -> Option<f64>,
) -> SeriesRow {
    let first = period(start);
    let points = (0..count)
        .map(|idx| {
            let offset = i32::try_from(idx).expect("small offset");
            (first.offset_months(offset).expect("in range"), value(idx))
        })
        .collect();
    ("전국".to_string(), category.to_string(), points)
}

pub(super) fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}
