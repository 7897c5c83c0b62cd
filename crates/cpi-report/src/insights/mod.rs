//! Headline findings for arbitrary uploaded tables.
//!
//! The engine looks only at column types and the first numeric and text
//! columns, so it works on any sheet without a schema. At most
//! [`MAX_INSIGHTS`] records are produced.

mod views;

pub use views::{ChartValue, ColumnMap, InsightKind, InsightPayload, InsightRecord, TrendLabel};

use crate::statistics::primitives::{first_max_by, mean, sample_std};
use crate::table::{RawCell, RawTable};
use serde_json::{Map, Value};
use tracing::debug;

pub const MAX_INSIGHTS: usize = 5;
const STATISTICS_COLUMNS: usize = 5;
const MAX_VALUE_CHART_ROWS: usize = 20;
const TREND_CHART_ROWS: usize = 30;
const DISTRIBUTION_BUCKETS: usize = 10;
const HISTOGRAM_VALUES: usize = 50;
/// Largest magnitude at which every whole `f64` is still exact in `i64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Inferred type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-empty cell is a number; blank columns count as numeric.
    Numeric,
    /// Every cell is a boolean with no blanks.
    Bool,
    /// Every non-empty cell is a workbook date.
    Temporal,
    Text,
}

impl ColumnKind {
    pub fn infer<'a>(cells: impl Iterator<Item = &'a RawCell>) -> Self {
        let mut numeric = true;
        let mut boolean = true;
        let mut temporal = true;
        let mut saw_blank = false;
        for cell in cells {
            match cell {
                RawCell::Empty => saw_blank = true,
                RawCell::Number(_) => {
                    boolean = false;
                    temporal = false;
                }
                RawCell::Bool(_) => {
                    numeric = false;
                    temporal = false;
                }
                RawCell::Date(_) => {
                    numeric = false;
                    boolean = false;
                }
                RawCell::Text(_) => {
                    numeric = false;
                    boolean = false;
                    temporal = false;
                }
            }
        }
        if numeric {
            Self::Numeric
        } else if boolean && !saw_blank {
            Self::Bool
        } else if temporal {
            Self::Temporal
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct InsightEngine;

impl InsightEngine {
    pub const fn new() -> Self {
        Self
    }

    pub fn analyze(&self, table: &RawTable) -> Vec<InsightRecord> {
        if table.row_count() == 0 || table.column_count() == 0 {
            return vec![InsightRecord {
                title: "데이터 없음".to_string(),
                description: "업로드된 파일에 데이터가 없습니다.".to_string(),
                payload: InsightPayload::Summary {
                    rows: 0,
                    columns: 0,
                    column_names: Vec::new(),
                },
            }];
        }

        let kinds: Vec<ColumnKind> = (0..table.column_count())
            .map(|idx| ColumnKind::infer(table.column(idx)))
            .collect();
        let numeric: Vec<usize> = columns_of(&kinds, ColumnKind::Numeric);
        let text: Vec<usize> = columns_of(&kinds, ColumnKind::Text);

        let mut insights = vec![summary(table)];
        if let Some(&first) = numeric.first() {
            insights.extend(max_value(table, first));
            insights.extend(statistics(table, &numeric));
            insights.extend(trend(table, first));
        }
        if let Some(&first) = text.first() {
            insights.extend(distribution(table, first));
        } else if let Some(&first) = numeric.first() {
            if insights.len() < MAX_INSIGHTS {
                insights.extend(histogram(table, first));
            }
        }

        insights.truncate(MAX_INSIGHTS);
        debug!(
            rows = table.row_count(),
            numeric_columns = numeric.len(),
            text_columns = text.len(),
            insights = insights.len(),
            "analyzed uploaded table"
        );
        insights
    }
}

/// Shorthand for [`InsightEngine::analyze`].
pub fn analyze(table: &RawTable) -> Vec<InsightRecord> {
    InsightEngine::new().analyze(table)
}

fn columns_of(kinds: &[ColumnKind], kind: ColumnKind) -> Vec<usize> {
    kinds
        .iter()
        .enumerate()
        .filter(|(_, candidate)| **candidate == kind)
        .map(|(idx, _)| idx)
        .collect()
}

fn valid_numbers(table: &RawTable, column: usize) -> Vec<(usize, f64)> {
    table
        .column(column)
        .enumerate()
        .filter_map(|(row, cell)| cell.as_number().map(|value| (row, value)))
        .collect()
}

/// Whole numbers with no blanks; such columns chart as integers.
fn is_integral(table: &RawTable, column: usize) -> bool {
    table.column(column).all(|cell| match cell {
        RawCell::Number(value) => value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER,
        _ => false,
    })
}

fn zero_filled(
    table: &RawTable,
    column: usize,
    limit: usize,
) -> impl Iterator<Item = ChartValue> + '_ {
    let integral = is_integral(table, column);
    table
        .column(column)
        .take(limit)
        .map(move |cell| ChartValue::new(cell.as_number().unwrap_or(0.0), integral))
}

fn summary(table: &RawTable) -> InsightRecord {
    InsightRecord {
        title: "데이터셋 개요".to_string(),
        description: format!(
            "총 {} 행, {} 열의 데이터가 포함되어 있습니다.",
            table.row_count(),
            table.column_count()
        ),
        payload: InsightPayload::Summary {
            rows: table.row_count(),
            columns: table.column_count(),
            column_names: table.headers().to_vec(),
        },
    }
}

fn max_value(table: &RawTable, column: usize) -> Option<InsightRecord> {
    let valid = valid_numbers(table, column);
    let (index, value) = valid[first_max_by(&valid, |(_, value)| *value)?];
    let name = table.headers()[column].clone();
    let chart_data = zero_filled(table, column, MAX_VALUE_CHART_ROWS)
        .map(|value| {
            let mut point = Map::new();
            point.insert(name.clone(), Value::from(value));
            point
        })
        .collect();

    Some(InsightRecord {
        title: "최고 수치 기록".to_string(),
        description: format!("{name} 컬럼에서 최고값 {value:.2}을(를) 기록했습니다."),
        payload: InsightPayload::MaxValue {
            column: name,
            value,
            index,
            chart_data,
        },
    })
}

fn statistics(table: &RawTable, numeric: &[usize]) -> Option<InsightRecord> {
    let mut means = Vec::new();
    let mut stds = Vec::new();
    for &column in numeric.iter().take(STATISTICS_COLUMNS) {
        let name = &table.headers()[column];
        let values: Vec<f64> = valid_numbers(table, column)
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        if let Some(avg) = mean(&values) {
            means.push((name.clone(), avg));
        }
        if let Some(std) = sample_std(&values) {
            stds.push((name.clone(), std));
        }
    }
    if means.is_empty() {
        return None;
    }

    Some(InsightRecord {
        title: "주요 통계 지표".to_string(),
        description: "숫자형 데이터의 평균값과 표준편차를 분석했습니다.".to_string(),
        payload: InsightPayload::Statistics {
            means: means.into_iter().collect(),
            stds: stds.into_iter().collect(),
        },
    })
}

fn trend(table: &RawTable, column: usize) -> Option<InsightRecord> {
    if table.row_count() < 2 {
        return None;
    }
    let valid = valid_numbers(table, column);
    if valid.len() < 2 {
        return None;
    }
    let first = valid[0].1;
    let last = valid[valid.len() - 1].1;
    let trend = TrendLabel::between(first, last);
    let change = last - first;
    let name = table.headers()[column].clone();

    Some(InsightRecord {
        title: "데이터 추세".to_string(),
        description: format!(
            "{name} 항목이 {} 추세를 보이며, 변화량은 {change:.2}입니다.",
            trend.label()
        ),
        payload: InsightPayload::Trend {
            chart_data: zero_filled(table, column, TREND_CHART_ROWS).collect(),
            column: name,
            trend,
            change,
        },
    })
}

fn distribution(table: &RawTable, column: usize) -> Option<InsightRecord> {
    // Counts keep first-appearance order so a stable sort breaks ties by it.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for cell in table.column(column).filter(|cell| !cell.is_empty()) {
        let key = cell.display();
        match counts.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(DISTRIBUTION_BUCKETS);

    let top = counts.first()?.0.clone();
    let name = table.headers()[column].clone();
    Some(InsightRecord {
        title: "카테고리 분포".to_string(),
        description: format!(
            "{name} 항목의 분포를 분석했습니다. 가장 많이 나타난 항목은 \"{top}\"입니다."
        ),
        payload: InsightPayload::Distribution {
            column: name,
            distribution: counts.into_iter().collect(),
        },
    })
}

fn histogram(table: &RawTable, column: usize) -> Option<InsightRecord> {
    let integral = is_integral(table, column);
    let values: Vec<ChartValue> = valid_numbers(table, column)
        .into_iter()
        .take(HISTOGRAM_VALUES)
        .map(|(_, value)| ChartValue::new(value, integral))
        .collect();
    if values.is_empty() {
        return None;
    }
    let name = table.headers()[column].clone();
    Some(InsightRecord {
        title: "데이터 분포 분석".to_string(),
        description: format!("{name} 데이터의 분포를 히스토그램으로 나타냈습니다."),
        payload: InsightPayload::Histogram {
            column: name,
            values,
        },
    })
}
