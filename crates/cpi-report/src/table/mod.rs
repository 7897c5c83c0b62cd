//! Tabular model shared by the loaders and both engines.
//!
//! Every source first produces a [`RawTable`]; the price-index path then
//! narrows it into an [`IndexTable`] with chronologically sorted [`Period`]
//! columns and numeric-or-missing cells.

mod period;
mod raw;

pub use period::{Period, PeriodParseError};
pub use raw::{format_float, RawCell, RawTable};

use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_REGION_COLUMN: &str = "시도별";
pub const DEFAULT_CATEGORY_COLUMN: &str = "지출목적별";
pub const DEFAULT_TOTAL_INDEX_LABEL: &str = "0 총지수";

/// Column names and the total-index marker used to interpret a raw table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLayout {
    pub region_column: String,
    pub category_column: String,
    pub total_index_label: String,
}

impl Default for IndexLayout {
    fn default() -> Self {
        Self {
            region_column: DEFAULT_REGION_COLUMN.to_string(),
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            total_index_label: DEFAULT_TOTAL_INDEX_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("no YYYY.MM period columns found")]
    NoPeriods,
}

/// One category row; `values` is aligned with [`IndexTable::periods`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRow {
    pub region: String,
    pub category: String,
    pub values: Vec<Option<f64>>,
}

impl IndexRow {
    /// Non-missing values in period order.
    pub fn valid_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    /// Non-missing `(period, value)` pairs in period order.
    pub fn observations<'a>(
        &'a self,
        periods: &'a [Period],
    ) -> impl Iterator<Item = (Period, f64)> + 'a {
        periods
            .iter()
            .zip(&self.values)
            .filter_map(|(period, value)| value.map(|v| (*period, v)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexTable {
    periods: Vec<Period>,
    rows: Vec<IndexRow>,
    total_index_label: String,
}

impl IndexTable {
    /// Build from rows keyed by period. Periods are sorted and deduplicated;
    /// rows lacking a period get a missing cell there.
    pub fn from_series(
        total_index_label: impl Into<String>,
        series: Vec<(String, String, BTreeMap<Period, Option<f64>>)>,
    ) -> Self {
        let mut periods: Vec<Period> = series
            .iter()
            .flat_map(|(_, _, values)| values.keys().copied())
            .collect();
        periods.sort();
        periods.dedup();

        let rows = series
            .into_iter()
            .map(|(region, category, values)| IndexRow {
                region,
                category,
                values: periods
                    .iter()
                    .map(|period| values.get(period).copied().flatten())
                    .collect(),
            })
            .collect();

        Self {
            periods,
            rows,
            total_index_label: total_index_label.into(),
        }
    }

    /// Interpret a raw sheet: the region and category columns are located by
    /// name, every header that parses as `YYYY.MM` becomes a period column and
    /// any other column is ignored.
    pub fn from_raw(raw: &RawTable, layout: &IndexLayout) -> Result<Self, TableError> {
        let category_idx = raw
            .column_index(&layout.category_column)
            .ok_or_else(|| TableError::MissingColumn(layout.category_column.clone()))?;
        let region_idx = raw.column_index(&layout.region_column);

        let mut period_columns: BTreeMap<Period, usize> = BTreeMap::new();
        for (idx, header) in raw.headers().iter().enumerate() {
            match header.parse::<Period>() {
                Ok(period) => {
                    period_columns.entry(period).or_insert(idx);
                }
                Err(_) if idx != category_idx && Some(idx) != region_idx => {
                    debug!(column = %header, "ignoring non-period column");
                }
                Err(_) => {}
            }
        }
        if period_columns.is_empty() {
            return Err(TableError::NoPeriods);
        }

        let periods: Vec<Period> = period_columns.keys().copied().collect();
        let rows = raw
            .rows()
            .iter()
            .map(|row| IndexRow {
                region: region_idx
                    .map(|idx| row[idx].display().trim().to_string())
                    .unwrap_or_default(),
                category: row[category_idx].display().trim().to_string(),
                values: period_columns
                    .values()
                    .map(|&idx| row[idx].as_number())
                    .collect(),
            })
            .collect();

        Ok(Self {
            periods,
            rows,
            total_index_label: layout.total_index_label.clone(),
        })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn rows(&self) -> &[IndexRow] {
        &self.rows
    }

    pub fn total_index_label(&self) -> &str {
        &self.total_index_label
    }

    /// First row whose category equals the total-index marker.
    pub fn total_row(&self) -> Option<&IndexRow> {
        self.rows
            .iter()
            .find(|row| row.category == self.total_index_label)
    }

    /// Every named row other than the total index.
    pub fn category_rows(&self) -> impl Iterator<Item = &IndexRow> + '_ {
        self.rows
            .iter()
            .filter(|row| !row.category.is_empty() && row.category != self.total_index_label)
    }

    /// Positions of the last `n` period columns (all when fewer exist).
    pub fn last_columns(&self, n: usize) -> std::ops::Range<usize> {
        self.periods.len().saturating_sub(n)..self.periods.len()
    }
}
