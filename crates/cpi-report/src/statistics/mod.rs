//! Deterministic statistics over an [`IndexTable`].
//!
//! Two presets share one primitive library: the press-release set used for
//! the DOCX report and the year-over-year oriented set used by the consumer
//! dashboard. A missing or empty total-index row aborts the computation;
//! every other unmet precondition only drops the affected key.

mod interesting;
pub mod primitives;
mod press;
mod record;

pub use record::{
    CategoryValue, StatisticKey, StatisticRecord, StatisticsResult, TrendDirection, Unit,
};

use crate::table::IndexTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatisticsPreset {
    PressRelease,
    Interesting,
}

impl StatisticsPreset {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PressRelease => "press-release",
            Self::Interesting => "interesting",
        }
    }
}

impl fmt::Display for StatisticsPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatisticsPreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "press-release" | "press" => Ok(Self::PressRelease),
            "interesting" | "consumer" => Ok(Self::Interesting),
            other => Err(format!(
                "unknown statistics preset '{other}' (expected press-release or interesting)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatisticsError {
    #[error("total index row '{label}' not found")]
    MissingTotalIndex { label: String },
    #[error("total index row '{label}' has no numeric values")]
    EmptyTotalIndex { label: String },
}

#[derive(Debug, Clone, Copy)]
pub struct StatisticsEngine {
    preset: StatisticsPreset,
}

impl StatisticsEngine {
    pub const fn new(preset: StatisticsPreset) -> Self {
        Self { preset }
    }

    pub const fn preset(&self) -> StatisticsPreset {
        self.preset
    }

    pub fn compute(&self, table: &IndexTable) -> Result<StatisticsResult, StatisticsError> {
        let label = table.total_index_label().to_string();
        let total = table
            .total_row()
            .ok_or_else(|| StatisticsError::MissingTotalIndex {
                label: label.clone(),
            })?;
        if total.values.iter().all(Option::is_none) {
            return Err(StatisticsError::EmptyTotalIndex { label });
        }

        let mut result = StatisticsResult::default();
        match self.preset {
            StatisticsPreset::PressRelease => press::compute(table, total, &mut result),
            StatisticsPreset::Interesting => interesting::compute(table, total, &mut result),
        }

        debug!(
            preset = %self.preset,
            periods = table.periods().len(),
            statistics = result.len(),
            "computed statistics"
        );
        Ok(result)
    }
}

/// Shorthand for [`StatisticsEngine::compute`].
pub fn compute_statistics(
    table: &IndexTable,
    preset: StatisticsPreset,
) -> Result<StatisticsResult, StatisticsError> {
    StatisticsEngine::new(preset).compute(table)
}

#[cfg(test)]
mod tests;
