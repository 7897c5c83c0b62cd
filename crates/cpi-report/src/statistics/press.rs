use super::primitives::{
    first_max_by, first_min_by, mean, percent_change, population_std, round_to,
    trailing_window_change, window_mean,
};
use super::record::{
    CategoryValue, StatisticKey, StatisticRecord, StatisticsResult, TrendDirection, Unit,
};
use crate::table::{IndexRow, IndexTable, Period};
use std::collections::BTreeMap;

const RECENT_YEAR_COLUMNS: usize = 12;
/// Months before the final column where the three-year window starts, so
/// the window covers the last 36 months.
const RECENT_YEARS_START_OFFSET: i32 = 35;
const TREND_WINDOW: usize = 6;
const TOP_CATEGORY_COUNT: usize = 3;

pub(super) fn compute(table: &IndexTable, total: &IndexRow, result: &mut StatisticsResult) {
    let periods = table.periods();
    let observations: Vec<(Period, f64)> = total.observations(periods).collect();
    let values: Vec<f64> = observations.iter().map(|(_, value)| *value).collect();

    if let Some(avg) = mean(&values) {
        result.insert(
            StatisticKey::OverallMean,
            StatisticRecord::Scalar {
                value: round_to(avg, 2),
                unit: None,
                description: "전체 기간 평균 소비자물가지수".to_string(),
            },
        );
    }

    if let Some(idx) = first_max_by(&observations, |(_, value)| *value) {
        let (date, value) = observations[idx];
        result.insert(
            StatisticKey::MaxIndex,
            StatisticRecord::Dated {
                value: round_to(value, 2),
                date,
                unit: None,
                description: "전체 기간 중 최고 물가지수".to_string(),
            },
        );
    }
    if let Some(idx) = first_min_by(&observations, |(_, value)| *value) {
        let (date, value) = observations[idx];
        result.insert(
            StatisticKey::MinIndex,
            StatisticRecord::Dated {
                value: round_to(value, 2),
                date,
                unit: None,
                description: "전체 기간 중 최저 물가지수".to_string(),
            },
        );
    }

    let recent = table.last_columns(RECENT_YEAR_COLUMNS);
    let window_label = match (periods.get(recent.start), periods.last()) {
        (Some(first), Some(last)) => format!("({first}~{last})"),
        _ => String::new(),
    };
    if let Some(avg) = window_mean(total, recent) {
        result.insert(
            StatisticKey::Recent1yMean,
            StatisticRecord::Scalar {
                value: round_to(avg, 2),
                unit: None,
                description: format!("최근 1년{window_label} 평균 물가지수"),
            },
        );
    }

    if let Some(avg) = recent_years_mean(periods, &observations) {
        result.insert(
            StatisticKey::Recent3yMean,
            StatisticRecord::Scalar {
                value: round_to(avg, 2),
                unit: None,
                description: "최근 3년 평균 물가지수".to_string(),
            },
        );
    }

    if let Some(growth) = annual_growth_rate(&observations) {
        result.insert(
            StatisticKey::AnnualGrowthRate,
            StatisticRecord::Scalar {
                value: round_to(growth, 2),
                unit: Some(Unit::Percent),
                description: "연평균 물가 상승률".to_string(),
            },
        );
    }

    if let Some(std) = population_std(&values) {
        result.insert(
            StatisticKey::Volatility,
            StatisticRecord::Scalar {
                value: round_to(std, 2),
                unit: None,
                description: "전체 기간 물가지수 표준편차 (변동성)".to_string(),
            },
        );
    }

    let growth = category_growth(table);
    if let Some(idx) = first_max_by(&growth, |(_, change)| *change) {
        let (category, change) = &growth[idx];
        result.insert(
            StatisticKey::TopGrowthCategory,
            StatisticRecord::Category {
                category: category.clone(),
                value: round_to(*change, 2),
                unit: Some(Unit::Percent),
                description: "전체 기간 중 가장 높은 상승률을 보인 지출목적".to_string(),
            },
        );
    }
    if let Some(idx) = first_min_by(&growth, |(_, change)| *change) {
        let (category, change) = &growth[idx];
        result.insert(
            StatisticKey::BottomGrowthCategory,
            StatisticRecord::Category {
                category: category.clone(),
                value: round_to(*change, 2),
                unit: Some(Unit::Percent),
                description: "전체 기간 중 가장 낮은 상승률을 보인 지출목적".to_string(),
            },
        );
    }

    let top = top_category_means(table, TOP_CATEGORY_COUNT);
    if !top.is_empty() {
        result.insert(
            StatisticKey::Top3CategoryMeans,
            StatisticRecord::Ranking {
                categories: top,
                description: "평균 물가지수가 가장 높은 지출목적 상위 3개".to_string(),
            },
        );
    }

    if let Some(change) = trailing_window_change(total, TREND_WINDOW) {
        result.insert(
            StatisticKey::RecentTrend,
            StatisticRecord::Trend {
                value: round_to(change, 2),
                unit: Unit::Percent,
                trend: TrendDirection::of_change(change),
                description: "최근 6개월 평균 대비 이전 6개월 대비 변화율".to_string(),
            },
        );
    }
}

/// Mean over the last 36 months up to and including the final period column.
fn recent_years_mean(periods: &[Period], observations: &[(Period, f64)]) -> Option<f64> {
    let cutoff = periods.last()?.offset_months(-RECENT_YEARS_START_OFFSET)?;
    let values: Vec<f64> = observations
        .iter()
        .filter(|(period, _)| *period >= cutoff)
        .map(|(_, value)| *value)
        .collect();
    mean(&values)
}

/// Mean percent change between consecutive calendar-year averages.
fn annual_growth_rate(observations: &[(Period, f64)]) -> Option<f64> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (period, value) in observations {
        by_year.entry(period.year()).or_default().push(*value);
    }
    let yearly: Vec<f64> = by_year.values().filter_map(|values| mean(values)).collect();
    if yearly.len() < 2 {
        return None;
    }
    let rates: Vec<f64> = yearly
        .windows(2)
        .filter_map(|pair| percent_change(pair[0], pair[1]))
        .collect();
    mean(&rates)
}

/// First-to-last percent change for each category with at least two values
/// and a positive first value.
fn category_growth(table: &IndexTable) -> Vec<(String, f64)> {
    table
        .category_rows()
        .filter_map(|row| {
            let values = row.valid_values();
            if values.len() < 2 {
                return None;
            }
            let change = percent_change(values[0], values[values.len() - 1])?;
            Some((row.category.clone(), change))
        })
        .collect()
}

fn top_category_means(table: &IndexTable, count: usize) -> Vec<CategoryValue> {
    let mut means: Vec<(String, f64)> = table
        .category_rows()
        .filter_map(|row| mean(&row.valid_values()).map(|avg| (row.category.clone(), avg)))
        .collect();
    // Stable sort keeps row order among equal means.
    means.sort_by(|a, b| b.1.total_cmp(&a.1));
    means
        .into_iter()
        .take(count)
        .map(|(name, value)| CategoryValue {
            name,
            value: round_to(value, 2),
        })
        .collect()
}
