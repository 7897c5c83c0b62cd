use super::primitives::{
    first_max_by, first_min_by, mean, ols_slope, round_to, sample_std, trailing_window_change,
    yoy_series,
};
use super::record::{StatisticKey, StatisticRecord, StatisticsResult, TrendDirection, Unit};
use crate::table::{IndexRow, IndexTable, Period};

const RECENT_YOY_COLUMNS: usize = 3;
const TREND_WINDOW: usize = 6;

pub(super) fn compute(table: &IndexTable, total: &IndexRow, result: &mut StatisticsResult) {
    let periods = table.periods();
    let values = total.valid_values();

    let recent_yoy: Vec<f64> = yoy_series(periods, total, table.last_columns(RECENT_YOY_COLUMNS))
        .into_iter()
        .map(|(_, change)| change)
        .collect();
    if let Some(avg) = mean(&recent_yoy) {
        result.insert(
            StatisticKey::Recent3mAvgYoyGrowth,
            StatisticRecord::Scalar {
                value: round_to(avg, 2),
                unit: Some(Unit::Percent),
                description: "최근 3개월 평균 증가율 (전년동월비)".to_string(),
            },
        );
    }

    let yoy = yoy_series(periods, total, 0..periods.len());
    if let Some(idx) = first_max_by(&yoy, |(_, change)| *change) {
        let (date, value) = yoy[idx];
        result.insert(
            StatisticKey::MaxYoyMonth,
            StatisticRecord::Dated {
                value,
                date,
                unit: Some(Unit::Percent),
                description: "최고 상승률을 기록한 달 (전년동월비)".to_string(),
            },
        );
    }
    if let Some(idx) = first_min_by(&yoy, |(_, change)| *change) {
        let (date, value) = yoy[idx];
        result.insert(
            StatisticKey::MinYoyMonth,
            StatisticRecord::Dated {
                value,
                date,
                unit: Some(Unit::Percent),
                description: "최저 상승률을 기록한 달 (전년동월비)".to_string(),
            },
        );
    }

    if let Some(slope) = ols_slope(&values) {
        result.insert(
            StatisticKey::LinearTrendSlope,
            StatisticRecord::Scalar {
                value: round_to(slope, 4),
                unit: Some(Unit::PerMonth),
                description: "물가 상승 추세 (선형 회귀 기울기)".to_string(),
            },
        );
    }

    let std = sample_std(&values);
    if let Some(std) = std {
        result.insert(
            StatisticKey::VolatilityIndex,
            StatisticRecord::Scalar {
                value: round_to(std, 2),
                unit: None,
                description: "물가지수 변동성 (표준편차)".to_string(),
            },
        );
    }

    let volatility = category_volatility(table);
    if let Some(idx) = first_max_by(&volatility, |(_, std)| *std) {
        let (category, std) = &volatility[idx];
        result.insert(
            StatisticKey::MaxVolatilityCategory,
            StatisticRecord::Category {
                category: category.clone(),
                value: round_to(*std, 2),
                unit: None,
                description: "가장 변동성이 큰 지출목적".to_string(),
            },
        );
    }
    if let Some(idx) = first_min_by(&volatility, |(_, std)| *std) {
        let (category, std) = &volatility[idx];
        result.insert(
            StatisticKey::MinVolatilityCategory,
            StatisticRecord::Category {
                category: category.clone(),
                value: round_to(*std, 2),
                unit: None,
                description: "가장 안정적인 지출목적".to_string(),
            },
        );
    }

    if let Some(score) = std.and_then(|std| stability_score(std, &values)) {
        result.insert(
            StatisticKey::StabilityScore,
            StatisticRecord::Scalar {
                value: round_to(score, 1),
                unit: Some(Unit::Points),
                description: "물가 안정성 점수 (0-100, 높을수록 안정적)".to_string(),
            },
        );
    }

    if let Some(change) = trailing_window_change(total, TREND_WINDOW) {
        result.insert(
            StatisticKey::Recent6mVsPrev6m,
            StatisticRecord::Trend {
                value: round_to(change, 2),
                unit: Unit::Percent,
                trend: TrendDirection::of_change(change),
                description: "최근 6개월 vs 이전 6개월 변화율".to_string(),
            },
        );
    }

    if let Some(record) = seasonal_pattern(periods, total) {
        result.insert(StatisticKey::SeasonalPattern, record);
    }
}

/// Sample standard deviation of every category row with at least two values.
fn category_volatility(table: &IndexTable) -> Vec<(String, f64)> {
    table
        .category_rows()
        .filter_map(|row| sample_std(&row.valid_values()).map(|std| (row.category.clone(), std)))
        .collect()
}

/// `100 - 100 * std / mean`, clamped to `[0, 100]`. Undefined for a flat
/// series or a non-positive mean.
fn stability_score(std: f64, values: &[f64]) -> Option<f64> {
    if std <= 0.0 {
        return None;
    }
    let avg = mean(values).filter(|avg| *avg > 0.0)?;
    Some((100.0 - std / avg * 100.0).clamp(0.0, 100.0))
}

fn seasonal_pattern(periods: &[Period], total: &IndexRow) -> Option<StatisticRecord> {
    // Buckets keep the order in which each calendar month first appears
    // among the period columns.
    let mut buckets: Vec<(Period, Vec<f64>)> = Vec::new();
    for (period, value) in periods.iter().zip(&total.values) {
        let idx = match buckets
            .iter()
            .position(|(first, _)| first.month() == period.month())
        {
            Some(idx) => idx,
            None => {
                buckets.push((*period, Vec::new()));
                buckets.len() - 1
            }
        };
        if let Some(value) = value {
            buckets[idx].1.push(*value);
        }
    }

    let averages: Vec<(Period, f64)> = buckets
        .iter()
        .filter_map(|(period, bucket)| mean(bucket).map(|avg| (*period, avg)))
        .collect();
    let highest = averages[first_max_by(&averages, |(_, avg)| *avg)?];
    let lowest = averages[first_min_by(&averages, |(_, avg)| *avg)?];

    Some(StatisticRecord::Seasonal {
        highest_month: highest.0.korean_month_name(),
        highest_value: round_to(highest.1, 2),
        lowest_month: lowest.0.korean_month_name(),
        lowest_value: round_to(lowest.1, 2),
        description: "계절성 패턴 (월별 평균 물가지수)".to_string(),
    })
}
