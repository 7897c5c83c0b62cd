use super::common::*;
use crate::statistics::{
    compute_statistics, StatisticKey, StatisticsError, StatisticsPreset, TrendDirection, Unit,
};

fn press(table: &crate::table::IndexTable) -> crate::statistics::StatisticsResult {
    compute_statistics(table, StatisticsPreset::PressRelease).expect("statistics")
}

#[test]
fn four_period_scenario_matches_hand_computation() {
    let result = press(&table(vec![row(
        TOTAL,
        &[
            ("2023.01", Some(100.0)),
            ("2023.02", Some(102.0)),
            ("2024.01", Some(104.0)),
            ("2024.02", Some(106.0)),
        ],
    )]));

    let mean = result.get(StatisticKey::OverallMean).expect("overall mean");
    assert_eq!(mean.value(), Some(103.0));

    let max = result.get(StatisticKey::MaxIndex).expect("max index");
    assert_eq!(max.value(), Some(106.0));
    assert_eq!(max.date(), Some(period("2024.02")));

    let min = result.get(StatisticKey::MinIndex).expect("min index");
    assert_eq!(min.date(), Some(period("2023.01")));

    let recent = result.get(StatisticKey::Recent1yMean).expect("recent 1y");
    assert_eq!(recent.value(), Some(103.0));
    assert_eq!(recent.description(), "최근 1년(2023.01~2024.02) 평균 물가지수");

    let growth = result.get(StatisticKey::AnnualGrowthRate).expect("growth");
    assert_eq!(growth.value(), Some(3.96));
    assert_eq!(growth.unit(), Some(Unit::Percent));

    assert!(!result.contains(StatisticKey::RecentTrend));
    assert!(!result.contains(StatisticKey::TopGrowthCategory));
}

#[test]
fn overall_mean_ignores_missing_cells_and_column_order() {
    let forward = press(&table(vec![row(
        TOTAL,
        &[
            ("2024.01", Some(100.0)),
            ("2024.02", None),
            ("2024.03", Some(104.0)),
            ("2024.04", Some(99.0)),
        ],
    )]));
    let shuffled = press(&table(vec![row(
        TOTAL,
        &[
            ("2024.04", Some(99.0)),
            ("2024.03", Some(104.0)),
            ("2024.01", Some(100.0)),
            ("2024.02", None),
        ],
    )]));

    let value = |result: &crate::statistics::StatisticsResult| {
        result
            .get(StatisticKey::OverallMean)
            .and_then(|record| record.value())
    };
    assert_eq!(value(&forward), Some(101.0));
    assert_eq!(value(&forward), value(&shuffled));
}

#[test]
fn extreme_ties_resolve_to_earliest_period() {
    let result = press(&table(vec![row(
        TOTAL,
        &[
            ("2024.03", Some(99.0)),
            ("2024.01", Some(105.0)),
            ("2024.02", Some(99.0)),
            ("2024.04", Some(105.0)),
        ],
    )]));

    let max = result.get(StatisticKey::MaxIndex).expect("max");
    assert_eq!(max.date(), Some(period("2024.01")));
    let min = result.get(StatisticKey::MinIndex).expect("min");
    assert_eq!(min.date(), Some(period("2024.02")));
}

#[test]
fn annual_growth_requires_two_years() {
    let single_year = press(&table(vec![row(
        TOTAL,
        &[("2024.01", Some(100.0)), ("2024.06", Some(103.0))],
    )]));
    assert!(!single_year.contains(StatisticKey::AnnualGrowthRate));

    let two_years = press(&table(vec![row(
        TOTAL,
        &[("2023.12", Some(100.0)), ("2024.01", Some(102.0))],
    )]));
    let growth = two_years
        .get(StatisticKey::AnnualGrowthRate)
        .and_then(|record| record.value())
        .expect("growth");
    assert!(growth.is_finite());
    assert_eq!(growth, 2.0);
}

#[test]
fn growth_categories_skip_short_and_non_positive_rows() {
    let result = press(&table(vec![
        row(TOTAL, &[("2024.01", Some(100.0)), ("2024.02", Some(101.0))]),
        row("01 식료품", &[("2024.01", Some(100.0)), ("2024.02", Some(105.0))]),
        row("02 주류", &[("2024.01", Some(100.0)), ("2024.02", Some(97.0))]),
        // Would dominate both extremes if it were eligible.
        row("03 의류", &[("2024.01", Some(0.0)), ("2024.02", Some(50.0))]),
        row("04 주택", &[("2024.01", None), ("2024.02", Some(500.0))]),
        row("05 통신", &[("2024.01", Some(-5.0)), ("2024.02", Some(-50.0))]),
    ]));

    let top = result.get(StatisticKey::TopGrowthCategory).expect("top");
    assert_eq!(top.category(), Some("01 식료품"));
    assert_eq!(top.value(), Some(5.0));

    let bottom = result
        .get(StatisticKey::BottomGrowthCategory)
        .expect("bottom");
    assert_eq!(bottom.category(), Some("02 주류"));
    assert_eq!(bottom.value(), Some(-3.0));
}

#[test]
fn top_three_categories_rank_by_mean_and_keep_row_order_on_ties() {
    let result = press(&table(vec![
        row(TOTAL, &[("2024.01", Some(100.0))]),
        row("A", &[("2024.01", Some(101.0))]),
        row("B", &[("2024.01", Some(110.0))]),
        row("C", &[("2024.01", Some(101.0))]),
        row("D", &[("2024.01", Some(90.0))]),
    ]));

    let names: Vec<&str> = result
        .get(StatisticKey::Top3CategoryMeans)
        .expect("top3")
        .categories()
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    assert_eq!(names, vec!["B", "A", "C"]);
}

#[test]
fn recent_windows_use_last_columns() {
    let result = press(&table(vec![monthly(TOTAL, "2021.01", 48, |idx| {
        Some(if idx < 42 { 100.0 } else { 110.0 })
    })]));

    let trend = result.get(StatisticKey::RecentTrend).expect("trend");
    assert_eq!(trend.value(), Some(10.0));
    assert_eq!(trend.trend(), Some(TrendDirection::Rising));

    let recent_1y = result
        .get(StatisticKey::Recent1yMean)
        .and_then(|record| record.value())
        .expect("recent 1y");
    assert_eq!(recent_1y, 105.0);

    // 2022.01 through 2024.12: 30 months at 100 and 6 at 110.
    let recent_3y = result
        .get(StatisticKey::Recent3yMean)
        .and_then(|record| record.value())
        .expect("recent 3y");
    assert!(close(recent_3y, 101.67));
}

#[test]
fn three_year_window_spans_thirty_six_months() {
    // 2022.01..2025.10; only 2022.11 onward falls inside the window.
    let result = press(&table(vec![monthly(TOTAL, "2022.01", 46, |idx| {
        Some(if idx < 10 { 50.0 } else { 100.0 })
    })]));

    let recent_3y = result
        .get(StatisticKey::Recent3yMean)
        .and_then(|record| record.value())
        .expect("recent 3y");
    assert_eq!(recent_3y, 100.0);
}

#[test]
fn volatility_is_population_deviation() {
    let result = press(&table(vec![row(
        TOTAL,
        &[
            ("2024.01", Some(2.0)),
            ("2024.02", Some(4.0)),
            ("2024.03", Some(4.0)),
            ("2024.04", Some(4.0)),
            ("2024.05", Some(5.0)),
            ("2024.06", Some(5.0)),
            ("2024.07", Some(7.0)),
            ("2024.08", Some(9.0)),
        ],
    )]));
    assert_eq!(
        result
            .get(StatisticKey::Volatility)
            .and_then(|record| record.value()),
        Some(2.0)
    );
}

#[test]
fn all_missing_total_row_is_fatal() {
    let empty = table(vec![
        row(TOTAL, &[("2024.01", None), ("2024.02", None)]),
        row("01 식료품", &[("2024.01", Some(1.0)), ("2024.02", Some(2.0))]),
    ]);
    for preset in [StatisticsPreset::PressRelease, StatisticsPreset::Interesting] {
        assert_eq!(
            compute_statistics(&empty, preset),
            Err(StatisticsError::EmptyTotalIndex {
                label: TOTAL.to_string()
            })
        );
    }
}

#[test]
fn missing_total_row_is_fatal() {
    let no_total = table(vec![row("01 식료품", &[("2024.01", Some(1.0))])]);
    assert!(matches!(
        compute_statistics(&no_total, StatisticsPreset::PressRelease),
        Err(StatisticsError::MissingTotalIndex { .. })
    ));
}

#[test]
fn keys_follow_computation_order() {
    let result = press(&table(vec![
        monthly(TOTAL, "2022.01", 24, |idx| Some(100.0 + idx as f64)),
        monthly("01 식료품", "2022.01", 24, |idx| Some(90.0 + idx as f64)),
    ]));
    let keys: Vec<StatisticKey> = result.keys().collect();
    assert_eq!(
        keys,
        vec![
            StatisticKey::OverallMean,
            StatisticKey::MaxIndex,
            StatisticKey::MinIndex,
            StatisticKey::Recent1yMean,
            StatisticKey::Recent3yMean,
            StatisticKey::AnnualGrowthRate,
            StatisticKey::Volatility,
            StatisticKey::TopGrowthCategory,
            StatisticKey::BottomGrowthCategory,
            StatisticKey::Top3CategoryMeans,
            StatisticKey::RecentTrend,
        ]
    );
}

#[test]
fn presets_parse_from_cli_labels() {
    assert_eq!(
        "press-release".parse::<StatisticsPreset>(),
        Ok(StatisticsPreset::PressRelease)
    );
    assert_eq!(
        "Interesting".parse::<StatisticsPreset>(),
        Ok(StatisticsPreset::Interesting)
    );
    assert!("weekly".parse::<StatisticsPreset>().is_err());
}
