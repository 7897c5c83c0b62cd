//! HTML fragment for the consumer-price press release built from the
//! interesting preset.

use super::dates::{dotted_date_with_weekday, korean_month};
use super::escape_markup;
use crate::statistics::{StatisticKey, StatisticRecord, StatisticsResult, TrendDirection};
use chrono::NaiveDateTime;

const NOTES: [(&str, &str); 9] = [
    ("□", "현재 소비자물가지수의 기준연도는 2020년, 가중치의 기준연도는 2022년입니다."),
    ("○", "따라서 품목별 지수와 가중치를 이용하여 상위 단계 지수 계산한 결과와 공표하는 지수는 일치하지 않음에 유의하여 주시기 바랍니다."),
    ("", "※ 상세내용은 부록 소비자물가지수 계산식 참조"),
    ("□", "매월 발표하는 소비자물가지수는 가격변동을 측정하는 것으로 가격의 절대수준을 나타내지 않습니다."),
    ("○", "따라서 지역별로 기준시점(2020년=100)의 가격수준이 다르기 때문에 지역별 소비자물가지수를 이용하여 지역간 상대적인 물가수준 차이를 비교하는 것은 부적절합니다."),
    ("□", "일반적으로 소비자물가변동 추이 및 국가 간 비교는 1년 전 대비 물가 변동인 전년동월비를 주로 이용하지만, 단기간의 변동인 전월비도 참고하시기 바랍니다."),
    ("□", "소비자물가지수는 2019년 이전은 소수점 이하 3자리, 2020년 이후는 소수점 이하 2자리로 작성되고 있습니다."),
    ("○", "통계표에 사용된 \"-\" 부호의 뜻은 \"해당 숫자 없음\"을 의미합니다."),
    ("□", "본문에 수록된 자료는 국가데이터처 홈페이지(http://kostat.go.kr) 및 국가통계포털(http://kosis.kr)을 통해 이용할 수 있습니다."),
];

fn one_decimal(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.1}"))
}

fn value_of(stats: &StatisticsResult, key: StatisticKey) -> Option<f64> {
    stats.get(key).and_then(StatisticRecord::value)
}

fn slope_trend(slope: f64) -> &'static str {
    TrendDirection::of_change(slope).label()
}

fn stability_label(score: f64) -> &'static str {
    if score >= 70.0 {
        "매우 안정적"
    } else if score >= 50.0 {
        "안정적"
    } else {
        "불안정"
    }
}

struct Seasonal<'a> {
    highest_month: &'a str,
    highest_value: f64,
    lowest_month: &'a str,
    lowest_value: f64,
}

fn seasonal(stats: &StatisticsResult) -> Option<Seasonal<'_>> {
    match stats.get(StatisticKey::SeasonalPattern)? {
        StatisticRecord::Seasonal {
            highest_month,
            highest_value,
            lowest_month,
            lowest_value,
            ..
        } => Some(Seasonal {
            highest_month,
            highest_value: *highest_value,
            lowest_month,
            lowest_value: *lowest_value,
        }),
        _ => None,
    }
}

/// Render the press-release fragment. `now` supplies the title month and the
/// press/distribution stamps.
pub fn consumer_press_release_html(stats: &StatisticsResult, now: NaiveDateTime) -> String {
    let stamp = dotted_date_with_weekday(now.date());
    let mut html = String::new();

    html.push_str("<div class=\"press-release\">\n<div class=\"press-header\">\n");
    html.push_str("<h2>소비자물가조사</h2>\n<h2>보도자료</h2>\n");
    html.push_str(&format!(
        "<p class=\"press-time\">보도시점 {stamp} 08:00 배포{stamp} 07:30</p>\n"
    ));
    html.push_str(&format!(
        "<h1>{} 소비자물가동향</h1>\n",
        escape_markup(&korean_month(now.date()))
    ));
    html.push_str("<div class=\"press-dept\"><p>담당 부서 경제동향통계심의관 물가동향과</p></div>\n</div>\n");

    html.push_str("<div class=\"press-section\">\n<h3>일 러 두 기</h3>\n<ul class=\"notice-list\">\n");
    for (marker, note) in NOTES {
        if marker.is_empty() {
            html.push_str(&format!("<li>{}</li>\n", escape_markup(note)));
        } else {
            html.push_str(&format!(
                "<li><strong>{marker}</strong> {}</li>\n",
                escape_markup(note)
            ));
        }
    }
    html.push_str("</ul>\n</div>\n");

    html.push_str("<div class=\"press-section\">\n<h3>1. 주요 통계량 분석</h3>\n<h4>핵심 통계 지표</h4>\n<ul class=\"stats-summary\">\n");
    for (label, text) in summary_items(stats) {
        html.push_str(&format!(
            "<li><strong>{}:</strong> {}</li>\n",
            escape_markup(label),
            escape_markup(&text)
        ));
    }
    html.push_str("</ul>\n</div>\n");

    html.push_str("<div class=\"press-section\">\n<h3>2. 지출목적별 분석</h3>\n");
    for (key, heading) in [
        (StatisticKey::MaxVolatilityCategory, "가장 변동성이 큰 지출목적"),
        (StatisticKey::MinVolatilityCategory, "가장 안정적인 지출목적"),
    ] {
        if let Some(record) = stats.get(key) {
            html.push_str(&format!(
                "<h4>{heading}</h4>\n<p><strong>{}:</strong> 변동성 {}</p>\n",
                escape_markup(record.category().unwrap_or("N/A")),
                one_decimal(record.value())
            ));
        }
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"press-section\">\n<h3>3. 종합 분석</h3>\n<div class=\"analysis-content\">\n");
    let analysis = analysis_sentences(stats);
    if analysis.is_empty() {
        html.push_str("<p>통계량 데이터를 분석한 결과를 종합적으로 제시합니다.</p>\n");
    }
    for sentence in analysis {
        html.push_str(&format!("<p>{}</p>\n", escape_markup(&sentence)));
    }
    html.push_str("</div>\n</div>\n</div>\n");
    html
}

fn summary_items(stats: &StatisticsResult) -> Vec<(&'static str, String)> {
    let mut items = Vec::new();

    if let Some(value) = value_of(stats, StatisticKey::Recent3mAvgYoyGrowth) {
        items.push((
            "최근 3개월 평균 증가율",
            format!("{}% (전년동월비)", one_decimal(Some(value))),
        ));
    }
    for (key, label) in [
        (StatisticKey::MaxYoyMonth, "최고 상승률 달"),
        (StatisticKey::MinYoyMonth, "최저 상승률 달"),
    ] {
        if let Some(record) = stats.get(key) {
            let date = record
                .date()
                .map_or_else(|| "N/A".to_string(), |date| date.to_string());
            items.push((label, format!("{date} ({}%)", one_decimal(record.value()))));
        }
    }
    if let Some(slope) = value_of(stats, StatisticKey::LinearTrendSlope) {
        items.push((
            "물가 상승 추세",
            format!(
                "{} (월당, {} 추세)",
                one_decimal(Some(slope)),
                slope_trend(slope)
            ),
        ));
    }
    if let Some(value) = value_of(stats, StatisticKey::VolatilityIndex) {
        items.push((
            "변동성 지수",
            format!("{} (표준편차)", one_decimal(Some(value))),
        ));
    }
    for (key, label) in [
        (StatisticKey::MaxVolatilityCategory, "최고 변동성 지출목적"),
        (StatisticKey::MinVolatilityCategory, "최저 변동성 지출목적"),
    ] {
        if let Some(record) = stats.get(key) {
            items.push((
                label,
                format!(
                    "{} (변동성: {})",
                    record.category().unwrap_or("N/A"),
                    one_decimal(record.value())
                ),
            ));
        }
    }
    if let Some(score) = value_of(stats, StatisticKey::StabilityScore) {
        items.push((
            "물가 안정성 점수",
            format!("{}점 (0-100, 높을수록 안정적)", one_decimal(Some(score))),
        ));
    }
    if let Some(record) = stats.get(StatisticKey::Recent6mVsPrev6m) {
        let trend = record.trend().unwrap_or(TrendDirection::Flat);
        items.push((
            "최근 6개월 변화",
            format!("{}% ({} 추세)", one_decimal(record.value()), trend.label()),
        ));
    }
    if let Some(pattern) = seasonal(stats) {
        items.push((
            "계절성 패턴",
            format!(
                "최고 {} ({}), 최저 {} ({})",
                pattern.highest_month,
                one_decimal(Some(pattern.highest_value)),
                pattern.lowest_month,
                one_decimal(Some(pattern.lowest_value))
            ),
        ));
    }
    items
}

fn analysis_sentences(stats: &StatisticsResult) -> Vec<String> {
    let mut sentences = Vec::new();
    if let Some(value) = value_of(stats, StatisticKey::Recent3mAvgYoyGrowth) {
        sentences.push(format!(
            "최근 3개월 평균 증가율은 {}%로 나타났습니다.",
            one_decimal(Some(value))
        ));
    }
    if let Some(slope) = value_of(stats, StatisticKey::LinearTrendSlope) {
        sentences.push(format!(
            "물가 상승 추세는 {} 추세를 보이고 있습니다.",
            slope_trend(slope)
        ));
    }
    if let Some(score) = value_of(stats, StatisticKey::StabilityScore) {
        sentences.push(format!(
            "물가 안정성 점수는 {}점으로 {}입니다.",
            one_decimal(Some(score)),
            stability_label(score)
        ));
    }
    if let Some(pattern) = seasonal(stats) {
        sentences.push(format!(
            "계절성 패턴을 보면 {}에 가장 높고 {}에 가장 낮은 물가지수를 보입니다.",
            pattern.highest_month, pattern.lowest_month
        ));
    }
    if let Some(record) = stats.get(StatisticKey::Recent6mVsPrev6m) {
        let trend = record.trend().unwrap_or(TrendDirection::Flat);
        sentences.push(format!(
            "최근 6개월은 이전 6개월 대비 {}% {} 추세를 보였습니다.",
            one_decimal(record.value()),
            trend.label()
        ));
    }
    sentences
}
