use crate::table::Period;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Every statistic either preset can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKey {
    OverallMean,
    MaxIndex,
    MinIndex,
    #[serde(rename = "recent_1y_mean")]
    Recent1yMean,
    #[serde(rename = "recent_3y_mean")]
    Recent3yMean,
    AnnualGrowthRate,
    Volatility,
    TopGrowthCategory,
    BottomGrowthCategory,
    Top3CategoryMeans,
    RecentTrend,
    #[serde(rename = "recent_3m_avg_yoy_growth")]
    Recent3mAvgYoyGrowth,
    MaxYoyMonth,
    MinYoyMonth,
    LinearTrendSlope,
    VolatilityIndex,
    MaxVolatilityCategory,
    MinVolatilityCategory,
    StabilityScore,
    #[serde(rename = "recent_6m_vs_prev_6m")]
    Recent6mVsPrev6m,
    SeasonalPattern,
}

impl StatisticKey {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OverallMean => "전체 평균",
            Self::MaxIndex => "최고 물가지수",
            Self::MinIndex => "최저 물가지수",
            Self::Recent1yMean => "최근 1년 평균",
            Self::Recent3yMean => "최근 3년 평균",
            Self::AnnualGrowthRate => "연평균 증가율",
            Self::Volatility => "변동성",
            Self::TopGrowthCategory => "최고 상승률 지출목적",
            Self::BottomGrowthCategory => "최저 상승률 지출목적",
            Self::Top3CategoryMeans => "상위 지출목적 평균",
            Self::RecentTrend => "최근 추세",
            Self::Recent3mAvgYoyGrowth => "최근 3개월 평균 증가율",
            Self::MaxYoyMonth => "최고 상승률 달",
            Self::MinYoyMonth => "최저 상승률 달",
            Self::LinearTrendSlope => "물가 상승 추세",
            Self::VolatilityIndex => "변동성 지수",
            Self::MaxVolatilityCategory => "최고 변동성 지출목적",
            Self::MinVolatilityCategory => "최저 변동성 지출목적",
            Self::StabilityScore => "물가 안정성 점수",
            Self::Recent6mVsPrev6m => "최근 6개월 변화",
            Self::SeasonalPattern => "계절성 패턴",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "월당")]
    PerMonth,
    #[serde(rename = "점")]
    Points,
}

impl Unit {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Percent => "%",
            Self::PerMonth => "월당",
            Self::Points => "점",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

impl TrendDirection {
    pub fn of_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Rising
        } else if change < 0.0 {
            Self::Falling
        } else {
            Self::Flat
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rising => "상승",
            Self::Falling => "하락",
            Self::Flat => "유지",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub name: String,
    pub value: f64,
}

/// A computed statistic; each variant carries only the fields its kind
/// needs. Serialized without a tag so consumers see a flat record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatisticRecord {
    Scalar {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<Unit>,
        description: String,
    },
    Dated {
        value: f64,
        date: Period,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<Unit>,
        description: String,
    },
    Category {
        category: String,
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<Unit>,
        description: String,
    },
    Ranking {
        categories: Vec<CategoryValue>,
        description: String,
    },
    Trend {
        value: f64,
        unit: Unit,
        trend: TrendDirection,
        description: String,
    },
    Seasonal {
        highest_month: String,
        highest_value: f64,
        lowest_month: String,
        lowest_value: f64,
        description: String,
    },
}

impl StatisticRecord {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Scalar { value, .. }
            | Self::Dated { value, .. }
            | Self::Category { value, .. }
            | Self::Trend { value, .. } => Some(*value),
            Self::Ranking { .. } | Self::Seasonal { .. } => None,
        }
    }

    pub fn unit(&self) -> Option<Unit> {
        match self {
            Self::Scalar { unit, .. } | Self::Dated { unit, .. } | Self::Category { unit, .. } => {
                *unit
            }
            Self::Trend { unit, .. } => Some(*unit),
            Self::Ranking { .. } | Self::Seasonal { .. } => None,
        }
    }

    pub fn date(&self) -> Option<Period> {
        match self {
            Self::Dated { date, .. } => Some(*date),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Category { category, .. } => Some(category),
            _ => None,
        }
    }

    pub fn categories(&self) -> &[CategoryValue] {
        match self {
            Self::Ranking { categories, .. } => categories,
            _ => &[],
        }
    }

    pub fn trend(&self) -> Option<TrendDirection> {
        match self {
            Self::Trend { trend, .. } => Some(*trend),
            _ => None,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Scalar { description, .. }
            | Self::Dated { description, .. }
            | Self::Category { description, .. }
            | Self::Ranking { description, .. }
            | Self::Trend { description, .. }
            | Self::Seasonal { description, .. } => description,
        }
    }
}

/// Ordered statistic mapping; serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsResult {
    entries: Vec<(StatisticKey, StatisticRecord)>,
}

impl StatisticsResult {
    pub(crate) fn insert(&mut self, key: StatisticKey, record: StatisticRecord) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = record,
            None => self.entries.push((key, record)),
        }
    }

    pub fn get(&self, key: StatisticKey) -> Option<&StatisticRecord> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, record)| record)
    }

    pub fn contains(&self, key: StatisticKey) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = StatisticKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatisticKey, &StatisticRecord)> + '_ {
        self.entries.iter().map(|(key, record)| (*key, record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StatisticsResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}
