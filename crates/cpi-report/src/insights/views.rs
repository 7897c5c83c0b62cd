use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// One headline finding about an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightRecord {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub payload: InsightPayload,
}

impl InsightRecord {
    pub const fn kind(&self) -> InsightKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Summary,
    MaxValue,
    Statistics,
    Trend,
    Distribution,
    Histogram,
}

impl InsightKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::MaxValue => "max_value",
            Self::Statistics => "statistics",
            Self::Trend => "trend",
            Self::Distribution => "distribution",
            Self::Histogram => "histogram",
        }
    }
}

/// Kind-specific data, serialized as `"type"` plus `"data"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InsightPayload {
    Summary {
        rows: usize,
        columns: usize,
        column_names: Vec<String>,
    },
    MaxValue {
        column: String,
        value: f64,
        index: usize,
        chart_data: Vec<Map<String, Value>>,
    },
    Statistics {
        means: ColumnMap<f64>,
        stds: ColumnMap<f64>,
    },
    Trend {
        column: String,
        trend: TrendLabel,
        change: f64,
        chart_data: Vec<ChartValue>,
    },
    Distribution {
        column: String,
        distribution: ColumnMap<usize>,
    },
    Histogram {
        column: String,
        values: Vec<ChartValue>,
    },
}

impl InsightPayload {
    pub const fn kind(&self) -> InsightKind {
        match self {
            Self::Summary { .. } => InsightKind::Summary,
            Self::MaxValue { .. } => InsightKind::MaxValue,
            Self::Statistics { .. } => InsightKind::Statistics,
            Self::Trend { .. } => InsightKind::Trend,
            Self::Distribution { .. } => InsightKind::Distribution,
            Self::Histogram { .. } => InsightKind::Histogram,
        }
    }
}

/// A plotted value. Columns holding only whole numbers with no blanks are
/// emitted as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartValue {
    Int(i64),
    Float(f64),
}

impl ChartValue {
    pub fn new(value: f64, integral: bool) -> Self {
        if integral {
            Self::Int(value as i64)
        } else {
            Self::Float(value)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl From<ChartValue> for Value {
    fn from(value: ChartValue) -> Self {
        match value {
            ChartValue::Int(value) => Value::from(value),
            ChartValue::Float(value) => Value::from(value),
        }
    }
}

/// Direction of the first numeric column. Anything other than a strict
/// increase is reported as a decrease, including an unchanged series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendLabel {
    #[serde(rename = "증가")]
    Increase,
    #[serde(rename = "감소")]
    Decrease,
}

impl TrendLabel {
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Self::Increase
        } else {
            Self::Decrease
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Increase => "증가",
            Self::Decrease => "감소",
        }
    }
}

/// Name-keyed values that serialize as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap<V>(Vec<(String, V)>);

impl<V> ColumnMap<V> {
    pub fn entries(&self) -> &[(String, V)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for ColumnMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> FromIterator<(String, V)> for ColumnMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for ColumnMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
