//! Client for the KOSIS `statisticsParameterData.do` endpoint.
//!
//! The endpoint returns one long-form row per (region, category, month).
//! [`parse_payload`] validates the envelope and pivots those rows into a
//! wide [`IndexTable`].

use super::{DataSource, PeriodQuery, SourceError};
use crate::table::{IndexTable, Period};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "https://kosis.kr/openapi/Param/statisticsParameterData.do";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed request parameters selecting the national CPI by expenditure
/// purpose table.
const TABLE_PARAMS: [(&str, &str); 15] = [
    ("method", "getList"),
    ("itmId", "T+"),
    ("objL1", "T10+"),
    ("objL2", "0+A+B+C+D+E+F+G+H+I+J+K+L+"),
    ("objL3", ""),
    ("objL4", ""),
    ("objL5", ""),
    ("objL6", ""),
    ("objL7", ""),
    ("objL8", ""),
    ("format", "json"),
    ("jsonVD", "Y"),
    ("prdSe", "M"),
    ("orgId", "101"),
    ("tblId", "DT_1J22001"),
];

const DEFAULT_REGION: &str = "전국";

type SeriesRow = (String, String, BTreeMap<Period, Option<f64>>);

#[derive(Debug, Clone)]
pub struct KosisSource {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    total_index_label: String,
}

impl KosisSource {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        total_index_label: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            total_index_label: total_index_label.into(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Query string for one request, API key included.
    pub fn request_params(
        &self,
        api_key: &str,
        query: &PeriodQuery,
    ) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = TABLE_PARAMS
            .iter()
            .map(|(name, value)| (*name, (*value).to_string()))
            .collect();
        params.insert(1, ("apiKey", api_key.to_string()));
        match query {
            PeriodQuery::RecentMonths(count) => params.push(("newEstPrdCnt", count.to_string())),
            PeriodQuery::Range { start, end } => {
                params.push(("startPrdDe", start.compact()));
                params.push(("endPrdDe", end.compact()));
            }
        }
        params
    }
}

impl DataSource for KosisSource {
    async fn load(&self, query: &PeriodQuery) -> Result<IndexTable, SourceError> {
        let api_key = self.api_key.as_deref().ok_or(SourceError::MissingApiKey)?;
        let params = self.request_params(api_key, query);
        debug!(?query, "requesting KOSIS data");

        let payload: Value = self
            .client
            .get(&self.api_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let table = parse_payload(&payload, &self.total_index_label)?;
        info!(
            rows = table.rows().len(),
            periods = table.periods().len(),
            "loaded KOSIS data"
        );
        Ok(table)
    }
}

/// Validate a KOSIS response and pivot it into wide form.
///
/// Envelope problems (error codes, empty or oddly shaped documents) are
/// fatal; a well-formed envelope whose rows cannot be pivoted yields
/// [`SourceError::Transform`].
pub fn parse_payload(payload: &Value, total_index_label: &str) -> Result<IndexTable, SourceError> {
    let rows = match payload {
        Value::Array(items) if items.is_empty() => return Err(SourceError::EmptyResponse),
        Value::Array(items) => items.as_slice(),
        Value::Object(object) => {
            check_error_code(object)?;
            let has_search = object
                .get("StatisticSearch")
                .is_some_and(|search| !is_blank(search));
            if !has_search && !object.contains_key("row") {
                return Err(SourceError::EmptyResponse);
            }
            object_rows(object)
        }
        other => {
            return Err(SourceError::UnexpectedShape(
                json_kind(other).to_string(),
            ))
        }
    };
    if rows.is_empty() {
        return Err(SourceError::Transform(
            "response carries no row data".to_string(),
        ));
    }

    let series = pivot(rows);
    if series.is_empty() {
        return Err(SourceError::Transform(
            "no region/category rows could be built".to_string(),
        ));
    }
    let table = IndexTable::from_series(total_index_label, series);
    if table.periods().is_empty() {
        return Err(SourceError::Transform(
            "rows carry no YYYYMM periods".to_string(),
        ));
    }
    Ok(table)
}

fn check_error_code(object: &Map<String, Value>) -> Result<(), SourceError> {
    let Some(code) = object.get("err") else {
        return Ok(());
    };
    let code = scalar_text(code).unwrap_or_default();
    if code == "0" {
        return Ok(());
    }
    let message = object
        .get("errMsg")
        .and_then(scalar_text)
        .unwrap_or_else(|| "unknown error".to_string());
    Err(SourceError::Api { code, message })
}

/// Rows from `StatisticSearch[0].row`, `StatisticSearch.row` or `row`.
fn object_rows(object: &Map<String, Value>) -> &[Value] {
    let nested = match object.get("StatisticSearch") {
        Some(Value::Array(items)) => items.first().and_then(|first| first.get("row")),
        Some(Value::Object(search)) => search.get("row"),
        _ => None,
    };
    nested
        .and_then(Value::as_array)
        .filter(|rows| !rows.is_empty())
        .or_else(|| object.get("row").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Group long-form rows by (region, category) in first-seen order.
fn pivot(rows: &[Value]) -> Vec<SeriesRow> {
    let mut series: Vec<SeriesRow> = Vec::new();
    for row in rows.iter().filter_map(Value::as_object) {
        let region =
            field_text(row, &["C1_NM", "C1"]).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let category = field_text(row, &["C2_NM", "C2"]).unwrap_or_default();

        let idx = match series
            .iter()
            .position(|(r, c, _)| *r == region && *c == category)
        {
            Some(idx) => idx,
            None => {
                series.push((region, category, BTreeMap::new()));
                series.len() - 1
            }
        };
        let values = &mut series[idx].2;

        let period = row
            .get("PRD_DE")
            .and_then(scalar_text)
            .and_then(|raw| Period::from_compact(&raw));
        let value = row.get("DT").and_then(numeric_value);
        if let (Some(period), Some(value)) = (period, value) {
            values.insert(period, Some(value));
        }

        for (key, cell) in row {
            let Some(label) = key.strip_prefix("DT_") else {
                continue;
            };
            let period = Period::from_compact(label).or_else(|| label.parse().ok());
            if let Some(period) = period {
                values.insert(period, numeric_value(cell));
            }
        }
    }
    series
}

fn field_text(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| row.get(*key))
        .and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOTAL: &str = "0 총지수";

    fn client(api_key: Option<&str>) -> KosisSource {
        KosisSource::new(
            DEFAULT_API_URL,
            api_key.map(ToString::to_string),
            DEFAULT_TIMEOUT,
            TOTAL,
        )
        .expect("client")
    }

    fn long_rows() -> Value {
        json!([
            { "C1_NM": "전국", "C2_NM": "0 총지수", "PRD_DE": "202402", "DT": "113.77" },
            { "C1_NM": "전국", "C2_NM": "0 총지수", "PRD_DE": "202401", "DT": "113.15" },
            { "C1_NM": "전국", "C2_NM": "01 식료품", "PRD_DE": "202401", "DT": "120.1" },
            { "C1_NM": "전국", "C2_NM": "01 식료품", "PRD_DE": "202402", "DT": "-" }
        ])
    }

    #[test]
    fn top_level_array_is_pivoted() {
        let table = parse_payload(&long_rows(), TOTAL).expect("table");
        let periods: Vec<String> = table.periods().iter().map(ToString::to_string).collect();
        assert_eq!(periods, vec!["2024.01", "2024.02"]);
        assert_eq!(
            table.total_row().expect("total").values,
            vec![Some(113.15), Some(113.77)]
        );
        assert_eq!(table.rows()[1].category, "01 식료품");
        assert_eq!(table.rows()[1].values, vec![Some(120.1), None]);
    }

    #[test]
    fn nested_search_results_are_accepted() {
        let nested = json!({ "StatisticSearch": [{ "row": long_rows() }] });
        let object = json!({ "StatisticSearch": { "row": long_rows() } });
        let flat = json!({ "row": long_rows() });
        for payload in [nested, object, flat] {
            let table = parse_payload(&payload, TOTAL).expect("table");
            assert_eq!(table.rows().len(), 2);
        }
    }

    #[test]
    fn wide_dt_fields_are_read_directly() {
        let payload = json!([
            { "C1": "11", "C2": "0 총지수", "DT_202401": 100.5, "DT_202312": "99.5" }
        ]);
        let table = parse_payload(&payload, TOTAL).expect("table");
        let total = table.total_row().expect("total");
        assert_eq!(total.region, "11");
        assert_eq!(total.values, vec![Some(99.5), Some(100.5)]);
    }

    #[test]
    fn missing_identifiers_use_defaults() {
        let payload = json!([{ "PRD_DE": "202401", "DT": 1.0 }]);
        let table = parse_payload(&payload, TOTAL).expect("table");
        assert_eq!(table.rows()[0].region, "전국");
        assert_eq!(table.rows()[0].category, "");
    }

    #[test]
    fn envelope_failures_are_not_recoverable() {
        let api = parse_payload(&json!({ "err": "20", "errMsg": "인증키 오류" }), TOTAL)
            .expect_err("api error");
        assert!(matches!(&api, SourceError::Api { code, .. } if code == "20"));
        assert!(!api.is_recoverable());

        let empty = parse_payload(&json!([]), TOTAL).expect_err("empty");
        assert!(matches!(empty, SourceError::EmptyResponse));

        let no_data = parse_payload(&json!({ "StatisticSearch": [] }), TOTAL).expect_err("empty");
        assert!(matches!(no_data, SourceError::EmptyResponse));

        let shape = parse_payload(&json!("oops"), TOTAL).expect_err("shape");
        assert!(matches!(shape, SourceError::UnexpectedShape(_)));
        assert!(!shape.is_recoverable());
    }

    #[test]
    fn untransformable_rows_are_recoverable() {
        let no_rows = parse_payload(&json!({ "StatisticSearch": [{ "list": [] }] }), TOTAL)
            .expect_err("no rows");
        assert!(no_rows.is_recoverable());

        let no_periods = parse_payload(&json!([{ "C2_NM": "0 총지수", "DT": "1" }]), TOTAL)
            .expect_err("no periods");
        assert!(no_periods.is_recoverable());

        let scalars = parse_payload(&json!([1, 2, 3]), TOTAL).expect_err("scalars");
        assert!(scalars.is_recoverable());
    }

    #[test]
    fn successful_error_code_is_ignored() {
        let payload = json!({ "err": "0", "row": long_rows() });
        assert!(parse_payload(&payload, TOTAL).is_ok());
    }

    #[test]
    fn request_params_follow_query() {
        let source = client(Some("key"));
        let recent = source.request_params("key", &PeriodQuery::RecentMonths(12));
        assert!(recent.contains(&("apiKey", "key".to_string())));
        assert!(recent.contains(&("tblId", "DT_1J22001".to_string())));
        assert!(recent.contains(&("newEstPrdCnt", "12".to_string())));

        let range = PeriodQuery::Range {
            start: "2023.01".parse().expect("period"),
            end: "2023.12".parse().expect("period"),
        };
        let ranged = source.request_params("key", &range);
        assert!(ranged.contains(&("startPrdDe", "202301".to_string())));
        assert!(ranged.contains(&("endPrdDe", "202312".to_string())));
        assert!(!ranged.iter().any(|(name, _)| *name == "newEstPrdCnt"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let source = client(Some("  "));
        assert!(!source.has_api_key());
        let err = source
            .load(&PeriodQuery::default())
            .await
            .expect_err("no key");
        assert!(matches!(err, SourceError::MissingApiKey));
    }
}
