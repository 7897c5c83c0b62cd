use serde_json::{Map, Value};

/// A single cell as produced by a spreadsheet or CSV reader, before any
/// schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Workbook date or time cell, kept in its display form.
    Date(String),
}

impl RawCell {
    /// Classify free text the way a CSV reader infers cell types.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Numeric coercion: numbers and numeric strings pass, anything else is
    /// missing.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(value) => format_float(*value),
            Self::Text(text) | Self::Date(text) => text.clone(),
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::String(String::new()),
            Self::Number(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(String::new())),
            Self::Text(text) | Self::Date(text) => Value::String(text.clone()),
            Self::Bool(flag) => Value::Bool(*flag),
        }
    }
}

/// Render a float the way a dataframe prints it: integral values keep one
/// decimal place (`103.0`), everything else uses the shortest round-trip form.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Header row plus data rows, every row padded to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .map(|mut row| {
                row.resize(width, RawCell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.trim() == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &RawCell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// First `limit` rows as JSON records, missing cells rendered as `""`.
    pub fn preview(&self, limit: usize) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| (header.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}
