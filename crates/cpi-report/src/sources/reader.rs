use crate::table::{format_float, RawCell, RawTable};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Spreadsheet formats accepted by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Xls,
    Csv,
}

impl FileFormat {
    /// Detect the format from a file name; the extension check ignores case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, extension) = name.trim().rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file content is empty")]
    Empty,
    #[error("CSV text is neither UTF-8 nor EUC-KR")]
    Encoding,
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unreadable workbook: {0}")]
    Workbook(String),
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),
}

/// Read a spreadsheet from disk, picking the parser from the extension.
pub fn read_path(path: &Path, sheet: Option<&str>) -> Result<RawTable, ReadError> {
    let name = path.to_string_lossy();
    let format = FileFormat::from_file_name(&name)
        .ok_or_else(|| ReadError::UnsupportedFormat(name.to_string()))?;
    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bytes(format, &bytes, sheet)
}

/// Parse in-memory file content. `sheet` selects a worksheet by name; the
/// first worksheet is used otherwise. CSV input ignores it.
pub fn read_bytes(
    format: FileFormat,
    bytes: &[u8],
    sheet: Option<&str>,
) -> Result<RawTable, ReadError> {
    if bytes.is_empty() {
        return Err(ReadError::Empty);
    }
    match format {
        FileFormat::Csv => read_csv(bytes),
        FileFormat::Xlsx | FileFormat::Xls => read_workbook(bytes, sheet),
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, ReadError> {
    let text = decode_text(bytes)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(RawCell::infer).collect());
    }
    Ok(RawTable::new(headers, rows))
}

/// UTF-8 first (a leading BOM is dropped), then EUC-KR. The WHATWG EUC-KR
/// decoder also accepts the CP949 extensions.
fn decode_text(bytes: &[u8]) -> Result<String, ReadError> {
    let without_bom = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(without_bom) {
        return Ok(text.to_string());
    }
    debug!("CSV is not UTF-8, retrying as EUC-KR");
    encoding_rs::EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(ReadError::Encoding)
}

/// Try the OOXML reader first, then the legacy BIFF reader.
fn read_workbook(bytes: &[u8], sheet: Option<&str>) -> Result<RawTable, ReadError> {
    match Xlsx::new(Cursor::new(bytes)) {
        Ok(workbook) => load_sheet(workbook, sheet),
        Err(xlsx_err) => {
            debug!(error = %xlsx_err, "not an OOXML workbook, retrying as legacy xls");
            let workbook = Xls::new(Cursor::new(bytes))
                .map_err(|err| ReadError::Workbook(format!("{xlsx_err}; {err}")))?;
            load_sheet(workbook, sheet)
        }
    }
}

fn load_sheet<R, RS>(mut workbook: R, sheet: Option<&str>) -> Result<RawTable, ReadError>
where
    R: Reader<RS>,
    R::Error: fmt::Display,
    RS: std::io::Read + std::io::Seek,
{
    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|candidate| candidate == name) {
                return Err(ReadError::MissingSheet(name.to_string()));
            }
            workbook
                .worksheet_range(name)
                .map_err(|err| ReadError::Workbook(err.to_string()))?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ReadError::Workbook("workbook has no worksheets".to_string()))?
            .map_err(|err| ReadError::Workbook(err.to_string()))?,
    };
    Ok(range_to_table(&range))
}

fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(header_text).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();
    RawTable::new(headers, rows)
}

fn header_text(cell: &Data) -> String {
    match cell {
        // Period headers stored as numbers (2024.01) keep two decimals.
        Data::Float(value) if value.fract() != 0.0 => format!("{value:.2}"),
        Data::Int(value) => value.to_string(),
        other => cell_value(other).display().trim().to_string(),
    }
}

fn cell_value(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Float(value) => RawCell::Number(*value),
        Data::Bool(value) => RawCell::Bool(*value),
        Data::String(text) if text.trim().is_empty() => RawCell::Empty,
        Data::String(text) => RawCell::Text(text.clone()),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => RawCell::Date(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => RawCell::Date(format_float(value.as_f64())),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => RawCell::Date(text.clone()),
    }
}
