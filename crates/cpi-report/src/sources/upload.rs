use super::reader::{read_bytes, FileFormat, ReadError};
use crate::table::RawTable;
use tracing::info;

/// Upload validation failures; messages are shown to the uploader as-is.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("파일이 없습니다.")]
    MissingFile,
    #[error("파일이 선택되지 않았습니다.")]
    EmptyFileName,
    #[error("엑셀 파일(.xlsx, .xls) 또는 CSV 파일만 업로드 가능합니다.")]
    UnsupportedExtension,
    #[error("파일에 데이터가 없습니다.")]
    NoData,
    #[error("파일 처리 중 오류가 발생했습니다: {0}")]
    Unreadable(ReadError),
    #[error("업로드 요청을 읽을 수 없습니다: {0}")]
    Malformed(String),
}

/// Parse an uploaded `.xlsx`, `.xls` or `.csv` file into a table with at
/// least one data row.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<RawTable, UploadError> {
    if file_name.trim().is_empty() {
        return Err(UploadError::EmptyFileName);
    }
    let format = FileFormat::from_file_name(file_name).ok_or(UploadError::UnsupportedExtension)?;
    let table = match read_bytes(format, bytes, None) {
        Ok(table) => table,
        Err(ReadError::Empty) => return Err(UploadError::NoData),
        Err(err) => return Err(UploadError::Unreadable(err)),
    };
    if table.row_count() == 0 || table.column_count() == 0 {
        return Err(UploadError::NoData);
    }
    info!(
        file = file_name,
        %format,
        rows = table.row_count(),
        columns = table.column_count(),
        "parsed upload"
    );
    Ok(table)
}
