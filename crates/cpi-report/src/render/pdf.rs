//! Text-layer PDF to DOCX conversion.
//!
//! The upload is staged in a private temporary directory together with the
//! extracted markdown text; the directory is removed when the conversion
//! returns, whether it succeeded or not.

use super::docx::paragraphs_docx;
use super::RenderError;
use std::fs;
use std::panic;
use std::path::Path;
use tracing::{info, warn};

const SOURCE_FILE: &str = "source.pdf";
const EXTRACTED_FILE: &str = "extracted.md";

/// Conversion failures; the input-side messages are shown to the uploader.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("파일이 업로드되지 않았습니다.")]
    MissingFile,
    #[error("파일이 선택되지 않았습니다.")]
    EmptyFileName,
    #[error("PDF 파일만 업로드 가능합니다.")]
    NotPdf,
    #[error("PDF에서 텍스트를 추출할 수 없습니다. 이미지 기반 PDF일 수 있습니다.")]
    NoText,
    #[error("PDF 텍스트 추출 실패: {0}")]
    Extract(String),
    #[error("변환 작업 파일을 처리할 수 없습니다: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF to DOCX 변환 실패: {0}")]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// Upload name with the extension swapped for `.docx`.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Convert an uploaded PDF into a `.docx` holding its text paragraphs.
pub fn pdf_to_docx(file_name: &str, bytes: &[u8]) -> Result<ConvertedDocument, ConvertError> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(ConvertError::EmptyFileName);
    }
    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ConvertError::NotPdf);
    }

    let workdir = tempfile::Builder::new().prefix("cpi-pdf-").tempdir()?;
    let source = workdir.path().join(SOURCE_FILE);
    fs::write(&source, bytes)?;

    let text = extract_text(&source)?;
    if text.trim().is_empty() {
        return Err(ConvertError::NoText);
    }

    let markdown = workdir.path().join(EXTRACTED_FILE);
    fs::write(&markdown, &text)?;
    let staged = fs::read_to_string(&markdown)?;
    let document = paragraphs_docx(&split_paragraphs(&staged))?;

    let output = output_name(file_name);
    info!(
        file = file_name,
        output = %output,
        characters = staged.chars().count(),
        bytes = document.len(),
        "converted pdf to docx"
    );
    Ok(ConvertedDocument {
        file_name: output,
        bytes: document,
    })
}

/// The extractor panics on some malformed streams; that is reported as an
/// extraction failure rather than taking the worker down.
fn extract_text(path: &Path) -> Result<String, ConvertError> {
    match panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => Err(ConvertError::Extract(err.to_string())),
        Err(_) => {
            warn!(path = %path.display(), "pdf extractor panicked");
            Err(ConvertError::Extract("손상되었거나 지원하지 않는 PDF입니다.".to_string()))
        }
    }
}

/// Blank lines separate paragraphs; page breaks come through as form feeds.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split(['\n', '\x0c']) {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// Final path segment of the upload name with `.pdf` replaced by `.docx`.
fn output_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let stem: String = stem.chars().filter(|ch| !ch.is_control() && *ch != '"').collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "converted.docx".to_string()
    } else {
        format!("{stem}.docx")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_names_and_other_extensions() {
        assert!(matches!(
            pdf_to_docx("  ", b"%PDF-1.4"),
            Err(ConvertError::EmptyFileName)
        ));
        assert!(matches!(
            pdf_to_docx("report.docx", b"%PDF-1.4"),
            Err(ConvertError::NotPdf)
        ));
        assert_eq!(
            ConvertError::NotPdf.to_string(),
            "PDF 파일만 업로드 가능합니다."
        );
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let err = pdf_to_docx("broken.PDF", b"not a pdf at all").expect_err("rejected");
        assert!(matches!(err, ConvertError::Extract(_)));
    }

    #[test]
    fn paragraphs_split_on_blank_lines_and_page_breaks() {
        let paragraphs = split_paragraphs("Title\n\n first line \nsecond line\n\n\n\x0cNext page\n");
        assert_eq!(
            paragraphs,
            vec!["Title", "first line\nsecond line", "Next page"]
        );
    }

    #[test]
    fn output_name_keeps_stem() {
        assert_eq!(output_name("보도자료.pdf"), "보도자료.docx");
        assert_eq!(output_name("C:\\scans\\march.report.PDF"), "march.report.docx");
        assert_eq!(output_name(".pdf"), "converted.docx");
    }
}
