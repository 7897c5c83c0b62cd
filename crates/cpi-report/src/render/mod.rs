//! Output documents: the DOCX and HTML press releases, the plain-text
//! insight release, the workbook data export and PDF text conversion.

pub mod dates;
pub mod docx;
pub mod export;
pub mod html;
pub mod pdf;
pub mod text;

pub use docx::{paragraphs_docx, press_release_docx};
pub use export::index_table_xlsx;
pub use html::consumer_press_release_html;
pub use pdf::{pdf_to_docx, ConvertError, ConvertedDocument};
pub use text::insight_press_release;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to assemble document archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("table exceeds worksheet limits")]
    TooLarge,
}

/// Escape text for XML and HTML bodies and attribute values.
pub(crate) fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
