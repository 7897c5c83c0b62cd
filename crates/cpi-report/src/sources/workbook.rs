use super::reader::read_path;
use super::{DataSource, PeriodQuery, SourceError};
use crate::table::{IndexLayout, IndexTable};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_SHEET: &str = "데이터";

/// The price-index workbook shipped with the service (`.xlsx`, `.xls` or
/// `.csv`). The whole sheet is returned regardless of the requested window.
#[derive(Debug, Clone)]
pub struct LocalWorkbookSource {
    path: PathBuf,
    sheet: Option<String>,
    layout: IndexLayout,
}

impl LocalWorkbookSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet: Some(DEFAULT_SHEET.to_string()),
            layout: IndexLayout::default(),
        }
    }

    /// Worksheet to read; `None` selects the first one.
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn with_layout(mut self, layout: IndexLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocking load, used by the CLI and by [`DataSource::load`].
    pub fn load_blocking(&self) -> Result<IndexTable, SourceError> {
        let raw = read_path(&self.path, self.sheet.as_deref())?;
        let table = IndexTable::from_raw(&raw, &self.layout)?;
        info!(
            path = %self.path.display(),
            rows = table.rows().len(),
            periods = table.periods().len(),
            "loaded local workbook"
        );
        Ok(table)
    }
}

impl DataSource for LocalWorkbookSource {
    async fn load(&self, _query: &PeriodQuery) -> Result<IndexTable, SourceError> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.load_blocking())
            .await
            .map_err(|err| SourceError::Task(err.to_string()))?
    }
}
