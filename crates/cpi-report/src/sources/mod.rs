//! Where tables come from: the bundled workbook, the KOSIS open API and
//! user uploads.
//!
//! Index sources implement [`DataSource`]. [`FallbackSource`] chains two of
//! them so a KOSIS payload that cannot be turned into a table falls back to
//! the bundled workbook.

pub mod kosis;
pub mod reader;
pub mod upload;
pub mod workbook;

pub use kosis::KosisSource;
pub use reader::{read_bytes, read_path, FileFormat, ReadError};
pub use upload::{parse_upload, UploadError};
pub use workbook::LocalWorkbookSource;

use crate::table::{IndexTable, Period, TableError};
use std::future::Future;
use tracing::warn;

pub const DEFAULT_RECENT_MONTHS: u32 = 36;

/// Which months to request from a remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodQuery {
    RecentMonths(u32),
    Range { start: Period, end: Period },
}

impl Default for PeriodQuery {
    fn default() -> Self {
        Self::RecentMonths(DEFAULT_RECENT_MONTHS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodQueryError {
    #[error("'{0}' is not a YYYY-MM month")]
    InvalidMonth(String),
    #[error("start month {start} is after end month {end}")]
    InvertedRange { start: Period, end: Period },
}

impl PeriodQuery {
    /// Interpret dashboard query parameters. `months` with a positive count
    /// and `range` with both bounds are honored; anything else falls back to
    /// the default window.
    pub fn from_params(
        period_type: Option<&str>,
        month_count: Option<u32>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, PeriodQueryError> {
        match (period_type.unwrap_or("months"), month_count, start, end) {
            ("months", Some(count), _, _) if count > 0 => Ok(Self::RecentMonths(count)),
            ("range", _, Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                let start = parse_month(start)?;
                let end = parse_month(end)?;
                if start > end {
                    return Err(PeriodQueryError::InvertedRange { start, end });
                }
                Ok(Self::Range { start, end })
            }
            _ => Ok(Self::default()),
        }
    }

    /// Short ASCII tag for file names (`recent36`, `202301-202312`).
    pub fn file_tag(&self) -> String {
        match self {
            Self::RecentMonths(count) => format!("recent{count}"),
            Self::Range { start, end } => format!("{}-{}", start.compact(), end.compact()),
        }
    }
}

fn parse_month(raw: &str) -> Result<Period, PeriodQueryError> {
    Period::from_dashed(raw)
        .or_else(|| Period::from_compact(raw))
        .ok_or_else(|| PeriodQueryError::InvalidMonth(raw.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("KOSIS_API_KEY is not configured")]
    MissingApiKey,
    #[error("KOSIS request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("KOSIS API error {code}: {message}")]
    Api { code: String, message: String },
    #[error("KOSIS returned no data")]
    EmptyResponse,
    #[error("unexpected KOSIS response shape: {0}")]
    UnexpectedShape(String),
    #[error("could not transform KOSIS response: {0}")]
    Transform(String),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("dataset layout: {0}")]
    Table(#[from] TableError),
    #[error("loader task failed: {0}")]
    Task(String),
    #[error("{primary} (fallback also failed: {fallback})")]
    FallbackFailed {
        primary: Box<SourceError>,
        fallback: Box<SourceError>,
    },
}

impl SourceError {
    /// Only payloads that arrived but could not be reshaped justify trying
    /// another source.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transform(_))
    }
}

/// Anything that can produce an [`IndexTable`].
pub trait DataSource: Send + Sync {
    fn load(
        &self,
        query: &PeriodQuery,
    ) -> impl Future<Output = Result<IndexTable, SourceError>> + Send;
}

/// Try `primary`; on a recoverable failure log it and load from `fallback`.
#[derive(Debug, Clone)]
pub struct FallbackSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackSource<P, F> {
    pub const fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P, F> DataSource for FallbackSource<P, F>
where
    P: DataSource,
    F: DataSource,
{
    async fn load(&self, query: &PeriodQuery) -> Result<IndexTable, SourceError> {
        match self.primary.load(query).await {
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "primary source unusable, loading fallback");
                self.fallback
                    .load(query)
                    .await
                    .map_err(|fallback| SourceError::FallbackFailed {
                        primary: Box::new(err),
                        fallback: Box::new(fallback),
                    })
            }
            other => other,
        }
    }
}
