use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One calendar month of observations.
///
/// Ordering is chronological (year, then month). The `YYYY.MM` text form is
/// fixed-width and zero-padded, so sorting periods and sorting their labels
/// always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Parse the compact `YYYYMM` form used by the KOSIS `PRD_DE` field.
    pub fn from_compact(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = raw[..4].parse().ok()?;
        let month = raw[4..].parse().ok()?;
        Self::new(year, month)
    }

    /// Parse the `YYYY-MM` form used by HTML month inputs.
    pub fn from_dashed(raw: &str) -> Option<Self> {
        let (year, month) = raw.trim().split_once('-')?;
        format!("{year}.{month}").parse().ok()
    }

    /// The compact `YYYYMM` form.
    pub fn compact(self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    /// Shift by a signed number of months.
    pub fn offset_months(self, months: i32) -> Option<Self> {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        if index < 0 {
            return None;
        }
        Self::new(index / 12, (index % 12) as u32 + 1)
    }

    /// Same month, one year earlier.
    pub fn year_ago(self) -> Option<Self> {
        self.offset_months(-12)
    }

    /// Zero-padded month bucket (`"01"`..`"12"`).
    pub fn month_label(self) -> String {
        format!("{:02}", self.month)
    }

    /// Localized month name (`"3월"`).
    pub fn korean_month_name(self) -> String {
        format!("{}월", self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}.{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a YYYY.MM period label")]
pub struct PeriodParseError(String);

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || PeriodParseError(value.to_string());
        let (year, month) = trimmed.split_once('.').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
