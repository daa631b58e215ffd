use crate::error::TrendError;
use chrono::{Datelike, Month, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;

/// A calendar month, the key of one archive document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn month_name(self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// `January 2024`
    pub fn display_name(self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// `January-2024.md`. Month names are unique and the year is kept in
    /// full, so two different months never share a file name.
    pub fn archive_file_name(self) -> String {
        format!("{}-{}.md", self.month_name(), self.year)
    }

    /// Inverse of [`YearMonth::archive_file_name`].
    pub fn from_archive_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".md")?;
        let (month_name, year_raw) = stem.rsplit_once('-')?;
        if year_raw.len() != 4 || !year_raw.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let year = year_raw.parse::<i32>().ok()?;
        let month = (1..=12u32).find(|m| {
            u8::try_from(*m)
                .ok()
                .and_then(|v| Month::try_from(v).ok())
                .is_some_and(|v| v.name() == month_name)
        })?;
        Some(Self { year, month })
    }

    /// Parses the `YYYY-MM` form accepted by `--month`.
    pub fn parse(raw: &str) -> Result<Self, TrendError> {
        let invalid = || TrendError::InvalidInput(format!("invalid month `{raw}`: expected YYYY-MM"));
        let trimmed = raw.trim();
        let (year_raw, month_raw) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year_raw.len() != 4 || month_raw.len() != 2 {
            return Err(invalid());
        }
        let year = year_raw.parse::<i32>().map_err(|_| invalid())?;
        let month = month_raw.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Everything a run derives from "today". Passed explicitly so tests can pin
/// any date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    pub run_date: NaiveDate,
}

impl RunContext {
    pub fn new(run_date: NaiveDate) -> Self {
        Self { run_date }
    }

    pub fn today_in(tz: Tz) -> Self {
        Self::new(Utc::now().with_timezone(&tz).date_naive())
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::of(self.run_date)
    }

    /// The first day of a month, when the month just ended is due for
    /// rotation.
    pub fn is_rotation_day(&self) -> bool {
        self.run_date.day() == 1
    }
}

pub fn parse_run_date(raw: &str) -> Result<NaiveDate, TrendError> {
    let trimmed = raw.trim();
    if !is_iso_date_shape(trimmed) {
        return Err(TrendError::InvalidInput(format!(
            "invalid date `{raw}`: expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|err| TrendError::InvalidInput(format!("invalid date `{raw}`: {err}")))
}

/// `DDDD-DD-DD` with ASCII digits. Checked before chrono so that loose forms
/// like `2024-1-5` are rejected.
pub fn is_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
