//! Date parsing for slip fields and record timestamps.
//!
//! Slips print dates like `2024/12/09 (월) 10:12:34`; OCR output may use
//! `-`, `/` or `.` as separators. Record timestamps are ISO 8601.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

const DATE_PATTERN: &str = r"(\d{4})\s*[-/.년]\s*(\d{1,2})\s*[-/.월]\s*(\d{1,2})";

static DATE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn date_regex() -> Option<&'static Regex> {
    DATE_REGEX
        .get_or_init(|| Regex::new(DATE_PATTERN).ok())
        .as_ref()
}

/// Finds the first calendar date in a slip text field.
pub fn parse_slip_date(text: &str) -> Option<NaiveDate> {
    let caps = date_regex()?.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a record timestamp. Falls back to slip-date parsing for
/// date-only or oddly formatted values.
pub fn parse_timestamp(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    parse_slip_date(text)
}

/// Calendar month used to bucket purchases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
