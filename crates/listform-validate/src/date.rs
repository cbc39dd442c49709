//! Date parsing
//!
//! Date responses are `YYYY-MM-DD` strings. The month may also be written as
//! an English month name or abbreviation (`2024-feb-03`), which is normalised
//! before checking. Checks run in a fixed order so the most specific message
//! wins: missing components, then component ranges, then calendar validity,
//! then the field's own range.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FieldErrorKind;

static ISO_DATE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok());

const MONTH_NAMES: [&[&str]; 12] = [
    &["january", "jan"],
    &["february", "feb"],
    &["march", "mar"],
    &["april", "apr"],
    &["may"],
    &["june", "jun"],
    &["july", "jul"],
    &["august", "aug"],
    &["september", "sep", "sept"],
    &["october", "oct"],
    &["november", "nov"],
    &["december", "dec"],
];

/// Parsed components of a date string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    /// Leading digits of the year component
    pub year: Option<i32>,
    /// Month number, after name normalisation
    pub month: Option<u32>,
    /// Leading digits of the day component
    pub day: Option<u32>,
}

/// Rewrite a month name as a two-digit number
///
/// Numeric months pass through unchanged. Unrecognised names become `"0"`,
/// which later fails the month range check.
#[must_use]
pub fn normalize_month(month: &str) -> String {
    if month.is_empty() || month.chars().all(|c| c.is_ascii_digit()) {
        return month.to_string();
    }

    let name = month.trim().to_lowercase();
    if let Some(index) = MONTH_NAMES
        .iter()
        .position(|names| names.contains(&name.as_str()))
    {
        return format!("{:02}", index + 1);
    }

    if name.chars().any(|c| c.is_ascii_alphabetic()) {
        "0".to_string()
    } else {
        name
    }
}

/// Normalise the month component of a `YYYY-MM-DD` string
#[must_use]
pub fn normalize_date(date: &str) -> String {
    let mut parts = date.splitn(3, '-');
    let year = parts.next().unwrap_or_default();
    let month = normalize_month(parts.next().unwrap_or_default());
    let day = parts.next().unwrap_or_default();
    format!("{year}-{month}-{day}")
}

/// Leading-digit integer parse; `None` when no digits lead
fn leading_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

impl DateParts {
    /// Split a date string into components
    #[must_use]
    pub fn parse(date: &str) -> Self {
        let mut parts = date.splitn(3, '-');
        let year = parts.next().and_then(leading_number);
        let month = parts
            .next()
            .and_then(|m| leading_number(&normalize_month(m)));
        let day = parts.next().and_then(leading_number);
        Self { year, month, day }
    }
}

/// Check a date string and return the calendar date it denotes
///
/// # Errors
/// Returns the first failing check, in order: missing day, missing month,
/// missing year, invalid day, invalid month, calendar validity. Calendar
/// validity requires exactly `YYYY-MM-DD` once the month is normalised.
pub fn parse_date(date: &str) -> Result<NaiveDate, FieldErrorKind> {
    let DateParts { year, month, day } = DateParts::parse(date);

    let day = day.ok_or(FieldErrorKind::MissingDay)?;
    let month = month.ok_or(FieldErrorKind::MissingMonth)?;
    let year = year.ok_or(FieldErrorKind::MissingYear)?;

    if day == 0 || day > 31 {
        return Err(FieldErrorKind::InvalidDay);
    }
    if !(1..=12).contains(&month) {
        return Err(FieldErrorKind::InvalidMonth);
    }
    if !(1..=9999).contains(&year) {
        return Err(FieldErrorKind::InvalidDate);
    }

    let normalized = normalize_date(date.trim());
    let well_formed = ISO_DATE
        .as_ref()
        .map_or(true, |re| re.is_match(&normalized));
    if !well_formed {
        return Err(FieldErrorKind::InvalidDate);
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or(FieldErrorKind::InvalidDate)
}

/// Check a date string against an optional inclusive range
///
/// # Errors
/// Returns a [`parse_date`] error, or `TooSoon`/`TooLate` for out-of-range dates
pub fn check_date(
    date: &str,
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
) -> Result<NaiveDate, FieldErrorKind> {
    let parsed = parse_date(date)?;
    if let Some(min) = min {
        if parsed < min {
            return Err(FieldErrorKind::TooSoon { min });
        }
    }
    if let Some(max) = max {
        if parsed > max {
            return Err(FieldErrorKind::TooLate { max });
        }
    }
    Ok(parsed)
}
