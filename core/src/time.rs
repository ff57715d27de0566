use chrono::{DateTime, Datelike, Duration, NaiveDate};
use anyhow::{anyhow, Result};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Parses the date of a backend record.
///
/// Accepts plain dates (`2024-01-05`), RFC 3339 timestamps as the backend
/// serializes them (`2024-01-05T00:00:00.000Z`) and month periods (`2024-01`),
/// which resolve to the first day of the month.
pub fn parse_record_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Empty date string"));
    }

    // 1. Plain calendar date
    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(d);
    }

    // 2. Timestamps; the calendar day is taken in the timestamp's own offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    // 3. Month period
    if let Ok((year, month)) = parse_month_period(input) {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, 1) {
            return Ok(d);
        }
    }

    Err(anyhow!("Could not parse date: {}", input))
}

/// Parses a `YYYY-MM` period as used by the salary screens.
pub fn parse_month_period(input: &str) -> Result<(i32, u32)> {
    let (year_str, month_str) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| anyhow!("Expected YYYY-MM, got '{}'", input))?;

    if year_str.len() != 4 || month_str.len() != 2 {
        return Err(anyhow!("Expected YYYY-MM, got '{}'", input));
    }

    let year: i32 = year_str.parse().map_err(|_| anyhow!("Invalid year in '{}'", input))?;
    let month: u32 = month_str.parse().map_err(|_| anyhow!("Invalid month in '{}'", input))?;
    if !(1..=12).contains(&month) {
        return Err(anyhow!("Month out of range in '{}'", input));
    }
    Ok((year, month))
}

/// English month name for a 1-based month. Returns `None` outside 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// First and last day of the given month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month - Duration::days(1)))
}

/// ISO-8601 week-numbering year and week of a date.
pub fn iso_week_of(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}
