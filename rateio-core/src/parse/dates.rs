//! Year and month extraction from free-form date cells

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

static BR_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(20\d{2})\b").expect("valid date regex"));
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(20\d{2})-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])\b").expect("valid iso regex")
});
static ANY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(20\d{2})").expect("valid year regex"));

/// Formats tried, in order, when a cell has to be read as a whole date.
/// Day-first comes before month-first because the sheets are pt-BR.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Extract a four-digit year from a date-ish cell
///
/// First match wins: `D/M/YYYY`, ISO `YYYY-MM-DD`, any `20YY` token, then a
/// full date parse of the whole string.
pub fn extract_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = BR_DATE_RE.captures(s) {
        return caps[3].parse().ok();
    }
    if let Some(caps) = ISO_DATE_RE.captures(s) {
        return caps[1].parse().ok();
    }
    if let Some(caps) = ANY_YEAR_RE.captures(s) {
        return caps[1].parse().ok();
    }
    parse_full_date(s).map(|d| d.year())
}

/// Calendar month of a cell read as a whole date
pub fn month_from_date(raw: &str) -> Option<u32> {
    parse_full_date(raw.trim()).map(|d| d.month())
}

/// Best-effort parse of a whole cell as a date
pub fn parse_full_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year_patterns() {
        assert_eq!(extract_year("12/05/2025"), Some(2025));
        assert_eq!(extract_year("1/5/2024"), Some(2024));
        assert_eq!(extract_year("2025-05-12"), Some(2025));
        assert_eq!(extract_year("relatório 2025 final"), Some(2025));
        assert_eq!(extract_year("no date here"), None);
        assert_eq!(extract_year(""), None);
    }

    #[test]
    fn test_extract_year_priority() {
        // the D/M/YYYY group wins over an earlier bare year
        assert_eq!(extract_year("lote 2023 - 05/06/2025"), Some(2025));
    }

    #[test]
    fn test_extract_year_falls_back_to_full_parse() {
        assert_eq!(extract_year("1999-12-31"), Some(1999));
        assert_eq!(extract_year("31.12.1998"), Some(1998));
    }

    #[test]
    fn test_month_from_date() {
        assert_eq!(month_from_date("05/06/2025"), Some(6));
        assert_eq!(month_from_date("2025-07-01"), Some(7));
        assert_eq!(month_from_date("2025-08-01T10:00:00Z"), Some(8));
        assert_eq!(month_from_date("junho"), None);
        assert_eq!(month_from_date(""), None);
    }

    #[test]
    fn test_ambiguous_dates_read_day_first() {
        // pt-BR sheets: 05/06/2025 is 5 June, not 6 May
        assert_eq!(parse_full_date("05/06/2025"), NaiveDate::from_ymd_opt(2025, 6, 5));
        assert_eq!(parse_full_date("01-02-2025"), NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(month_from_date("12/01/2025"), Some(1));

        // month-first is only a fallback for dates day-first cannot read
        assert_eq!(parse_full_date("06/13/2025"), NaiveDate::from_ymd_opt(2025, 6, 13));
    }
}
