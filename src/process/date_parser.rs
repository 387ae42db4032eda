use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::process::utils::clean_str;

/// Timestamp layouts seen across bike-share export vintages.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a timestamp cell into a naive local datetime.
///
/// Date-only cells parse to midnight. Offsets (RFC 3339) are dropped after
/// parsing so the wall-clock time is kept, matching how the exports are
/// read everywhere else. Returns `None` for anything unrecognised.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a date-only cell.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = clean_str(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse any date-like cell and truncate the time of day.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|dt| dt.date())
}

/// Minutes between two timestamps, fractional, signed.
pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn common_layouts() {
        let want = ymd_hms(2022, 3, 1, 8, 0, 0);
        assert_eq!(parse_timestamp("2022-03-01 08:00"), Some(want));
        assert_eq!(parse_timestamp("2022-03-01 08:00:00"), Some(want));
        assert_eq!(parse_timestamp("2022-03-01T08:00:00"), Some(want));
        assert_eq!(parse_timestamp("\"2022/03/01 08:00:00\""), Some(want));
        assert_eq!(parse_timestamp("3/1/2022 8:00"), Some(want));
        assert_eq!(parse_timestamp("2022-03-01T08:00:00+05:00"), Some(want));
        assert_eq!(
            parse_timestamp("2022-03-01 08:00:00.250"),
            Some(want + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_timestamp("2022-03-01"),
            Some(ymd_hms(2022, 3, 1, 0, 0, 0))
        );
        assert_eq!(parse_day("2022-12-31 23:59:59"), NaiveDate::from_ymd_opt(2022, 12, 31));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2022-13-01 00:00"), None);
        assert_eq!(parse_day("2022-02-30"), None);
    }

    #[test]
    fn signed_minutes() {
        let a = ymd_hms(2022, 3, 1, 8, 0, 0);
        let b = ymd_hms(2022, 3, 1, 8, 15, 30);
        assert_eq!(minutes_between(a, b), 15.5);
        assert_eq!(minutes_between(b, a), -15.5);
    }
}
