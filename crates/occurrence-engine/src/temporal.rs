//! Timezone resolution and datetime text parsing shared by the rule parser,
//! the exception filter and the query window helpers.
//!
//! Values without an explicit zone are always read as UTC. Local wall-clock
//! times are resolved against a zone with fixed rules: an ambiguous time (the
//! repeated hour of a fall-back transition) takes the earlier offset, and a
//! time inside a spring-forward gap is interpreted with the offset in force
//! before the gap, which moves it forward by the length of the gap.

use chrono::{
    DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{RecurrenceError, Result};

/// Naive datetime layouts accepted after any trailing `Z` is removed.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse an IANA timezone name into [`Tz`].
///
/// # Errors
///
/// Returns [`RecurrenceError::InvalidTimezone`] when the name is unknown.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| RecurrenceError::InvalidTimezone(format!("'{}'", s.trim())))
}

/// Parse a datetime in any of the accepted layouts.
///
/// RFC 3339 strings keep their offset. Naive datetimes (`20251220T000000`,
/// `2025-12-20T00:00:00`, with or without a trailing `Z`) and bare dates
/// (`2025-12-20`, `20251220`, read as midnight) are taken to be UTC.
pub fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let naive_text = s
        .strip_suffix('Z')
        .or_else(|| s.strip_suffix('z'))
        .unwrap_or(s);
    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive_text, fmt).ok())
        .or_else(|| parse_calendar_date(naive_text).and_then(|d| d.and_hms_opt(0, 0, 0)))?;

    Some(Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Parse a datetime and normalize it to UTC. See [`parse_instant`].
pub fn parse_instant_utc(s: &str) -> Option<DateTime<Utc>> {
    parse_instant(s).map(|dt| dt.with_timezone(&Utc))
}

/// Parse a bare calendar date (`YYYY-MM-DD` or `YYYYMMDD`).
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Resolve a local wall-clock time in `zone` to a concrete instant.
///
/// Returns `None` only when the local time cannot be placed at all, which
/// happens at the very edges of the supported calendar range.
pub fn resolve_local<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<DateTime<Z>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            // Inside a DST gap: use the offset from the day before.
            let before = naive.checked_sub_signed(TimeDelta::days(1))?;
            let offset = zone.offset_from_local_datetime(&before).earliest()?;
            let secs = i64::from(offset.fix().local_minus_utc());
            let utc = naive.checked_sub_signed(TimeDelta::seconds(secs))?;
            Some(zone.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveTime, Timelike};

    #[test]
    fn test_parse_timezone_valid_and_invalid() {
        assert_eq!(parse_timezone("America/New_York").unwrap(), Tz::America__New_York);
        let err = parse_timezone("Invalid/Zone").unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_parse_instant_rfc3339_keeps_offset() {
        let dt = parse_instant("2025-12-20T09:00:00+02:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!(dt.with_timezone(&Utc).hour(), 7);
    }

    #[test]
    fn test_parse_instant_ical_forms_are_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap();
        for text in [
            "20251220T000000Z",
            "20251220T000000",
            "2025-12-20T00:00:00Z",
            "2025-12-20T00:00:00",
            "2025-12-20",
            "20251220",
        ] {
            assert_eq!(parse_instant_utc(text), Some(expected), "input: {text}");
        }
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(parse_instant("next tuesday").is_none());
        assert!(parse_instant("2025-13-40").is_none());
        assert!(parse_instant("").is_none());
    }

    #[test]
    fn test_parse_calendar_date() {
        let date = parse_calendar_date("2025-09-03").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2025, 9, 3));
        assert_eq!(parse_calendar_date("20250903"), Some(date));
        assert!(parse_calendar_date("2025-09-03T10:00:00Z").is_none());
    }

    #[test]
    fn test_resolve_local_spring_forward_gap_shifts_forward() {
        // March 8, 2026: 02:30 does not exist in New York.
        let naive = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(2, 30, 0).unwrap());
        let dt = resolve_local(&Tz::America__New_York, &naive).unwrap();
        assert_eq!(dt.hour(), 3);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.with_timezone(&Utc).hour(), 7);
    }

    #[test]
    fn test_resolve_local_fall_back_takes_earlier_offset() {
        // November 1, 2026: 01:30 happens twice in New York.
        let naive = NaiveDate::from_ymd_opt(2026, 11, 1)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(1, 30, 0).unwrap());
        let dt = resolve_local(&Tz::America__New_York, &naive).unwrap();
        // Earlier instant is still EDT (UTC-4).
        assert_eq!(dt.with_timezone(&Utc).hour(), 5);
    }
}
