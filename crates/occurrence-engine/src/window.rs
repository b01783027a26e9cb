//! Query windows -- the `[start, end)` range a caller wants occurrences for.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::temporal::resolve_local;

/// A half-open `[start, end)` range; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl QueryWindow {
    /// No bounds at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Build a window from zone-less datetimes, which are taken to be UTC.
    pub fn from_naive(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self::new(
            start.map(|dt| dt.and_utc()),
            end.map(|dt| dt.and_utc()),
        )
    }

    /// The local calendar day `date` in `zone`, midnight to midnight.
    pub fn for_day<Z: TimeZone>(date: NaiveDate, zone: &Z) -> Self {
        Self::new(
            local_midnight(date, zone),
            date.succ_opt().and_then(|next| local_midnight(next, zone)),
        )
    }

    /// The Monday-to-Sunday week containing `date`, in `zone`.
    pub fn for_week<Z: TimeZone>(date: NaiveDate, zone: &Z) -> Self {
        let back = u64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_sub_days(Days::new(back));
        let next_monday = monday.and_then(|m| m.checked_add_days(Days::new(7)));
        Self::new(
            monday.and_then(|m| local_midnight(m, zone)),
            next_monday.and_then(|m| local_midnight(m, zone)),
        )
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Half-open overlap: `[start, end)` touches the window.
    ///
    /// Intervals that merely abut a bound do not overlap it.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start.is_none_or(|bound| end > bound) && self.end.is_none_or(|bound| start < bound)
    }
}

fn local_midnight<Z: TimeZone>(date: NaiveDate, zone: &Z) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    resolve_local(zone, &naive).map(|dt| dt.with_timezone(&Utc))
}
