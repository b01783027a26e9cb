//! Exception dates -- calendar days on which a recurring event is skipped.
//!
//! Matching is by calendar date only: an exception for `2025-09-03` removes
//! every occurrence that starts on September 3rd in the event's expansion
//! timezone, whatever its time of day.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::temporal::{parse_calendar_date, parse_instant};

/// A set of dates excluded from a recurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionDates {
    dates: BTreeSet<NaiveDate>,
}

impl ExceptionDates {
    /// Parse exception date strings, skipping the ones that cannot be read.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYYMMDD`, or a full datetime, in which case the
    /// date as written is used. Bad entries are logged and otherwise ignored.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Self {
        let dates = raw
            .iter()
            .filter_map(|entry| {
                let entry = entry.as_ref();
                let date = parse_exception_date(entry);
                if date.is_none() {
                    tracing::warn!(exdate = entry, "skipping unparseable exception date");
                }
                date
            })
            .collect();
        Self { dates }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Whether `date` is one of the exception dates.
    pub fn excludes(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Drop every start whose calendar date in `zone` is an exception date.
    ///
    /// Order is preserved and nothing is ever added.
    pub fn exclude<Z: TimeZone>(&self, starts: Vec<DateTime<Utc>>, zone: &Z) -> Vec<DateTime<Utc>> {
        if self.dates.is_empty() {
            return starts;
        }
        let mut starts = starts;
        starts.retain(|start| !self.excludes(start.with_timezone(zone).date_naive()));
        starts
    }
}

impl FromIterator<NaiveDate> for ExceptionDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

/// Read one exception date entry. See [`ExceptionDates::parse`].
pub fn parse_exception_date(entry: &str) -> Option<NaiveDate> {
    parse_calendar_date(entry).or_else(|| parse_instant(entry).map(|dt| dt.date_naive()))
}
