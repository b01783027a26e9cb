//! Occurrence generation -- hands a [`RecurrenceRule`] to the `rrule` crate.
//!
//! [`generate`] turns a rule and an anchor into a [`Schedule`], an
//! `RRuleSet` built from `DTSTART;TZID=<zone>:<local time>` plus the rule.
//! `COUNT` and `UNTIL` are left out of the text handed to `rrule`: the caller
//! applies them while consuming [`Schedule::occurrences`], together with its
//! own horizon and ceiling.
//!
//! Occurrences are produced on the anchor zone's wall clock, so a 08:00 event
//! stays at 08:00 local time across DST changes.

use chrono::{DateTime, Datelike, SubsecRound, TimeDelta};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{RecurrenceError, Result};
use crate::rule::{Frequency, RecurrenceRule};

/// Build the occurrence schedule for `rule` anchored at `anchor`.
///
/// The anchor itself is yielded only when it satisfies the rule.
///
/// # Errors
///
/// [`RecurrenceError::Overflow`] when the anchor lies outside the years
/// iCalendar can express, [`RecurrenceError::InvalidRule`] when `rrule`
/// rejects the rule.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use chrono_tz::Tz;
/// use occurrence_engine::{generator::generate, rule::parse};
///
/// let rule = parse("FREQ=WEEKLY;BYDAY=TU,TH").unwrap();
/// let anchor = Tz::UTC.with_ymd_and_hms(2025, 9, 2, 8, 0, 0).unwrap();
/// let schedule = generate(&rule, anchor).unwrap();
/// let starts: Vec<_> = schedule.occurrences().take(3).collect();
///
/// assert_eq!(starts[1], Tz::UTC.with_ymd_and_hms(2025, 9, 4, 8, 0, 0).unwrap());
/// assert_eq!(starts[2], Tz::UTC.with_ymd_and_hms(2025, 9, 9, 8, 0, 0).unwrap());
/// ```
pub fn generate(rule: &RecurrenceRule, anchor: DateTime<Tz>) -> Result<Schedule> {
    let zone = anchor.timezone();
    let local = anchor.naive_local();
    if !(1..=9999).contains(&local.year()) {
        return Err(RecurrenceError::Overflow(format!(
            "anchor {anchor} is outside the years a recurrence can start in"
        )));
    }

    let text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        zone.name(),
        local.format("%Y%m%dT%H%M%S"),
        open_ended(rule)
    );
    let set: RRuleSet = text
        .parse()
        .map_err(|err| RecurrenceError::InvalidRule(format!("{err}")))?;

    Ok(Schedule {
        set,
        zone,
        fraction: anchor - anchor.trunc_subsecs(0),
    })
}

/// `rule` without its own stopping points, in the form `rrule` accepts.
///
/// Ordinal weekdays only mean something for monthly and yearly rules; for
/// daily and weekly rules they are reduced to the plain weekday.
fn open_ended(rule: &RecurrenceRule) -> RecurrenceRule {
    let mut open = rule.clone();
    open.until = None;
    open.count = None;
    if matches!(open.frequency, Frequency::Daily | Frequency::Weekly) {
        for spec in &mut open.by_weekday {
            spec.ordinal = None;
        }
        open.by_weekday.dedup();
    }
    open
}

/// A recurrence ready to be walked. See [`generate`].
#[derive(Debug, Clone)]
pub struct Schedule {
    set: RRuleSet,
    zone: Tz,
    fraction: TimeDelta,
}

impl Schedule {
    /// Occurrence starts in ascending order, in the anchor's zone.
    ///
    /// Unbounded for rules without an end; every call starts over from the
    /// anchor.
    pub fn occurrences(&self) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        (&self.set)
            .into_iter()
            .map(move |start| start.with_timezone(&self.zone) + self.fraction)
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }
}
