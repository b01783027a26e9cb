//! RRULE parsing -- turns RFC 5545 recurrence text into a [`RecurrenceRule`].
//!
//! The grammar is deliberately forgiving: unknown keys are ignored, bad
//! `BYDAY`/`BYMONTHDAY`/`BYMONTH` tokens are dropped one by one, and an
//! unparseable `UNTIL` simply leaves the rule unbounded. Only a missing or
//! unsupported `FREQ`, or a non-positive `INTERVAL`/`COUNT`, rejects the
//! whole rule.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};
use crate::temporal::parse_instant_utc;

/// How often a rule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The RRULE token, e.g. `"WEEKLY"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(RecurrenceError::InvalidFrequency(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `BYDAY` entry: a weekday, optionally limited to the Nth one of its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekdaySpec {
    pub weekday: Weekday,
    /// `1..=5` counts from the start of the period, `-1..=-5` from the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i8>,
}

impl WeekdaySpec {
    /// Every `weekday` of the period.
    pub fn every(weekday: Weekday) -> Self {
        Self {
            weekday,
            ordinal: None,
        }
    }

    /// The `ordinal`-th `weekday` of the period (`-1` is the last one).
    pub fn nth(weekday: Weekday, ordinal: i8) -> Self {
        Self {
            weekday,
            ordinal: Some(ordinal),
        }
    }

    /// Parse a single `BYDAY` token such as `TU`, `1FR`, `+2MO` or `-1SU`.
    pub fn parse_token(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_uppercase();
        let split = token.len().checked_sub(2)?;
        let prefix = token.get(..split)?;
        let weekday = weekday_from_code(token.get(split..)?)?;

        let ordinal = if prefix.is_empty() {
            None
        } else {
            let n: i8 = prefix.parse().ok()?;
            if n == 0 || !(-5..=5).contains(&n) {
                return None;
            }
            Some(n)
        };

        Some(Self { weekday, ordinal })
    }
}

impl fmt::Display for WeekdaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub by_weekday: Vec<WeekdaySpec>,
    /// Days of the month; negative values count back from the month's end.
    #[serde(default)]
    pub by_month_day: Vec<i8>,
    #[serde(default)]
    pub by_month: Vec<u32>,
    /// Exclusive upper bound on occurrence starts.
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    /// A rule repeating every period at `frequency` with no other constraint.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: default_interval(),
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            until: None,
            count: None,
        }
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self> {
        parse_strict(s)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.frequency)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if !self.by_weekday.is_empty() {
            write!(f, ";BYDAY={}", join(&self.by_weekday))?;
        }
        if !self.by_month_day.is_empty() {
            write!(f, ";BYMONTHDAY={}", join(&self.by_month_day))?;
        }
        if !self.by_month.is_empty() {
            write!(f, ";BYMONTH={}", join(&self.by_month))?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format("%Y%m%dT%H%M%SZ"))?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        Ok(())
    }
}

/// Parse a recurrence rule, treating anything unusable as "no rule".
///
/// Returns `None` for empty input and for every rule [`parse_strict`] rejects.
/// Callers that need the reason should use [`crate::validate::validate`].
///
/// # Examples
///
/// ```
/// use occurrence_engine::rule::{parse, Frequency};
///
/// let rule = parse("RRULE:FREQ=WEEKLY;BYDAY=TU,TH").unwrap();
/// assert_eq!(rule.frequency, Frequency::Weekly);
/// assert_eq!(rule.by_weekday.len(), 2);
///
/// assert!(parse("INVALID=RULE").is_none());
/// ```
pub fn parse(input: &str) -> Option<RecurrenceRule> {
    if input.trim().is_empty() {
        return None;
    }
    match parse_strict(input) {
        Ok(rule) => Some(rule),
        Err(err) => {
            tracing::debug!(rule = input, error = %err, "rejecting recurrence rule");
            None
        }
    }
}

/// Parse a recurrence rule, reporting why it was rejected.
///
/// # Errors
///
/// - [`RecurrenceError::MissingFrequency`] when there is no `FREQ` (including empty input)
/// - [`RecurrenceError::InvalidFrequency`] for a `FREQ` other than DAILY/WEEKLY/MONTHLY/YEARLY
/// - [`RecurrenceError::InvalidInterval`] / [`RecurrenceError::InvalidCount`] for values
///   that are not positive integers
pub fn parse_strict(input: &str) -> Result<RecurrenceRule> {
    let mut frequency = None;
    let mut rule = RecurrenceRule::new(Frequency::Daily);

    for (key, value) in segments(input) {
        match key.as_str() {
            "FREQ" => frequency = Some(value.parse::<Frequency>()?),
            "INTERVAL" => {
                rule.interval = parse_positive(value)
                    .ok_or_else(|| RecurrenceError::InvalidInterval(value.to_string()))?;
            }
            "COUNT" => {
                let count = parse_positive(value)
                    .ok_or_else(|| RecurrenceError::InvalidCount(value.to_string()))?;
                rule.count = Some(count);
            }
            "BYDAY" => {
                rule.by_weekday =
                    collect_unique(value.split(',').filter_map(WeekdaySpec::parse_token));
            }
            "BYMONTHDAY" => {
                rule.by_month_day = collect_unique(value.split(',').filter_map(parse_month_day));
            }
            "BYMONTH" => {
                rule.by_month = collect_unique(value.split(',').filter_map(parse_month));
            }
            "UNTIL" => {
                rule.until = parse_instant_utc(value);
                if rule.until.is_none() {
                    tracing::debug!(until = value, "ignoring unparseable UNTIL");
                }
            }
            _ => {}
        }
    }

    rule.frequency = frequency
        .ok_or_else(|| RecurrenceError::MissingFrequency(input.trim().to_string()))?;
    Ok(rule)
}

/// Split rule text into upper-cased keys and trimmed values.
///
/// Strips an optional `RRULE:` prefix and skips segments without `=`.
pub(crate) fn segments(input: &str) -> impl Iterator<Item = (String, &str)> + '_ {
    strip_rrule_prefix(input.trim())
        .split(';')
        .filter_map(|segment| segment.split_once('='))
        .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim()))
}

fn strip_rrule_prefix(s: &str) -> &str {
    match s.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &s[6..],
        _ => s,
    }
}

pub(crate) fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

pub(crate) fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|n| *n > 0)
}

fn parse_month_day(token: &str) -> Option<i8> {
    token
        .trim()
        .parse::<i8>()
        .ok()
        .filter(|d| (1..=31).contains(d) || (-31..=-1).contains(d))
}

fn parse_month(token: &str) -> Option<u32> {
    token
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
}

fn collect_unique<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
