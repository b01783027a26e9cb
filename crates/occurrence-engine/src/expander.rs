//! Range expansion -- turns one stored event into the occurrences a caller asked for.
//!
//! Expansion never fails. An event without a usable recurrence rule, or one
//! whose rule cannot be generated, comes back as its single stored instance.

use chrono::{DateTime, Months, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};
use crate::exdate::ExceptionDates;
use crate::generator::generate;
use crate::rule::{self, RecurrenceRule};
use crate::window::QueryWindow;

/// Limits applied to every expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionOptions {
    /// How far past the anchor a rule without `UNTIL` or `COUNT` is expanded
    /// when the query has no end.
    pub horizon_months: u32,
    /// Hard ceiling on occurrences kept per event.
    pub max_occurrences: usize,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            horizon_months: 24,
            max_occurrences: 10_000,
        }
    }
}

/// A stored event as handed over by the storage layer.
///
/// `payload` carries everything the engine does not look at (title,
/// location, ids) and is cloned onto each occurrence. It is flattened, so in
/// JSON those fields sit next to `start` and `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent<P> {
    #[serde(alias = "start_utc")]
    pub start: DateTime<Utc>,
    #[serde(alias = "end_utc")]
    pub end: DateTime<Utc>,
    #[serde(default, alias = "rrule")]
    pub recurrence: Option<String>,
    #[serde(default, alias = "exdates")]
    pub exception_dates: Vec<String>,
    /// Zone whose wall clock the recurrence follows; UTC when absent.
    #[serde(default)]
    pub timezone: Option<Tz>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> SourceEvent<P> {
    /// A non-recurring event.
    pub fn single(start: DateTime<Utc>, end: DateTime<Utc>, payload: P) -> Self {
        Self {
            start,
            end,
            recurrence: None,
            exception_dates: Vec::new(),
            timezone: None,
            payload,
        }
    }

    /// A non-recurring event from zone-less datetimes, taken to be UTC.
    pub fn from_naive(start: NaiveDateTime, end: NaiveDateTime, payload: P) -> Self {
        Self::single(start.and_utc(), end.and_utc(), payload)
    }

    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.recurrence = Some(rule.into());
        self
    }

    pub fn with_exception_dates<S: Into<String>>(
        mut self,
        dates: impl IntoIterator<Item = S>,
    ) -> Self {
        self.exception_dates = dates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// The parsed recurrence rule, if there is a usable one.
    pub fn rule(&self) -> Option<RecurrenceRule> {
        self.recurrence.as_deref().and_then(rule::parse)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Zone the recurrence is generated in.
    pub fn zone(&self) -> Tz {
        self.timezone.unwrap_or(Tz::UTC)
    }
}

/// One concrete instance of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence<P> {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_recurring: bool,
    /// The source event's own start, whichever instance this is.
    pub original_start: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: P,
}

/// Expand `event` with the default [`ExpansionOptions`].
pub fn expand<P: Clone>(event: &SourceEvent<P>, window: &QueryWindow) -> Vec<Occurrence<P>> {
    expand_with(event, window, &ExpansionOptions::default())
}

/// Expand `event` into the occurrences that overlap `window`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use occurrence_engine::{expand, QueryWindow, SourceEvent};
///
/// let event = SourceEvent::single(
///     Utc.with_ymd_and_hms(2025, 9, 2, 8, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2025, 9, 2, 9, 0, 0).unwrap(),
///     "Piano",
/// )
/// .with_recurrence("FREQ=DAILY;INTERVAL=1;UNTIL=2025-09-05T00:00:00Z")
/// .with_exception_dates(["2025-09-03"]);
///
/// let occurrences = expand(&event, &QueryWindow::unbounded());
/// assert_eq!(occurrences.len(), 2);
/// assert!(occurrences.iter().all(|o| o.is_recurring));
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(start = %event.start))]
pub fn expand_with<P: Clone>(
    event: &SourceEvent<P>,
    window: &QueryWindow,
    options: &ExpansionOptions,
) -> Vec<Occurrence<P>> {
    let Some(rule) = event.rule() else {
        return single_instance(event, window);
    };

    match expand_recurring(event, &rule, window, options) {
        Ok(occurrences) => occurrences,
        Err(err) => {
            tracing::warn!(
                rule = %rule,
                error = %err,
                "recurrence expansion failed, falling back to the stored instance"
            );
            single_instance(event, window)
        }
    }
}

fn single_instance<P: Clone>(event: &SourceEvent<P>, window: &QueryWindow) -> Vec<Occurrence<P>> {
    if !window.overlaps(event.start, event.end) {
        return Vec::new();
    }
    vec![Occurrence {
        start: event.start,
        end: event.end,
        is_recurring: false,
        original_start: event.start,
        payload: event.payload.clone(),
    }]
}

fn expand_recurring<P: Clone>(
    event: &SourceEvent<P>,
    rule: &RecurrenceRule,
    window: &QueryWindow,
    options: &ExpansionOptions,
) -> Result<Vec<Occurrence<P>>> {
    let zone = event.zone();
    let duration = event.duration();

    let stop = generation_stop(event, rule, window, options)?;
    let starts = bounded_starts(event, rule, window, stop, options)?;
    let starts = ExceptionDates::parse(&event.exception_dates).exclude(starts, &zone);

    let mut occurrences = Vec::with_capacity(starts.len());
    for start in starts {
        let end = start.checked_add_signed(duration).ok_or_else(|| {
            RecurrenceError::Overflow(format!("occurrence at {start} has no representable end"))
        })?;
        if window.overlaps(start, end) {
            occurrences.push(Occurrence {
                start,
                end,
                is_recurring: true,
                original_start: event.start,
                payload: event.payload.clone(),
            });
        }
    }
    Ok(occurrences)
}

/// Where generation stops besides the rule's own `UNTIL` and `COUNT`.
///
/// The query end when there is one. Otherwise a rule without `UNTIL` or
/// `COUNT` runs to `horizon_months` past the anchor, and a bounded rule runs
/// to its own end.
fn generation_stop<P>(
    event: &SourceEvent<P>,
    rule: &RecurrenceRule,
    window: &QueryWindow,
    options: &ExpansionOptions,
) -> Result<Option<DateTime<Utc>>> {
    if let Some(end) = window.end {
        return Ok(Some(end));
    }
    if rule.until.is_some() || rule.count.is_some() {
        return Ok(None);
    }
    event
        .start
        .checked_add_months(Months::new(options.horizon_months))
        .map(Some)
        .ok_or_else(|| {
            RecurrenceError::Overflow(format!(
                "{} months past {} is outside the calendar",
                options.horizon_months, event.start
            ))
        })
}

/// Occurrence starts up to whichever of `stop`, `UNTIL`, `COUNT` and the
/// occurrence ceiling comes first.
///
/// `stop` is inclusive, `UNTIL` is exclusive. `COUNT` counts occurrences
/// before exception dates are removed. Starts that end before the window
/// opens are skipped and do not count toward the ceiling.
fn bounded_starts<P>(
    event: &SourceEvent<P>,
    rule: &RecurrenceRule,
    window: &QueryWindow,
    stop: Option<DateTime<Utc>>,
    options: &ExpansionOptions,
) -> Result<Vec<DateTime<Utc>>> {
    let schedule = generate(rule, event.start.with_timezone(&event.zone()))?;
    let duration = event.duration();
    let count = rule
        .count
        .map(|count| usize::try_from(count).unwrap_or(usize::MAX));

    let mut generated = 0usize;
    let mut starts = Vec::new();
    for start in schedule.occurrences() {
        let start = start.with_timezone(&Utc);
        if stop.is_some_and(|stop| start > stop)
            || rule.until.is_some_and(|until| start >= until)
            || count.is_some_and(|count| generated >= count)
        {
            break;
        }
        generated += 1;

        let ends_before_window = window.start.is_some_and(|from| {
            start
                .checked_add_signed(duration)
                .is_some_and(|end| end <= from)
        });
        if ends_before_window {
            continue;
        }
        if starts.len() >= options.max_occurrences {
            tracing::warn!(
                max = options.max_occurrences,
                rule = %rule,
                "occurrence ceiling reached, truncating expansion"
            );
            break;
        }
        starts.push(start);
    }
    Ok(starts)
}
