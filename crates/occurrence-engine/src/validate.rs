//! Rule and event checks for use before storing an event.

use chrono::{DateTime, Utc};

use crate::error::{RecurrenceError, Result};
use crate::exdate::parse_exception_date;
use crate::expander::SourceEvent;
use crate::rule::{parse_strict, segments, Frequency};
use crate::temporal::parse_instant_utc;

/// Check a recurrence rule.
///
/// An absent or empty rule is valid: the event simply does not repeat.
/// On failure the message names the offending input.
///
/// ```
/// use occurrence_engine::validate::validate;
///
/// assert_eq!(validate(Some("FREQ=WEEKLY;BYDAY=MO")), (true, String::new()));
/// assert_eq!(validate(None), (true, String::new()));
///
/// let (ok, message) = validate(Some("INVALID"));
/// assert!(!ok);
/// assert!(message.contains("INVALID"));
/// ```
pub fn validate(rule: Option<&str>) -> (bool, String) {
    match non_empty(rule).map(parse_strict) {
        None | Some(Ok(_)) => (true, String::new()),
        Some(Err(err)) => (false, err.to_string()),
    }
}

/// The rule's `FREQ`, read without parsing the rest of the rule.
pub fn frequency_of(rule: Option<&str>) -> Option<Frequency> {
    let (_, value) = segments(non_empty(rule)?).find(|(key, _)| key == "FREQ")?;
    value.parse().ok()
}

/// The rule's `UNTIL`, read without parsing the rest of the rule.
pub fn until_of(rule: Option<&str>) -> Option<DateTime<Utc>> {
    let (_, value) = segments(non_empty(rule)?).find(|(key, _)| key == "UNTIL")?;
    parse_instant_utc(value)
}

/// Check everything expansion would otherwise quietly work around.
///
/// # Errors
///
/// - [`RecurrenceError::InvalidEvent`] unless the event ends after it starts
/// - any [`parse_strict`] error for a non-empty rule that does not parse
/// - [`RecurrenceError::InvalidExceptionDate`] for the first unreadable
///   exception date
pub fn validate_event<P>(event: &SourceEvent<P>) -> Result<()> {
    if event.end <= event.start {
        return Err(RecurrenceError::InvalidEvent(format!(
            "ends at {} but must end after it starts at {}",
            event.end, event.start
        )));
    }
    if let Some(rule) = non_empty(event.recurrence.as_deref()) {
        parse_strict(rule)?;
    }
    if let Some(bad) = event
        .exception_dates
        .iter()
        .find(|entry| parse_exception_date(entry).is_none())
    {
        return Err(RecurrenceError::InvalidExceptionDate(bad.clone()));
    }
    Ok(())
}

fn non_empty(rule: Option<&str>) -> Option<&str> {
    rule.filter(|rule| !rule.trim().is_empty())
}
