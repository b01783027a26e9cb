//! Error types for occurrence-engine operations.
//!
//! Expansion itself never returns these: a rule that fails here degrades to a
//! single non-recurring occurrence. They surface through [`crate::validate`]
//! and [`crate::rule::parse_strict`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid RRULE: missing FREQ in '{0}'")]
    MissingFrequency(String),

    #[error("Invalid RRULE: unsupported FREQ '{0}'")]
    InvalidFrequency(String),

    #[error("Invalid RRULE: INTERVAL must be a positive integer, got '{0}'")]
    InvalidInterval(String),

    #[error("Invalid RRULE: COUNT must be a positive integer, got '{0}'")]
    InvalidCount(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid exdate format: {0}")]
    InvalidExceptionDate(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Calendar overflow: {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
