//! # occurrence-engine
//!
//! Recurring-event expansion for a family calendar.
//!
//! Stored events carry an iCalendar-style recurrence rule and a list of
//! exception dates. This crate turns them into the concrete occurrences that
//! fall inside a query window, without ever failing a query: a rule that does
//! not parse degrades to the event's single stored instance.
//!
//! ## Modules
//!
//! - [`rule`] -- rule text to [`RecurrenceRule`], fail-soft and strict parsers
//! - [`generator`] -- `rrule`-backed occurrence schedule for a rule and an anchor
//! - [`exdate`] -- exception-date parsing and filtering
//! - [`window`] -- half-open query windows, day and week views
//! - [`expander`] -- single-event expansion with bounds and fallbacks
//! - [`aggregate`] -- multi-event expansion, merged and sorted
//! - [`validate`] -- rule and event checks
//! - [`describe`] -- plain-English rule text
//! - [`temporal`] -- datetime and timezone parsing helpers
//! - [`error`] -- error types

pub mod aggregate;
pub mod describe;
pub mod error;
pub mod exdate;
pub mod expander;
pub mod generator;
pub mod rule;
pub mod temporal;
pub mod validate;
pub mod window;

pub use aggregate::{expand_all, expand_all_with, expand_matching};
pub use describe::{describe, describe_str};
pub use error::RecurrenceError;
pub use exdate::ExceptionDates;
pub use expander::{expand, expand_with, ExpansionOptions, Occurrence, SourceEvent};
pub use generator::{generate, Schedule};
pub use rule::{Frequency, RecurrenceRule, WeekdaySpec};
pub use validate::{frequency_of, until_of, validate, validate_event};
pub use window::QueryWindow;
