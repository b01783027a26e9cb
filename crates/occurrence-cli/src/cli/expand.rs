use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use occurrence_engine::temporal::{parse_calendar_date, parse_instant_utc, parse_timezone};
use occurrence_engine::{expand_matching, QueryWindow, SourceEvent};
use serde_json::Value;

use super::{read_input, LimitArgs};

#[derive(Args)]
pub struct ExpandArgs {
    /// JSON array of stored events, or `-` for stdin
    #[arg(long, short, value_name = "FILE", default_value = "-")]
    events: PathBuf,

    /// Window start, as RFC 3339 or a date (inclusive)
    #[arg(long)]
    from: Option<String>,

    /// Window end, as RFC 3339 or a date (exclusive)
    #[arg(long)]
    to: Option<String>,

    /// Only the given local day (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to", "week"])]
    day: Option<String>,

    /// Only the Monday-to-Sunday week containing this date
    #[arg(long, conflicts_with_all = ["from", "to"])]
    week: Option<String>,

    /// IANA timezone used for --day and --week
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Keep only events whose own FIELD equals VALUE; repeatable
    #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    #[command(flatten)]
    limits: LimitArgs,
}

impl ExpandArgs {
    fn window(&self) -> Result<QueryWindow> {
        let zone = parse_timezone(&self.timezone)?;
        if let Some(day) = &self.day {
            return Ok(QueryWindow::for_day(parse_date(day)?, &zone));
        }
        if let Some(week) = &self.week {
            return Ok(QueryWindow::for_week(parse_date(week)?, &zone));
        }
        Ok(QueryWindow::new(
            self.from.as_deref().map(parse_bound).transpose()?,
            self.to.as_deref().map(parse_bound).transpose()?,
        ))
    }
}

pub fn run(args: &ExpandArgs) -> Result<ExitCode> {
    let options = args.limits.options()?;
    let window = args.window()?;

    let text = read_input(&args.events)?;
    let events: Vec<SourceEvent<Value>> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid events in {}", args.events.display()))?;

    let occurrences = expand_matching(&events, &window, &options, |event| {
        args.filters
            .iter()
            .all(|(field, expected)| payload_matches(&event.payload, field, expected))
    });
    tracing::info!(
        events = events.len(),
        occurrences = occurrences.len(),
        "expanded"
    );

    println!("{}", serde_json::to_string_pretty(&occurrences)?);
    Ok(ExitCode::SUCCESS)
}

fn payload_matches(payload: &Value, field: &str, expected: &str) -> bool {
    match payload.get(field) {
        Some(Value::String(actual)) => actual == expected,
        Some(actual) => actual.to_string() == expected,
        None => false,
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    Ok((field.trim().to_string(), value.trim().to_string()))
}

fn parse_bound(text: &str) -> Result<DateTime<Utc>> {
    parse_instant_utc(text).with_context(|| format!("Invalid datetime '{text}'"))
}

fn parse_date(text: &str) -> Result<chrono::NaiveDate> {
    parse_calendar_date(text).with_context(|| format!("Invalid date '{text}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_matches_strings_and_numbers() {
        let payload = json!({"category": "school", "kid_id": 2, "title": "Math"});
        assert!(payload_matches(&payload, "category", "school"));
        assert!(payload_matches(&payload, "kid_id", "2"));
        assert!(!payload_matches(&payload, "kid_id", "3"));
        assert!(!payload_matches(&payload, "location", "gym"));
        assert!(!payload_matches(&Value::Null, "category", "school"));
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("category = sports"),
            Ok(("category".to_string(), "sports".to_string()))
        );
        assert!(parse_filter("category").is_err());
    }
}
