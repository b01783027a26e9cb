use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use occurrence_engine::{describe_str, frequency_of, until_of, validate, validate_event, SourceEvent};
use serde::Serialize;
use serde_json::Value;

use super::read_input;

#[derive(Args)]
pub struct ValidateArgs {
    /// Rule text to check
    #[arg(conflicts_with = "events")]
    rule: Option<String>,

    /// JSON array of stored events to check instead of a single rule
    #[arg(long, value_name = "FILE")]
    events: Option<PathBuf>,
}

#[derive(Serialize)]
struct RuleReport {
    valid: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    error: String,
    frequency: Option<String>,
    until: Option<String>,
    description: String,
}

#[derive(Serialize)]
struct EventReport {
    index: usize,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: &ValidateArgs) -> Result<ExitCode> {
    let all_valid = match &args.events {
        Some(path) => check_events(path)?,
        None => check_rule(args.rule.as_deref())?,
    };
    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check_rule(rule: Option<&str>) -> Result<bool> {
    let (valid, error) = validate(rule);
    let report = RuleReport {
        valid,
        error,
        frequency: frequency_of(rule).map(|f| f.to_string()),
        until: until_of(rule).map(|until| until.to_rfc3339()),
        description: describe_str(rule),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(valid)
}

fn check_events(path: &Path) -> Result<bool> {
    let text = read_input(path)?;
    let events: Vec<SourceEvent<Value>> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid events in {}", path.display()))?;

    let reports: Vec<EventReport> = events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let error = validate_event(event).err().map(|err| err.to_string());
            if let Some(error) = &error {
                tracing::warn!(index, %error, "invalid event");
            }
            EventReport {
                index,
                valid: error.is_none(),
                error,
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(reports.iter().all(|report| report.valid))
}
