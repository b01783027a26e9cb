use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const EVENTS: &str = r#"[
    {
        "start": "2025-09-02T08:00:00Z",
        "end": "2025-09-02T09:00:00Z",
        "recurrence": "FREQ=DAILY;INTERVAL=1;UNTIL=2025-09-05T00:00:00Z",
        "exception_dates": ["2025-09-03"],
        "title": "Piano",
        "category": "after-school",
        "kid_id": 1
    },
    {
        "start_utc": "2025-09-02T12:00:00Z",
        "end_utc": "2025-09-02T13:00:00Z",
        "title": "Dentist",
        "category": "health",
        "kid_id": 2
    }
]"#;

fn famcal() -> Command {
    Command::cargo_bin("famcal").unwrap()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn expand_reads_stdin_and_sorts() {
    let output = famcal()
        .args(["expand", "--events", "-"])
        .write_stdin(EVENTS)
        .assert()
        .success()
        .get_output()
        .clone();
    let occurrences = stdout_json(&output);
    let starts: Vec<&str> = occurrences
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["start"].as_str().unwrap())
        .collect();
    assert_eq!(
        starts,
        vec![
            "2025-09-02T08:00:00Z",
            "2025-09-02T12:00:00Z",
            "2025-09-04T08:00:00Z"
        ]
    );
}

#[test]
fn expand_applies_window_and_filter() {
    let output = famcal()
        .args([
            "expand",
            "--from",
            "2025-09-02T10:00:00Z",
            "--to",
            "2025-09-10",
            "--where",
            "kid_id=1",
        ])
        .write_stdin(EVENTS)
        .assert()
        .success()
        .get_output()
        .clone();
    let occurrences = stdout_json(&output);
    let occurrences = occurrences.as_array().unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0]["title"], "Piano");
    assert_eq!(occurrences[0]["is_recurring"], true);
}

#[test]
fn expand_day_view_in_timezone() {
    // 08:00 UTC on Sept 4 is still Sept 4 in Berlin; the Dentist is on the 2nd.
    let output = famcal()
        .args(["expand", "--day", "2025-09-04", "--timezone", "Europe/Berlin"])
        .write_stdin(EVENTS)
        .assert()
        .success()
        .get_output()
        .clone();
    let occurrences = stdout_json(&output);
    assert_eq!(occurrences.as_array().unwrap().len(), 1);
}

#[test]
fn expand_respects_max_occurrences_flag() {
    let events = r#"[{
        "start": "2025-09-01T08:00:00Z",
        "end": "2025-09-01T09:00:00Z",
        "recurrence": "FREQ=DAILY"
    }]"#;
    let output = famcal()
        .args(["expand", "--max-occurrences", "5"])
        .write_stdin(events)
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 5);
}

#[test]
fn expand_reaches_events_created_years_ago() {
    let events = r#"[{
        "start": "2023-01-03T08:00:00Z",
        "end": "2023-01-03T09:00:00Z",
        "recurrence": "FREQ=WEEKLY;BYDAY=TU",
        "title": "Swim practice"
    }]"#;
    let output = famcal()
        .args(["expand", "--week", "2025-09-03"])
        .write_stdin(events)
        .assert()
        .success()
        .get_output()
        .clone();
    let occurrences = stdout_json(&output);
    let occurrences = occurrences.as_array().unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0]["start"], "2025-09-02T08:00:00Z");
    assert_eq!(occurrences[0]["title"], "Swim practice");
}

#[test]
fn validate_events_rejects_zero_length_event() {
    let events = r#"[{"start": "2025-09-01T08:00:00Z", "end": "2025-09-01T08:00:00Z"}]"#;
    famcal()
        .args(["validate", "--events", "-"])
        .write_stdin(events)
        .assert()
        .failure()
        .stdout(predicate::str::contains("must end after it starts"));
}

#[test]
fn expand_rejects_bad_timezone() {
    famcal()
        .args(["expand", "--day", "2025-09-04", "--timezone", "Mars/Olympus"])
        .write_stdin(EVENTS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn expand_rejects_malformed_input() {
    famcal()
        .arg("expand")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid events"));
}

#[test]
fn validate_good_rule() {
    famcal()
        .args(["validate", "FREQ=WEEKLY;BYDAY=TU,TH;UNTIL=20251220T000000Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""valid": true"#))
        .stdout(predicate::str::contains(r#""frequency": "WEEKLY""#))
        .stdout(predicate::str::contains(
            "Weekly on Tuesday and Thursday until December 20, 2025",
        ));
}

#[test]
fn validate_bad_rule_fails() {
    famcal()
        .args(["validate", "INVALID=RULE"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""valid": false"#))
        .stdout(predicate::str::contains("INVALID=RULE"));
}

#[test]
fn validate_events_reports_each_event() {
    let events = r#"[
        {"start": "2025-09-01T08:00:00Z", "end": "2025-09-01T09:00:00Z", "recurrence": "FREQ=DAILY"},
        {"start": "2025-09-01T08:00:00Z", "end": "2025-09-01T09:00:00Z", "exception_dates": ["someday"]}
    ]"#;
    famcal()
        .args(["validate", "--events", "-"])
        .write_stdin(events)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid exdate format: someday"));
}

#[test]
fn describe_prints_plain_english() {
    famcal()
        .args(["describe", "FREQ=MONTHLY;BYDAY=1FR"])
        .assert()
        .success()
        .stdout("Monthly on the first Friday\n");
    famcal()
        .arg("describe")
        .assert()
        .success()
        .stdout("Does not repeat\n");
}
