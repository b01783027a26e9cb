//! Plain-English rendering of recurrence rules for calendar UIs.

use chrono::Weekday;

use crate::rule::{self, Frequency, RecurrenceRule, WeekdaySpec};

/// Describe a parsed rule, e.g. `"Weekly on Tuesday and Thursday"`.
///
/// ```
/// use occurrence_engine::describe::describe;
/// use occurrence_engine::rule::parse;
///
/// let rule = parse("FREQ=MONTHLY;BYDAY=1FR;COUNT=6").unwrap();
/// assert_eq!(describe(&rule), "Monthly on the first Friday for 6 times");
/// ```
pub fn describe(rule: &RecurrenceRule) -> String {
    let mut parts = vec![cadence(rule.frequency, rule.interval)];

    if !rule.by_weekday.is_empty() {
        let days: Vec<String> = rule.by_weekday.iter().map(weekday_phrase).collect();
        let article = if rule.by_weekday.iter().any(|spec| spec.ordinal.is_some()) {
            "on the"
        } else {
            "on"
        };
        parts.push(format!("{article} {}", join_and(&days)));
    }
    if !rule.by_month_day.is_empty() {
        let days: Vec<String> = rule.by_month_day.iter().map(|&day| month_day_phrase(day)).collect();
        parts.push(format!("on the {}", join_and(&days)));
    }
    if !rule.by_month.is_empty() {
        let months: Vec<String> = rule.by_month.iter().map(|&m| month_name(m).to_string()).collect();
        parts.push(format!("in {}", join_and(&months)));
    }
    if let Some(until) = rule.until {
        parts.push(format!("until {}", until.format("%B %-d, %Y")));
    }
    match rule.count {
        Some(1) => parts.push("once".to_string()),
        Some(count) => parts.push(format!("for {count} times")),
        None => {}
    }

    parts.join(" ")
}

/// Describe raw rule text as stored on an event.
///
/// Empty text means the event does not repeat. Text that does not parse is
/// returned unchanged.
pub fn describe_str(rule: Option<&str>) -> String {
    let Some(text) = rule.filter(|text| !text.trim().is_empty()) else {
        return "Does not repeat".to_string();
    };
    match rule::parse(text) {
        Some(parsed) => describe(&parsed),
        None => text.to_string(),
    }
}

fn cadence(frequency: Frequency, interval: u32) -> String {
    let unit = match frequency {
        Frequency::Daily => "day",
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
        Frequency::Yearly => "year",
    };
    match (frequency, interval) {
        (Frequency::Daily, 1) => "Daily".to_string(),
        (Frequency::Weekly, 1) => "Weekly".to_string(),
        (Frequency::Monthly, 1) => "Monthly".to_string(),
        (Frequency::Yearly, 1) => "Yearly".to_string(),
        (_, 2) => format!("Every other {unit}"),
        (_, n) => format!("Every {n} {unit}s"),
    }
}

fn weekday_phrase(spec: &WeekdaySpec) -> String {
    let name = weekday_name(spec.weekday);
    match spec.ordinal {
        None => name.to_string(),
        Some(-1) => format!("last {name}"),
        Some(n) if n < 0 => format!("{} to last {name}", ordinal_word(n.unsigned_abs())),
        Some(n) => format!("{} {name}", ordinal_word(n.unsigned_abs())),
    }
}

fn month_day_phrase(day: i8) -> String {
    match day {
        -1 => "last day".to_string(),
        d if d < 0 => format!("{} to last day", ordinal_suffixed(d.unsigned_abs())),
        d => ordinal_suffixed(d.unsigned_abs()),
    }
}

fn ordinal_word(n: u8) -> String {
    match n {
        1 => "first".to_string(),
        2 => "second".to_string(),
        3 => "third".to_string(),
        4 => "fourth".to_string(),
        5 => "fifth".to_string(),
        n => ordinal_suffixed(n),
    }
}

fn ordinal_suffixed(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// `a`, `a and b`, `a, b and c`.
fn join_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(rule: &str) -> String {
        describe_str(Some(rule))
    }

    #[test]
    fn test_simple_cadences() {
        assert_eq!(text("FREQ=DAILY"), "Daily");
        assert_eq!(text("FREQ=DAILY;INTERVAL=3"), "Every 3 days");
        assert_eq!(text("FREQ=WEEKLY;INTERVAL=2"), "Every other week");
        assert_eq!(text("FREQ=MONTHLY"), "Monthly");
        assert_eq!(text("FREQ=YEARLY;INTERVAL=4"), "Every 4 years");
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(text("FREQ=WEEKLY;BYDAY=TU"), "Weekly on Tuesday");
        assert_eq!(text("FREQ=WEEKLY;BYDAY=TU,TH"), "Weekly on Tuesday and Thursday");
        assert_eq!(
            text("FREQ=WEEKLY;BYDAY=MO,WE,FR"),
            "Weekly on Monday, Wednesday and Friday"
        );
    }

    #[test]
    fn test_ordinal_weekdays() {
        assert_eq!(text("FREQ=MONTHLY;BYDAY=1FR"), "Monthly on the first Friday");
        assert_eq!(text("FREQ=MONTHLY;BYDAY=-1SU"), "Monthly on the last Sunday");
        assert_eq!(text("FREQ=MONTHLY;BYDAY=-2MO"), "Monthly on the second to last Monday");
        assert_eq!(
            text("FREQ=YEARLY;BYMONTH=11;BYDAY=4TH"),
            "Yearly on the fourth Thursday in November"
        );
    }

    #[test]
    fn test_month_days_and_months() {
        assert_eq!(text("FREQ=MONTHLY;BYMONTHDAY=15"), "Monthly on the 15th");
        assert_eq!(text("FREQ=MONTHLY;BYMONTHDAY=1,22"), "Monthly on the 1st and 22nd");
        assert_eq!(text("FREQ=MONTHLY;BYMONTHDAY=-1"), "Monthly on the last day");
        assert_eq!(text("FREQ=MONTHLY;BYMONTHDAY=-3"), "Monthly on the 3rd to last day");
        assert_eq!(text("FREQ=MONTHLY;BYMONTHDAY=11"), "Monthly on the 11th");
        assert_eq!(text("FREQ=YEARLY;BYMONTH=3,9"), "Yearly in March and September");
    }

    #[test]
    fn test_end_conditions() {
        assert_eq!(
            text("FREQ=WEEKLY;BYDAY=TU,TH;UNTIL=20251220T000000Z"),
            "Weekly on Tuesday and Thursday until December 20, 2025"
        );
        assert_eq!(
            text("FREQ=DAILY;UNTIL=2025-09-05"),
            "Daily until September 5, 2025"
        );
        assert_eq!(text("FREQ=DAILY;INTERVAL=2;COUNT=5"), "Every other day for 5 times");
        assert_eq!(text("FREQ=YEARLY;COUNT=1"), "Yearly once");
    }

    #[test]
    fn test_empty_and_unparseable() {
        assert_eq!(describe_str(None), "Does not repeat");
        assert_eq!(describe_str(Some("")), "Does not repeat");
        assert_eq!(describe_str(Some("INVALID=RULE")), "INVALID=RULE");
    }
}
