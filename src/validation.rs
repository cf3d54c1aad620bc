//! Pure validators for timesheet input.
//!
//! These run on the server side before a write is merged, and on the client
//! side before a request is attempted. They collect errors into lists instead
//! of failing on the first bad entry, so one invalid day never hides another.

use serde_json::Value;

use crate::models::{DayEntry, DayStatus};

pub const MIN_YEAR: i32 = 2025;
pub const MAX_YEAR: i32 = 2035;
pub const MIN_HOURS: f64 = 0.0;
pub const MAX_HOURS: f64 = 24.0;
pub const HOURS_STEP: f64 = 0.5;

/// Tolerance for the half-hour step check, guards binary float error.
const STEP_EPSILON: f64 = 1e-4;

/// Valid iff the year falls in the supported range.
pub fn validate_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// Valid iff the month is a calendar month.
pub fn validate_month(month: u32) -> bool {
    (1..=12).contains(&month)
}

/// Valid iff hours are finite, within [0, 24] and a multiple of 0.5.
pub fn validate_hours(hours: f64) -> bool {
    if !hours.is_finite() {
        return false;
    }

    if !(MIN_HOURS..=MAX_HOURS).contains(&hours) {
        return false;
    }

    let steps = hours / HOURS_STEP;
    (steps - steps.round()).abs() < STEP_EPSILON
}

/// Valid iff absent or one of the known absence statuses.
pub fn validate_status(status: Option<&str>) -> bool {
    match status {
        None => true,
        Some(s) => DayStatus::parse(s).is_some(),
    }
}

/// Valid iff exactly one of hours/status is set and that one passes its
/// own validator.
pub fn validate_day_entry(entry: &DayEntry) -> bool {
    let has_hours = entry.hours.is_some();
    let has_status = entry.status.is_some();

    if has_hours && has_status {
        return false;
    }

    if !has_hours && !has_status {
        return false;
    }

    if let Some(hours) = entry.hours {
        return validate_hours(hours);
    }

    // Status is typed; presence alone is enough here.
    true
}

/// Validates a raw `days` write payload as received on the wire.
///
/// Returns one human-readable error per invalid entry, in the payload's own
/// key order. An empty vec means every entry passed.
pub fn validate_days_data(days: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();

    for (key, value) in days {
        let day: Option<u8> = key.parse().ok();
        let day = match day {
            Some(d) if (1..=31).contains(&d) => d,
            _ => {
                errors.push(format!("invalid day number: {}", key));
                continue;
            }
        };

        let entry = match value.as_object() {
            Some(obj) => obj,
            None => {
                errors.push(format!("day {}: entry must be an object", day));
                continue;
            }
        };

        if let Some(err) = validate_raw_entry(day, entry) {
            errors.push(err);
        }
    }

    errors
}

/// Checks one raw entry object; `None` means the entry is valid.
fn validate_raw_entry(day: u8, entry: &serde_json::Map<String, Value>) -> Option<String> {
    let hours = entry.get("hours").filter(|v| !v.is_null());
    let status = entry.get("status").filter(|v| !v.is_null());

    if hours.is_some() && status.is_some() {
        return Some(format!(
            "day {}: hours and status cannot both be set",
            day
        ));
    }

    if hours.is_none() && status.is_none() {
        return Some(format!(
            "day {}: either hours or status must be set",
            day
        ));
    }

    if let Some(hours) = hours {
        match hours.as_f64() {
            Some(h) if validate_hours(h) => {}
            _ => {
                return Some(format!(
                    "day {}: hours must be a multiple of {} between {} and {}",
                    day, HOURS_STEP, MIN_HOURS, MAX_HOURS
                ))
            }
        }
    }

    if let Some(status) = status {
        match status.as_str() {
            Some(s) if validate_status(Some(s)) => {}
            _ => return Some(format!("day {}: unknown status value", day)),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_validate_year_bounds() {
        assert!(!validate_year(2024));
        assert!(validate_year(2025));
        assert!(validate_year(2035));
        assert!(!validate_year(2036));
    }

    #[test]
    fn test_validate_month_bounds() {
        assert!(!validate_month(0));
        assert!(validate_month(1));
        assert!(validate_month(12));
        assert!(!validate_month(13));
    }

    #[test]
    fn test_validate_hours_step_and_range() {
        assert!(validate_hours(0.0));
        assert!(validate_hours(0.5));
        assert!(validate_hours(7.5));
        assert!(validate_hours(24.0));
        assert!(!validate_hours(-0.5));
        assert!(!validate_hours(24.5));
        assert!(!validate_hours(7.25));
        assert!(!validate_hours(f64::NAN));
        // Accumulated float error stays inside the tolerance
        assert!(validate_hours(0.5 + 0.5 + 0.5));
    }

    #[test]
    fn test_validate_status_values() {
        assert!(validate_status(None));
        assert!(validate_status(Some("sick")));
        assert!(validate_status(Some("business_trip")));
        assert!(validate_status(Some("vacation")));
        assert!(validate_status(Some("unpaid_vacation")));
        assert!(!validate_status(Some("holiday")));
        assert!(!validate_status(Some("")));
    }

    #[test]
    fn test_validate_day_entry_mutual_exclusivity() {
        assert!(validate_day_entry(&DayEntry::with_hours(8.0)));
        assert!(validate_day_entry(&DayEntry::with_status(DayStatus::Sick)));
        assert!(!validate_day_entry(&DayEntry {
            hours: Some(8.0),
            status: Some(DayStatus::Sick),
        }));
        assert!(!validate_day_entry(&DayEntry::default()));
        assert!(!validate_day_entry(&DayEntry::with_hours(8.3)));
    }

    #[test]
    fn test_validate_days_data_all_valid() {
        let days = raw(json!({
            "1": {"hours": 8.0},
            "2": {"status": "vacation"},
            "31": {"hours": 0.5, "status": null},
        }));
        assert!(validate_days_data(&days).is_empty());
    }

    #[test]
    fn test_validate_days_data_collects_every_error() {
        let days = raw(json!({
            "0": {"hours": 8.0},
            "abc": {"hours": 8.0},
            "2": "not an object",
            "3": {"hours": 8.0, "status": "sick"},
            "4": {"hours": "eight"},
            "5": {"status": "day_off"},
            "6": {"hours": 8.0},
        }));

        let errors = validate_days_data(&days);
        assert_eq!(errors.len(), 6);
        assert!(errors[0].contains("invalid day number: 0"));
        assert!(errors[1].contains("invalid day number: abc"));
        assert!(errors[2].contains("day 2"));
        assert!(errors[3].contains("day 3"));
        assert!(errors[4].contains("day 4"));
        assert!(errors[5].contains("day 5"));
    }

    #[test]
    fn test_validate_days_data_empty_entry_rejected() {
        let days = raw(json!({"7": {}}));
        let errors = validate_days_data(&days);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("day 7"));
    }
}
