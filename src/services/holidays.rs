use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::TimesheetError;
use crate::validation;

/// Read-only holiday calendar, keyed by year.
///
/// Consumed by the UI for display; persistence never depends on it. The
/// backing file is deployment configuration, so unlike user documents a
/// corrupt file here is a hard error.
pub struct HolidayCalendar {
    by_year: HashMap<i32, Vec<NaiveDate>>,
}

impl HolidayCalendar {
    /// Loads a JSON file of the form `{ "2025": ["2025-01-01", ...] }`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimesheetError> {
        let content = std::fs::read_to_string(path.as_ref())?;

        let raw: HashMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| TimesheetError::Other(format!("holiday file parse failed: {}", e)))?;

        let mut by_year = HashMap::new();
        for (year, dates) in raw {
            let year: i32 = year.parse().map_err(|_| {
                TimesheetError::Other(format!("holiday file has a non-numeric year: {}", year))
            })?;

            let mut parsed = Vec::with_capacity(dates.len());
            for date in dates {
                let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                    TimesheetError::Other(format!("invalid holiday date {}: {}", date, e))
                })?;
                parsed.push(date);
            }
            parsed.sort();

            by_year.insert(year, parsed);
        }

        Ok(Self { by_year })
    }

    /// Holidays for one year; empty for a year the file does not list.
    pub fn holidays_for_year(&self, year: i32) -> Result<&[NaiveDate], TimesheetError> {
        if !validation::validate_year(year) {
            return Err(TimesheetError::Validation(format!(
                "invalid year {} (must be {}-{})",
                year,
                validation::MIN_YEAR,
                validation::MAX_YEAR
            )));
        }

        Ok(self
            .by_year
            .get(&year)
            .map(|dates| dates.as_slice())
            .unwrap_or(&[]))
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;

        self.by_year
            .get(&date.year())
            .map(|dates| dates.binary_search(&date).is_ok())
            .unwrap_or(false)
    }
}
