use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimesheetError;
use crate::models::DayEntry;

/// Day-number (1..=31) to entry mapping; serializes as a JSON object with
/// stringified keys
pub type DaysMap = BTreeMap<u8, DayEntry>;

/// One (year, month) pair identifying a timesheet document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Checks the year and month ranges before any storage or network use.
    pub fn validate(&self) -> Result<(), TimesheetError> {
        if !crate::validation::validate_year(self.year) {
            return Err(TimesheetError::Validation(format!(
                "invalid year {} (must be {}-{})",
                self.year,
                crate::validation::MIN_YEAR,
                crate::validation::MAX_YEAR
            )));
        }

        if !crate::validation::validate_month(self.month) {
            return Err(TimesheetError::Validation(format!(
                "invalid month {} (must be 1-12)",
                self.month
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// The stored month document: metadata plus the per-day entries.
///
/// `created_at` is set on the first successful write for the period and
/// preserved afterwards; `updated_at` moves on every successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetDocument {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub days: DaysMap,
}

impl TimesheetDocument {
    /// Fresh document for a first write.
    pub fn new(days: DaysMap, now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            days,
        }
    }

    /// Folds a partial day map into this document.
    ///
    /// Keys present in `partial` overwrite; all other existing keys are
    /// untouched. `created_at` is preserved.
    pub fn merge(&mut self, partial: &DaysMap, now: DateTime<Utc>) {
        for (day, entry) in partial {
            self.days.insert(*day, entry.clone());
        }
        self.updated_at = now;
    }
}
