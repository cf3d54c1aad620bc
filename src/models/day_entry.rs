use serde::{Deserialize, Serialize};

use crate::error::TimesheetError;

/// Absence statuses a day can carry instead of worked hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Sick,
    BusinessTrip,
    Vacation,
    UnpaidVacation,
}

impl DayStatus {
    pub const ALL: [DayStatus; 4] = [
        DayStatus::Sick,
        DayStatus::BusinessTrip,
        DayStatus::Vacation,
        DayStatus::UnpaidVacation,
    ];

    /// Wire representation, matches the serde encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Sick => "sick",
            DayStatus::BusinessTrip => "business_trip",
            DayStatus::Vacation => "vacation",
            DayStatus::UnpaidVacation => "unpaid_vacation",
        }
    }

    pub fn parse(s: &str) -> Option<DayStatus> {
        DayStatus::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// One calendar day of a timesheet: worked hours or an absence status,
/// never both
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DayEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DayStatus>,
}

impl DayEntry {
    pub fn with_hours(hours: f64) -> Self {
        Self {
            hours: Some(hours),
            status: None,
        }
    }

    pub fn with_status(status: DayStatus) -> Self {
        Self {
            hours: None,
            status: Some(status),
        }
    }

    /// An entry with neither field set; valid in a stored document but
    /// rejected in write payloads.
    pub fn is_empty(&self) -> bool {
        self.hours.is_none() && self.status.is_none()
    }

    /// Validates the entry as a write payload value.
    pub fn validate(&self) -> Result<(), TimesheetError> {
        if self.hours.is_some() && self.status.is_some() {
            return Err(TimesheetError::Validation(
                "hours and status cannot both be set".to_string(),
            ));
        }

        if self.is_empty() {
            return Err(TimesheetError::Validation(
                "either hours or status must be set".to_string(),
            ));
        }

        if let Some(hours) = self.hours {
            if !crate::validation::validate_hours(hours) {
                return Err(TimesheetError::Validation(format!(
                    "invalid hours value: {}",
                    hours
                )));
            }
        }

        Ok(())
    }
}
