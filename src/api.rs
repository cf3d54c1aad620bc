//! Server-side request boundary.
//!
//! The HTTP layer in front of this crate is an external collaborator: it
//! resolves the authenticated user id, routes the two timesheet endpoints and
//! writes the serialized envelope back. Everything behind that lives here:
//! parameter validation, payload validation, the merge-on-write store round
//! trip and the response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TimesheetError;
use crate::models::{DaysMap, Period};
use crate::storage::TimesheetStore;
use crate::validation;

/// The `{success, data | error}` envelope both endpoints speak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Read-endpoint payload. An absent document reads as null timestamps and an
/// empty day map, so the client never distinguishes "new month" from "empty
/// month".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetData {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub days: DaysMap,
}

impl TimesheetData {
    pub fn absent() -> Self {
        Self {
            created_at: None,
            updated_at: None,
            days: DaysMap::new(),
        }
    }
}

/// Write-endpoint payload: the post-write timestamps, never the day map.
/// Callers rely on their own in-memory state for the days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Endpoint handlers over a document store.
pub struct TimesheetApi {
    store: TimesheetStore,
}

impl TimesheetApi {
    pub fn new(store: TimesheetStore) -> Self {
        Self { store }
    }

    /// GET handler: the stored month, or the absent shape.
    pub fn get_timesheet(
        &self,
        user_id: u64,
        year: i32,
        month: u32,
    ) -> Result<TimesheetData, TimesheetError> {
        let period = Period::new(year, month);
        period.validate()?;

        let data = match self.store.read(user_id, period)? {
            Some(doc) => TimesheetData {
                created_at: Some(doc.created_at),
                updated_at: Some(doc.updated_at),
                days: doc.days,
            },
            None => TimesheetData::absent(),
        };

        log::info!("get_timesheet user={} period={}", user_id, period);

        Ok(data)
    }

    /// POST handler: validates the raw `{days: {...}}` body, merges it into
    /// the stored document and returns the post-write timestamps.
    pub fn save_timesheet(
        &self,
        user_id: u64,
        year: i32,
        month: u32,
        body: &Value,
    ) -> Result<SaveReceipt, TimesheetError> {
        let period = Period::new(year, month);
        period.validate()?;

        let raw_days = body
            .get("days")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                TimesheetError::Validation("request body must contain a days object".to_string())
            })?;

        let errors = validation::validate_days_data(raw_days);
        if !errors.is_empty() {
            return Err(TimesheetError::Validation(format!(
                "validation errors: {}",
                errors.join(", ")
            )));
        }

        let days: DaysMap = serde_json::from_value(Value::Object(raw_days.clone()))
            .map_err(|e| TimesheetError::Validation(format!("malformed days payload: {}", e)))?;

        let doc = self.store.write(user_id, period, &days)?;

        log::info!(
            "save_timesheet user={} period={} days={}",
            user_id,
            period,
            days.len()
        );

        Ok(SaveReceipt {
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

/// Folds a handler result into the HTTP status and envelope the transport
/// layer writes out.
pub fn into_reply<T>(result: Result<T, TimesheetError>) -> (u16, ApiResponse<T>) {
    match result {
        Ok(data) => (200, ApiResponse::ok(data)),
        Err(e) => {
            log::error!("api error: {}", e);
            (e.http_status(), ApiResponse::err(e.to_string()))
        }
    }
}
