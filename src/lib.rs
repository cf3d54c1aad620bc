//! # Timesheet Sync
//!
//! Record synchronization core for a per-user monthly attendance sheet: each
//! calendar day carries either a worked-hours value or an absence status,
//! never both.
//!
//! The crate covers both sides of the sync path:
//! - server side: per-(user, year, month) JSON document storage with
//!   merge-on-write semantics, input validation, and the request/response
//!   envelope the HTTP layer speaks;
//! - client side: a transport-agnostic [`SyncClient`] contract, its HTTP
//!   implementation, and the [`AutosaveCoordinator`] that coalesces edit
//!   bursts behind a debounce window and retries transient failures.
//!
//! HTTP routing, user identity resolution and UI rendering are external
//! collaborators; this crate exposes the seams they plug into.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use timesheet_sync::{AutosaveConfig, AutosaveCoordinator, HttpSyncClient, Period};
//!
//! let client = HttpSyncClient::new(&config.sync)?;
//! let handle = AutosaveCoordinator::open(
//!     client,
//!     Period::new(2025, 12),
//!     config.autosave.to_autosave_config(),
//! )
//! .await?;
//!
//! handle.update_day(1, DayEntry::with_hours(8.0))?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

pub use api::{ApiResponse, SaveReceipt, TimesheetApi, TimesheetData};
pub use config::AppConfig;
pub use error::TimesheetError;
pub use models::{DayEntry, DayStatus, DaysMap, Period, TimesheetDocument};
pub use services::{
    AutosaveConfig, AutosaveCoordinator, AutosaveHandle, HolidayCalendar, HttpSyncClient,
    SaveState, SessionSnapshot, SyncClient,
};
pub use storage::TimesheetStore;
