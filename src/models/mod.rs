pub mod day_entry;
pub mod document;

pub use day_entry::{DayEntry, DayStatus};
pub use document::{DaysMap, Period, TimesheetDocument};
