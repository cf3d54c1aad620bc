pub mod autosave;
pub mod holidays;
pub mod sync_client;

pub use autosave::{AutosaveConfig, AutosaveCoordinator, AutosaveHandle, SaveState, SessionSnapshot};
pub use holidays::HolidayCalendar;
pub use sync_client::{HttpSyncClient, SyncClient};
