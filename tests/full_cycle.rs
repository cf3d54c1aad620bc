//! Full client-to-store cycle: autosave edits travel through the sync
//! contract into the API boundary and land merged in the document store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use timesheet_sync::{
    AutosaveConfig, AutosaveCoordinator, DayEntry, DayStatus, DaysMap, Period, SaveReceipt,
    SaveState, SyncClient, TimesheetApi, TimesheetData, TimesheetError, TimesheetStore,
};

/// In-process transport: drives the server-side handlers directly, the same
/// calls the HTTP layer would make.
#[derive(Clone)]
struct LocalClient {
    api: Arc<TimesheetApi>,
    user_id: u64,
}

impl SyncClient for LocalClient {
    fn fetch_month(
        &self,
        period: Period,
    ) -> impl Future<Output = Result<TimesheetData, TimesheetError>> + Send {
        let result = self
            .api
            .get_timesheet(self.user_id, period.year, period.month);
        async move { result }
    }

    fn save_month(
        &self,
        period: Period,
        days: &DaysMap,
    ) -> impl Future<Output = Result<SaveReceipt, TimesheetError>> + Send {
        let result = self.api.save_timesheet(
            self.user_id,
            period.year,
            period.month,
            &json!({ "days": days }),
        );
        async move { result }
    }
}

fn fast_config() -> AutosaveConfig {
    AutosaveConfig {
        debounce: Duration::from_millis(50),
        retry_delay: Duration::from_millis(20),
        max_attempts: 3,
    }
}

async fn wait_for_idle(handle: &timesheet_sync::AutosaveHandle) {
    let mut status = handle.subscribe();
    // The session starts Idle; wait for the queued edit to open a save cycle
    // before waiting for that cycle to settle back to Idle.
    for _ in 0..100 {
        if status.borrow().state != SaveState::Idle {
            break;
        }
        status.changed().await.unwrap();
    }
    for _ in 0..100 {
        if status.borrow().state == SaveState::Idle {
            return;
        }
        status.changed().await.unwrap();
    }
    panic!("session never returned to idle");
}

#[tokio::test]
async fn edits_flow_through_autosave_into_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let client = LocalClient {
        api: Arc::new(TimesheetApi::new(TimesheetStore::new(dir.path()))),
        user_id: 42,
    };
    let period = Period::new(2025, 12);

    let handle = AutosaveCoordinator::open(client.clone(), period, fast_config())
        .await
        .unwrap();

    handle.update_day(1, DayEntry::with_hours(8.0)).unwrap();
    handle
        .update_day(2, DayEntry::with_status(DayStatus::Vacation))
        .unwrap();
    wait_for_idle(&handle).await;

    let store = TimesheetStore::new(dir.path());
    let doc = store.read(42, period).unwrap().unwrap();
    assert_eq!(doc.days.len(), 2);
    assert_eq!(doc.days[&1], DayEntry::with_hours(8.0));
    assert_eq!(doc.days[&2], DayEntry::with_status(DayStatus::Vacation));
}

#[tokio::test]
async fn later_sessions_merge_instead_of_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let client = LocalClient {
        api: Arc::new(TimesheetApi::new(TimesheetStore::new(dir.path()))),
        user_id: 42,
    };
    let period = Period::new(2025, 11);

    // First session writes day 3
    let handle = AutosaveCoordinator::open(client.clone(), period, fast_config())
        .await
        .unwrap();
    handle.update_day(3, DayEntry::with_hours(7.5)).unwrap();
    wait_for_idle(&handle).await;
    drop(handle);

    // Second session loads the stored day and adds day 5
    let handle = AutosaveCoordinator::open(client.clone(), period, fast_config())
        .await
        .unwrap();
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.days[&3], DayEntry::with_hours(7.5));

    handle.update_day(5, DayEntry::with_hours(4.0)).unwrap();
    wait_for_idle(&handle).await;

    let store = TimesheetStore::new(dir.path());
    let doc = store.read(42, period).unwrap().unwrap();
    assert_eq!(doc.days.len(), 2);
    assert!(doc.days.contains_key(&3));
    assert!(doc.days.contains_key(&5));
}

#[tokio::test]
async fn created_at_survives_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let client = LocalClient {
        api: Arc::new(TimesheetApi::new(TimesheetStore::new(dir.path()))),
        user_id: 7,
    };
    let period = Period::new(2026, 1);

    let handle = AutosaveCoordinator::open(client.clone(), period, fast_config())
        .await
        .unwrap();
    handle.update_day(1, DayEntry::with_hours(8.0)).unwrap();
    wait_for_idle(&handle).await;
    drop(handle);

    let store = TimesheetStore::new(dir.path());
    let first = store.read(7, period).unwrap().unwrap();

    let handle = AutosaveCoordinator::open(client.clone(), period, fast_config())
        .await
        .unwrap();
    handle.update_day(2, DayEntry::with_hours(6.0)).unwrap();
    wait_for_idle(&handle).await;

    let second = store.read(7, period).unwrap().unwrap();
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);
}
