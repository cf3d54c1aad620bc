//! Client-side autosave core.
//!
//! Calendar edits arrive in rapid bursts; sending one write per edit would be
//! wasteful and could race. A session applies every edit to its in-memory day
//! map immediately, coalesces the burst behind a debounce window, and keeps at
//! most one save in flight. Edits made while a save is running are queued for
//! the next cycle, so writes reach the server in the order the user made them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::error::TimesheetError;
use crate::models::{DayEntry, DaysMap, Period};
use crate::services::sync_client::SyncClient;

/// Timing and retry tuning for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Delay after the last edit before a save is attempted.
    pub debounce: Duration,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
    /// Total save attempts per cycle before giving up.
    pub max_attempts: u32,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            retry_delay: Duration::from_millis(1000),
            max_attempts: 3,
        }
    }
}

/// Save-cycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing pending, nothing in flight.
    Idle,
    /// An edit occurred; the debounce window is open.
    PendingDebounce,
    /// A save request is in flight.
    Saving,
    /// A save attempt failed; the given attempt number is waiting to retry.
    Retrying(u32),
    /// All attempts failed. Recoverable: the next edit re-arms the cycle.
    Failed,
}

/// Point-in-time view of a session, published on every change.
///
/// `days` is the authoritative working copy: it may be ahead of the stored
/// document while a save is pending, and it survives failed saves unchanged.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub period: Period,
    pub days: DaysMap,
    pub state: SaveState,
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

enum Command {
    UpdateDay(u8, DayEntry),
    UpdateDays(DaysMap),
}

/// Handle to a running session.
///
/// Dropping the handle closes the session; an in-flight save still runs to
/// completion. Changing the active period means opening a new session; the
/// old one finishes independently.
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SessionSnapshot>,
}

impl AutosaveHandle {
    /// Records one day edit. Applied to the in-memory map immediately;
    /// the remote write follows after the debounce window closes.
    pub fn update_day(&self, day: u8, entry: DayEntry) -> Result<(), TimesheetError> {
        self.send(Command::UpdateDay(day, entry))
    }

    /// Records a batch of day edits as a single burst.
    pub fn update_days(&self, days: DaysMap) -> Result<(), TimesheetError> {
        self.send(Command::UpdateDays(days))
    }

    fn send(&self, cmd: Command) -> Result<(), TimesheetError> {
        self.tx
            .send(cmd)
            .map_err(|_| TimesheetError::Other("autosave session closed".to_string()))
    }

    /// Current session view.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.status.borrow().clone()
    }

    /// Watch-channel receiver for UI indicators.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.status.clone()
    }
}

/// The per-session state machine task.
pub struct AutosaveCoordinator<C> {
    client: C,
    core: SessionCore,
}

impl<C> AutosaveCoordinator<C>
where
    C: SyncClient + Send + Sync + 'static,
{
    /// Loads the month and starts a session for it.
    ///
    /// The initial fetch is an explicit read, not part of the autosave
    /// cycle: a failure here surfaces to the caller and no session starts.
    pub async fn open(
        client: C,
        period: Period,
        config: AutosaveConfig,
    ) -> Result<AutosaveHandle, TimesheetError> {
        period.validate()?;

        let initial = client.fetch_month(period).await?;

        let mut core = SessionCore::new(period, config, initial.days, initial.updated_at);
        let (status_tx, status_rx) = watch::channel(core.snapshot());
        core.status_tx = Some(status_tx);
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(AutosaveCoordinator { client, core }.run(rx));

        Ok(AutosaveHandle {
            tx,
            status: status_rx,
        })
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        loop {
            match self.core.state {
                SaveState::PendingDebounce => {
                    tokio::select! {
                        cmd = rx.recv() => match cmd {
                            Some(cmd) => self.core.apply_edit(cmd),
                            None => break,
                        },
                        _ = tokio::time::sleep_until(self.core.deadline) => {
                            self.save_cycle(&mut rx).await;
                        }
                    }
                }
                // Idle or Failed: nothing to do until the next edit
                _ => match rx.recv().await {
                    Some(cmd) => self.core.apply_edit(cmd),
                    None => break,
                },
            }
        }

        if !self.core.pending.is_empty() {
            log::warn!(
                "autosave session for {} closed with {} unsaved day(s)",
                self.core.period,
                self.core.pending.len()
            );
        }
    }

    /// One full save cycle: send the accumulated burst, retrying transient
    /// failures up to the attempt budget. Exactly one request is in flight
    /// at any point; edits arriving meanwhile are applied to memory and
    /// queued for the next cycle.
    async fn save_cycle(&mut self, rx: &mut mpsc::UnboundedReceiver<Command>) {
        let payload = std::mem::take(&mut self.core.pending);
        let mut attempt: u32 = 1;
        self.core.set_state(SaveState::Saving);

        loop {
            let result = {
                let fut = self.client.save_month(self.core.period, &payload);
                tokio::pin!(fut);
                loop {
                    tokio::select! {
                        result = &mut fut => break result,
                        cmd = rx.recv() => match cmd {
                            Some(cmd) => self.core.apply_inflight_edit(cmd),
                            // Channel closed: drive the in-flight save home
                            None => break fut.await,
                        },
                    }
                }
            };

            match result {
                Ok(receipt) => {
                    log::debug!(
                        "autosave for {} landed ({} day(s))",
                        self.core.period,
                        payload.len()
                    );
                    self.core.last_saved = Some(receipt.updated_at);
                    self.core.last_error = None;
                    if self.core.pending.is_empty() {
                        self.core.set_state(SaveState::Idle);
                    } else {
                        // Edits queued during the flight: fresh debounce cycle
                        self.core.rearm_debounce();
                    }
                    return;
                }
                Err(e) if e.is_retryable() && attempt < self.core.config.max_attempts => {
                    log::warn!(
                        "autosave attempt {}/{} for {} failed: {}",
                        attempt,
                        self.core.config.max_attempts,
                        self.core.period,
                        e
                    );
                    self.core.set_state(SaveState::Retrying(attempt));
                    self.wait_retry_delay(rx).await;
                    attempt += 1;
                    self.core.set_state(SaveState::Saving);
                }
                Err(e) => {
                    log::error!(
                        "autosave for {} gave up after {} attempt(s): {}",
                        self.core.period,
                        attempt,
                        e
                    );
                    // Keep the unsent days pending so the next cycle carries
                    // them; edits made during the flight win over the payload.
                    for (day, entry) in &payload {
                        self.core
                            .pending
                            .entry(*day)
                            .or_insert_with(|| entry.clone());
                    }
                    self.core.last_error = Some(e.to_string());
                    self.core.set_state(SaveState::Failed);
                    return;
                }
            }
        }
    }

    async fn wait_retry_delay(&mut self, rx: &mut mpsc::UnboundedReceiver<Command>) {
        let sleep = tokio::time::sleep(self.core.config.retry_delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return,
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.core.apply_inflight_edit(cmd),
                    None => {
                        sleep.await;
                        return;
                    }
                },
            }
        }
    }
}

/// Mutable session state, split from the client so an in-flight request and
/// edit application can coexist.
struct SessionCore {
    period: Period,
    config: AutosaveConfig,
    days: DaysMap,
    /// Changed keys since the last successful save.
    pending: DaysMap,
    state: SaveState,
    deadline: Instant,
    last_saved: Option<DateTime<Utc>>,
    last_error: Option<String>,
    status_tx: Option<watch::Sender<SessionSnapshot>>,
}

impl SessionCore {
    fn new(
        period: Period,
        config: AutosaveConfig,
        days: DaysMap,
        last_saved: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            period,
            config,
            days,
            pending: DaysMap::new(),
            state: SaveState::Idle,
            deadline: Instant::now(),
            last_saved,
            last_error: None,
            status_tx: None,
        }
    }

    /// Optimistic apply plus a (re)started debounce window.
    fn apply_edit(&mut self, cmd: Command) {
        self.record(cmd);
        self.rearm_debounce();
    }

    /// Apply during `Saving`/`Retrying`: memory updates instantly, but the
    /// in-flight attempt is left alone and no new window opens yet.
    fn apply_inflight_edit(&mut self, cmd: Command) {
        self.record(cmd);
        self.publish();
    }

    fn record(&mut self, cmd: Command) {
        match cmd {
            Command::UpdateDay(day, entry) => {
                self.days.insert(day, entry.clone());
                self.pending.insert(day, entry);
            }
            Command::UpdateDays(days) => {
                for (day, entry) in days {
                    self.days.insert(day, entry.clone());
                    self.pending.insert(day, entry);
                }
            }
        }
    }

    fn rearm_debounce(&mut self) {
        self.deadline = Instant::now() + self.config.debounce;
        self.set_state(SaveState::PendingDebounce);
    }

    fn set_state(&mut self, state: SaveState) {
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        if let Some(tx) = &self.status_tx {
            let _ = tx.send(self.snapshot());
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            period: self.period,
            days: self.days.clone(),
            state: self.state,
            last_saved: self.last_saved,
            last_error: self.last_error.clone(),
        }
    }
}
