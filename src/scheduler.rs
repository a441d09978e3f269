//! Scheduler coordinator - owns the periodic synchronization timer.
//!
//! At most one periodic timer and one daily auxiliary task are alive per
//! coordinator. Runs triggered by the timer and by [`SchedulerCoordinator::start`]
//! share a run lock, so two runs never write to the store at the same time.
//! Runs are spawned as detached tasks: stopping the coordinator cancels future
//! ticks but lets an in-flight run commit.
//!
//! `running` in [`SchedulerStatus`] is process-local state. The last-run
//! fields come from the persisted ledger, falling back to the last run
//! observed by this process.

use crate::{
    core::{scheduler_run, sync},
    entities::SchedulerRunModel,
    errors::{Error, Result},
    gateway::VendorGateway,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, OwnedMutexGuard, RwLock, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, instrument, warn};

/// Period of the auxiliary field-operations refresh.
const DAILY_REFRESH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Snapshot returned by [`SchedulerCoordinator::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerStatus {
    /// Whether the periodic timer is alive in this process
    pub running: bool,
    /// Current timer period
    pub interval_seconds: u64,
    /// Commit time of the most recent run
    pub last_run: Option<DateTime<Utc>>,
    /// Machines upserted by the most recent run
    pub machines_synced: i32,
    /// Fields upserted by the most recent run
    pub fields_synced: i32,
}

struct Timers {
    periodic: JoinHandle<()>,
    daily: JoinHandle<()>,
    interval_tx: watch::Sender<u64>,
}

impl Timers {
    fn abort(self) {
        self.periodic.abort();
        self.daily.abort();
    }
}

struct State {
    gateway: Option<Arc<dyn VendorGateway>>,
    interval_seconds: u64,
    timers: Option<Timers>,
}

/// Everything a spawned run needs, cheap to clone into tasks.
#[derive(Clone)]
struct SyncRunner {
    db: DatabaseConnection,
    gateway: Arc<dyn VendorGateway>,
    run_lock: Arc<Mutex<()>>,
    last_observed: Arc<RwLock<Option<SchedulerRunModel>>>,
}

impl SyncRunner {
    /// Spawns a run that waits for the run lock.
    fn spawn_run(&self) {
        let runner = self.clone();
        tokio::spawn(async move {
            let guard = Arc::clone(&runner.run_lock).lock_owned().await;
            runner.run(guard).await;
        });
    }

    /// Spawns a run unless one is already in progress.
    fn try_spawn_run(&self) -> bool {
        let Ok(guard) = Arc::clone(&self.run_lock).try_lock_owned() else {
            return false;
        };
        let runner = self.clone();
        tokio::spawn(async move { runner.run(guard).await });
        true
    }

    async fn run(&self, _guard: OwnedMutexGuard<()>) {
        match sync::run_once(&self.db, self.gateway.as_ref()).await {
            Ok(run) => {
                *self.last_observed.write().await = Some(run);
            }
            Err(e) => error!(error = %e, "Synchronization run failed"),
        }
    }
}

/// Coordinates the periodic synchronization of the local store.
///
/// Construct one per process and share it behind an [`Arc`].
pub struct SchedulerCoordinator {
    db: DatabaseConnection,
    state: Mutex<State>,
    run_lock: Arc<Mutex<()>>,
    last_observed: Arc<RwLock<Option<SchedulerRunModel>>>,
}

impl SchedulerCoordinator {
    /// Creates a stopped coordinator with no sync dependencies.
    #[must_use]
    pub fn new(db: DatabaseConnection, interval_seconds: u64) -> Self {
        Self {
            db,
            state: Mutex::new(State {
                gateway: None,
                interval_seconds,
                timers: None,
            }),
            run_lock: Arc::new(Mutex::new(())),
            last_observed: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets the vendor gateway used by subsequent runs.
    pub async fn configure(&self, gateway: Arc<dyn VendorGateway>) {
        self.state.lock().await.gateway = Some(gateway);
    }

    /// Starts the periodic timer and the daily task, then triggers one run.
    ///
    /// Returns `false` without doing anything when already running.
    ///
    /// # Errors
    ///
    /// [`Error::SchedulerMisconfigured`] when no gateway was configured, and a
    /// validation error when the interval is zero.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.timers.is_some() {
            debug!("Scheduler already running");
            return Ok(false);
        }
        let gateway = state.gateway.clone().ok_or(Error::SchedulerMisconfigured)?;
        if state.interval_seconds == 0 {
            return Err(Error::validation("Scheduler interval must be positive"));
        }

        let runner = SyncRunner {
            db: self.db.clone(),
            gateway: Arc::clone(&gateway),
            run_lock: Arc::clone(&self.run_lock),
            last_observed: Arc::clone(&self.last_observed),
        };
        let (interval_tx, interval_rx) = watch::channel(state.interval_seconds);
        let periodic = tokio::spawn(periodic_loop(runner.clone(), interval_rx));
        let daily = tokio::spawn(daily_refresh_loop(gateway));
        state.timers = Some(Timers {
            periodic,
            daily,
            interval_tx,
        });
        info!(interval_seconds = state.interval_seconds, "Scheduler started");
        drop(state);

        runner.spawn_run();
        Ok(true)
    }

    /// Cancels the timer and the daily task. In-flight runs keep going.
    ///
    /// Returns `false` when the coordinator was not running.
    pub async fn stop(&self) -> bool {
        let timers = self.state.lock().await.timers.take();
        match timers {
            Some(timers) => {
                timers.abort();
                info!("Scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Changes the timer period. A live timer is rescheduled in place.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a zero interval.
    pub async fn update_interval(&self, interval_seconds: u64) -> Result<()> {
        if interval_seconds == 0 {
            return Err(Error::validation("Scheduler interval must be positive"));
        }
        let mut state = self.state.lock().await;
        state.interval_seconds = interval_seconds;
        if let Some(timers) = &state.timers
            && timers.interval_tx.send(interval_seconds).is_err()
        {
            warn!("Periodic timer is gone, interval applies on next start");
        }
        info!(interval_seconds, "Scheduler interval updated");
        Ok(())
    }

    /// Whether the periodic timer is alive.
    pub async fn is_running(&self) -> bool {
        self.state.lock().await.timers.is_some()
    }

    /// Current running flag, interval and last run summary.
    pub async fn status(&self) -> Result<SchedulerStatus> {
        let (running, interval_seconds) = {
            let state = self.state.lock().await;
            (state.timers.is_some(), state.interval_seconds)
        };

        let last = match scheduler_run::latest_run(&self.db).await? {
            Some(run) => Some(run),
            None => self.last_observed.read().await.clone(),
        };

        Ok(SchedulerStatus {
            running,
            interval_seconds,
            last_run: last.as_ref().map(|run| run.last_run),
            machines_synced: last.as_ref().map_or(0, |run| run.machines_synced),
            fields_synced: last.as_ref().map_or(0, |run| run.fields_synced),
        })
    }
}

impl Drop for SchedulerCoordinator {
    fn drop(&mut self) {
        if let Some(timers) = self.state.get_mut().timers.take() {
            timers.abort();
        }
    }
}

/// Ticks every `interval` seconds, rebuilding the ticker when the interval changes.
async fn periodic_loop(runner: SyncRunner, mut interval_rx: watch::Receiver<u64>) {
    loop {
        let period = Duration::from_secs(*interval_rx.borrow_and_update());
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !runner.try_spawn_run() {
                        debug!("Previous run still in progress, skipping tick");
                    }
                }
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    debug!("Rescheduling periodic timer");
                    break;
                }
            }
        }
    }
}

/// Refreshes the field-operations listing once a day. Failures are logged only.
async fn daily_refresh_loop(gateway: Arc<dyn VendorGateway>) {
    let mut ticker = time::interval_at(Instant::now() + DAILY_REFRESH_PERIOD, DAILY_REFRESH_PERIOD);
    loop {
        ticker.tick().await;
        match gateway.list_field_operations().await {
            Ok(operations) => {
                info!(count = operations.values.len(), "Daily field operations refresh");
            }
            Err(e) => warn!(error = %e, "Daily field operations refresh failed"),
        }
    }
}
