//! Run Supervisor — the synchronization state machine
//!
//! Single authority over whether a sync run is in progress, over the
//! per-run timeout, and over the periodic trigger. All control
//! operations (trigger requests, timer fires, settings changes) are
//! serialized through one mailbox processed by a single actor loop;
//! only the worker body runs in parallel with it, and the worker talks
//! back through exactly one completion message.
//!
//! # State machine
//!
//! ```text
//!          requestRun (backend resolved)
//!   Idle ────────────────────────────────▶ Running
//!     ▲                                      │
//!     │  onRunCompleted / onTimeout (forced) │
//!     └──────────────────────────────────────┘
//! ```
//!
//! `requestRun` while Running is a silent no-op. A run that fails or
//! panics still reaches the completion path, so Running can never
//! stick.
//!
//! # Timeout vs completion race
//!
//! Each run carries a fresh run id. The completion path cancels the
//! timeout as its first action; a timeout that fires anyway (already in
//! the mailbox) is filtered by id, and a timed-out run is disowned so
//! its late completion is filtered the same way. Net effect: at most
//! one state transition per run.

pub mod notify;
pub mod timer;
pub mod worker;

pub use notify::{ChangeNotifier, TracingNotifier};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shared::sync::{ResourceId, SyncSettings};
use shared::util::now_millis;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::synchronizers::{ParserSink, SynchronizerFactory};
use crate::utils::{AppError, AppResult};

use timer::TimerHandle;
use worker::SyncWorker;

/// Monotonic id of one run attempt
pub type RunId = u64;

/// How long shutdown waits for an in-flight run to close
const SHUTDOWN_DRAIN_SECS: u64 = 5;

/// Control messages processed by the supervisor loop
#[derive(Debug, Clone)]
pub enum Command {
    /// Run now (manual trigger)
    RequestRun,
    /// Cooperatively stop the in-flight run
    StopRun,
    /// Arm the periodic trigger (no-op unless auto sync is enabled)
    StartPeriodic,
    /// Disarm the periodic trigger
    StopPeriodic,
    /// Fired by the repeating trigger
    PeriodicTick,
    /// Fired when a run exceeds its budget
    RunTimeout(RunId),
    /// Reported by the worker when a run closes (normal or cancelled)
    RunCompleted(RunId, Vec<ResourceId>),
}

enum RunState {
    Idle,
    Running {
        run_id: RunId,
        cancel: CancellationToken,
    },
}

/// Supervisor status snapshot, published on every transition
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    /// Whether a run is in progress
    pub running: bool,
    /// Whether the periodic trigger is armed
    pub periodic_armed: bool,
    /// Runs launched since startup
    pub runs_started: u64,
    /// Unix millis of the last completed run
    pub last_completed_at: Option<i64>,
    /// Changed-resource count of the last completed run
    pub last_changed_count: Option<usize>,
}

/// Cheap-to-clone handle for submitting commands and reading status
#[derive(Clone)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SyncStatus>,
}

impl SupervisorHandle {
    fn send(&self, command: Command) -> AppResult<()> {
        self.tx
            .send(command)
            .map_err(|_| AppError::internal("sync supervisor is not running"))
    }

    /// Run now; silently ignored when a run is already in progress
    pub fn request_run(&self) -> AppResult<()> {
        self.send(Command::RequestRun)
    }

    /// Stop the in-flight run cooperatively; no-op when idle
    pub fn stop_run(&self) -> AppResult<()> {
        self.send(Command::StopRun)
    }

    /// Arm the periodic trigger
    pub fn start_periodic(&self) -> AppResult<()> {
        self.send(Command::StartPeriodic)
    }

    /// Disarm the periodic trigger
    pub fn stop_periodic(&self) -> AppResult<()> {
        self.send(Command::StopPeriodic)
    }

    /// Current status snapshot
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }
}

/// The supervisor actor
///
/// Created with [`Supervisor::new`]; `run()` is spawned as a background
/// task and owns all mutable scheduling state for the process lifetime.
pub struct Supervisor {
    rx: mpsc::UnboundedReceiver<Command>,
    tx: mpsc::UnboundedSender<Command>,
    settings: watch::Receiver<SyncSettings>,
    settings_live: bool,
    last_settings: SyncSettings,
    factory: Arc<dyn SynchronizerFactory>,
    sink: Arc<dyn ParserSink>,
    notifier: Arc<dyn ChangeNotifier>,
    shutdown: CancellationToken,

    run_state: RunState,
    next_run_id: RunId,
    periodic: Option<TimerHandle>,
    timeout: Option<TimerHandle>,

    status_tx: watch::Sender<SyncStatus>,
    runs_started: u64,
    last_completed_at: Option<i64>,
    last_changed_count: Option<usize>,
}

impl Supervisor {
    pub fn new(
        settings: watch::Receiver<SyncSettings>,
        factory: Arc<dyn SynchronizerFactory>,
        sink: Arc<dyn ParserSink>,
        notifier: Arc<dyn ChangeNotifier>,
        shutdown: CancellationToken,
    ) -> (Self, SupervisorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SyncStatus::default());
        let last_settings = settings.borrow().clone();

        let supervisor = Self {
            rx,
            tx: tx.clone(),
            settings,
            settings_live: true,
            last_settings,
            factory,
            sink,
            notifier,
            shutdown,
            run_state: RunState::Idle,
            next_run_id: 1,
            periodic: None,
            timeout: None,
            status_tx,
            runs_started: 0,
            last_completed_at: None,
            last_changed_count: None,
        };
        let handle = SupervisorHandle {
            tx,
            status: status_rx,
        };
        (supervisor, handle)
    }

    /// Control loop; runs until shutdown
    pub async fn run(mut self) {
        tracing::info!("Sync supervisor started");

        // arm at startup when auto sync is already enabled
        self.arm_periodic();
        self.publish_status();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,

                // once the store is dropped, changed() resolves Err on
                // every poll; the guard retires the arm so the loop
                // keeps serving commands without spinning
                changed = self.settings.changed(), if self.settings_live => {
                    if changed.is_err() {
                        tracing::warn!("Settings store dropped, keeping last known settings");
                        self.settings_live = false;
                        continue;
                    }
                    self.on_settings_changed();
                }

                command = self.rx.recv() => {
                    match command {
                        Some(command) => self.handle(command),
                        None => break,
                    }
                }
            }
        }

        self.close().await;
        tracing::info!("Sync supervisor stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::RequestRun | Command::PeriodicTick => self.request_run(),
            Command::StopRun => self.stop_run(),
            Command::StartPeriodic => {
                self.arm_periodic();
                self.publish_status();
            }
            Command::StopPeriodic => {
                self.disarm_periodic();
                self.publish_status();
            }
            Command::RunTimeout(run_id) => self.on_timeout(run_id),
            Command::RunCompleted(run_id, changed) => self.on_run_completed(run_id, changed),
        }
    }

    // ========================================================================
    // Run control
    // ========================================================================

    fn request_run(&mut self) {
        if let RunState::Running { run_id, .. } = &self.run_state {
            tracing::debug!(run_id, "Sync already running, ignoring trigger");
            return;
        }

        // a run supersedes any pending periodic wake-up
        self.disarm_periodic();

        let settings = self.settings.borrow().clone();
        let backend = match self.factory.create(&settings) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!(backend = %settings.backend, error = %e, "Cannot start sync run");
                self.arm_periodic();
                self.publish_status();
                return;
            }
        };

        let run_id = self.next_run_id;
        self.next_run_id += 1;
        let cancel = CancellationToken::new();

        self.run_state = RunState::Running {
            run_id,
            cancel: cancel.clone(),
        };
        self.runs_started += 1;

        let budget = Duration::from_secs(settings.sync_timeout_seconds.max(1));
        self.timeout = Some(timer::schedule_once(
            budget,
            self.tx.clone(),
            Command::RunTimeout(run_id),
        ));

        let worker = SyncWorker::new(run_id, backend, self.sink.clone(), cancel, self.tx.clone());
        tokio::spawn(worker.run());

        self.publish_status();
    }

    fn stop_run(&mut self) {
        // the timeout goes first so a forced stop cannot follow a user stop
        self.timeout = None;

        match &self.run_state {
            RunState::Running { run_id, cancel } => {
                tracing::info!(run_id, "Stopping sync run");
                cancel.cancel();
                // state flips when the worker reports completion
            }
            RunState::Idle => {
                tracing::debug!("Stop requested with no run in progress");
            }
        }
    }

    fn on_timeout(&mut self, run_id: RunId) {
        match &self.run_state {
            RunState::Running { run_id: current, .. } if *current == run_id => {}
            // stale timer of an already-closed run
            _ => return,
        }

        tracing::warn!(run_id, "Sync run exceeded its budget, forcing stop");
        self.timeout = None;
        if let RunState::Running { cancel, .. } = &self.run_state {
            cancel.cancel();
        }

        // timeout is fatal to this attempt: disown the run so its late
        // completion report is ignored, and recover immediately
        self.run_state = RunState::Idle;
        self.arm_periodic();
        self.publish_status();
    }

    fn on_run_completed(&mut self, run_id: RunId, changed: Vec<ResourceId>) {
        match &self.run_state {
            RunState::Running { run_id: current, .. } if *current == run_id => {}
            _ => {
                tracing::debug!(run_id, "Ignoring completion of a disowned run");
                return;
            }
        }

        // cancel the timeout before anything else so it cannot race this path
        self.timeout = None;

        let changed_count = changed.len();
        let settings = self.settings.borrow().clone();
        if !changed.is_empty() && settings.calendar_enabled {
            // hand off exactly once, off the control path
            let notifier = self.notifier.clone();
            tokio::spawn(async move {
                notifier.notify_changed(&changed).await;
            });
        }

        self.run_state = RunState::Idle;
        self.last_completed_at = Some(now_millis());
        self.last_changed_count = Some(changed_count);
        self.arm_periodic();
        self.publish_status();
    }

    // ========================================================================
    // Periodic trigger
    // ========================================================================

    fn arm_periodic(&mut self) {
        if self.periodic.is_some() {
            return;
        }
        let settings = self.settings.borrow().clone();
        if !settings.auto_sync_enabled {
            return;
        }

        let period = Duration::from_millis(settings.auto_sync_interval_millis.max(1));
        self.periodic = Some(timer::schedule_repeating(
            period,
            period,
            self.tx.clone(),
            Command::PeriodicTick,
        ));
        tracing::debug!(interval_ms = settings.auto_sync_interval_millis, "Periodic sync armed");
    }

    fn disarm_periodic(&mut self) {
        if self.periodic.take().is_some() {
            tracing::debug!("Periodic sync disarmed");
        }
    }

    // ========================================================================
    // Settings reaction
    // ========================================================================

    fn on_settings_changed(&mut self) {
        let new = self.settings.borrow().clone();
        let old = std::mem::replace(&mut self.last_settings, new.clone());

        if old.auto_sync_enabled != new.auto_sync_enabled {
            if new.auto_sync_enabled {
                tracing::info!("Auto sync enabled");
                self.arm_periodic();
            } else {
                tracing::info!("Auto sync disabled");
                self.disarm_periodic();
            }
            self.publish_status();
        } else if old.auto_sync_interval_millis != new.auto_sync_interval_millis
            && self.periodic.is_some()
        {
            // re-arm so the next fire is relative to the new interval;
            // the partially elapsed period is discarded
            tracing::info!(
                interval_ms = new.auto_sync_interval_millis,
                "Auto sync interval changed, re-arming"
            );
            self.disarm_periodic();
            self.arm_periodic();
            self.publish_status();
        }
        // timeout and backend are read fresh at the next run
    }

    // ========================================================================
    // Status / shutdown
    // ========================================================================

    fn publish_status(&self) {
        let _ = self.status_tx.send(SyncStatus {
            running: matches!(self.run_state, RunState::Running { .. }),
            periodic_armed: self.periodic.is_some(),
            runs_started: self.runs_started,
            last_completed_at: self.last_completed_at,
            last_changed_count: self.last_changed_count,
        });
    }

    /// Release both timer handles and close the in-flight run
    async fn close(&mut self) {
        self.disarm_periodic();
        self.timeout = None;

        if let RunState::Running { run_id, cancel } =
            std::mem::replace(&mut self.run_state, RunState::Idle)
        {
            tracing::info!(run_id, "Waiting for in-flight sync run to close");
            cancel.cancel();

            let drain = async {
                while let Some(command) = self.rx.recv().await {
                    if let Command::RunCompleted(id, _) = command {
                        if id == run_id {
                            return;
                        }
                    }
                }
            };
            if tokio::time::timeout(Duration::from_secs(SHUTDOWN_DRAIN_SECS), drain)
                .await
                .is_err()
            {
                tracing::warn!(run_id, "Sync run did not close within the shutdown grace period");
            }
        }

        self.publish_status();
    }
}
