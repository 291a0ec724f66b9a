//! Interval scheduler driving recurring sync cycles.
//!
//! One cycle runs immediately. If every task succeeds the scheduler arms a
//! fixed interval and runs a cycle per tick; the first failing cycle stops it
//! for good. Ticks never overlap: the next sleep starts only after the
//! previous cycle has fanned back in.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use skysync_core::SyncTask;
//! use skysync_infra::scheduling::{SyncScheduler, SyncSchedulerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(tasks: Vec<Arc<dyn SyncTask>>) {
//! let scheduler = SyncScheduler::new(tasks, SyncSchedulerConfig::default());
//! let exit = scheduler.run(CancellationToken::new()).await;
//! println!("scheduler finished: {exit:?}");
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use skysync_core::{run_cycle, SyncTask};
use skysync_domain::constants::{DEFAULT_SYNC_INTERVAL_SECS, SCHEDULER_JOIN_TIMEOUT_SECS};
use skysync_domain::{CycleReport, SyncConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<SchedulerExit>>>>;

/// Configuration for sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Delay between the end of one cycle and the start of the next
    pub interval: Duration,
    /// How long `stop` waits for the loop to wind down
    pub join_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            join_timeout: Duration::from_secs(SCHEDULER_JOIN_TIMEOUT_SECS),
        }
    }
}

impl From<&SyncConfig> for SyncSchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self { interval: Duration::from_secs(config.interval_seconds), ..Self::default() }
    }
}

/// Why the scheduler loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    /// A cycle failed; no further cycles will run.
    Halted {
        /// Cycles run, the failing one included
        cycles: u64,
    },
    /// The cancellation token fired.
    Cancelled {
        /// Cycles completed before cancellation
        cycles: u64,
    },
}

impl SchedulerExit {
    /// Number of cycles that ran to completion.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        match self {
            Self::Halted { cycles } | Self::Cancelled { cycles } => *cycles,
        }
    }
}

/// Sync scheduler for periodic constituent sync
pub struct SyncScheduler {
    tasks: Arc<[Arc<dyn SyncTask>]>,
    config: SyncSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl SyncScheduler {
    /// Create a new sync scheduler over `tasks`.
    #[must_use]
    pub fn new(tasks: Vec<Arc<dyn SyncTask>>, config: SyncSchedulerConfig) -> Self {
        Self {
            tasks: tasks.into(),
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Run the scheduler on the current task until it halts or `cancel`
    /// fires.
    pub async fn run(&self, cancel: CancellationToken) -> SchedulerExit {
        Self::sync_loop(Arc::clone(&self.tasks), self.config.interval, cancel).await
    }

    /// Start the scheduler on a background task.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting sync scheduler");

        // Fresh token so a stopped scheduler can be restarted
        self.cancellation_token = CancellationToken::new();

        let tasks = Arc::clone(&self.tasks);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move { Self::sync_loop(tasks, interval, cancel).await });

        *self.task_handle.lock().await = Some(handle);

        Ok(())
    }

    /// Stop the scheduler and wait for the loop to finish.
    ///
    /// A loop that already halted on its own is joined and its exit
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler was never started or was already stopped,
    /// or if the loop does not finish within the join timeout.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<SchedulerExit> {
        let handle = self.task_handle.lock().await.take().ok_or(SchedulerError::NotRunning)?;

        info!(finished = handle.is_finished(), "Stopping sync scheduler");
        self.cancellation_token.cancel();

        let join_timeout = self.config.join_timeout;
        let exit = tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { duration: join_timeout })??;

        info!(?exit, "Sync scheduler stopped");
        Ok(exit)
    }

    /// Wait for a started scheduler to finish on its own.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler was never started.
    pub async fn wait(&mut self) -> SchedulerResult<SchedulerExit> {
        let handle = self.task_handle.lock().await.take().ok_or(SchedulerError::NotRunning)?;
        Ok(handle.await?)
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn sync_loop(
        tasks: Arc<[Arc<dyn SyncTask>]>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> SchedulerExit {
        let mut cycles = 0u64;

        let Some(report) = Self::cycle(&tasks, &cancel).await else {
            return SchedulerExit::Cancelled { cycles };
        };
        cycles += 1;
        if !report.all_succeeded() {
            error!(failed = ?report.failed_tasks(), "Initial sync failed; timer not started");
            return SchedulerExit::Halted { cycles };
        }
        info!(interval_secs = interval.as_secs(), "Initial sync complete; timer armed");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(cycles, "Sync loop cancelled");
                    return SchedulerExit::Cancelled { cycles };
                }
                _ = tokio::time::sleep(interval) => {
                    let Some(report) = Self::cycle(&tasks, &cancel).await else {
                        return SchedulerExit::Cancelled { cycles };
                    };
                    cycles += 1;
                    if !report.all_succeeded() {
                        error!(cycles, failed = ?report.failed_tasks(), "Sync cycle failed; stopping timer");
                        return SchedulerExit::Halted { cycles };
                    }
                }
            }
        }
    }

    /// One cycle, abandoned if cancellation arrives first.
    async fn cycle(
        tasks: &[Arc<dyn SyncTask>],
        cancel: &CancellationToken,
    ) -> Option<CycleReport> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Cancellation arrived during a sync cycle");
                None
            }
            report = run_cycle(tasks) => Some(report),
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncScheduler dropped while running; cancelling tasks");
            self.cancellation_token.cancel();
        }
    }
}
