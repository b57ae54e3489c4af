//! The schedule registry and its per-job loops.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Cadence of the collection-metadata polling job.
pub const COLLECTION_POLL_CADENCE: Duration = Duration::from_secs(5);

/// A job body: one tick's worth of work. Errors are logged by the loop;
/// the cadence continues unless the task stopped its own job.
pub type JobTask =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send + Sync>;

/// Uniqueness boundary for scheduled jobs: a client scope plus a logical
/// job name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub scope: String,
    pub name: String,
}

impl JobKey {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.name)
    }
}

/// Whether a registered job's loop is currently firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Stopped,
}

/// Per-job registration state.
struct JobSlot {
    cadence: Duration,
    task: JobTask,
    state: JobState,
    /// Present while the loop runs; signaling it lets an in-flight tick
    /// finish and suppresses the next firing.
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl JobSlot {
    /// Signal the loop to exit. Idempotent: the sender is taken, so a
    /// second stop has nothing left to signal.
    fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        self.handle.take();
        self.state = JobState::Stopped;
    }
}

/// Registry of keyed periodic jobs.
///
/// Each job runs in its own tokio task, so one job's failure or panic
/// never stops another job's firings. Mutations are serialized through
/// the whole-map lock.
pub struct ScheduleRegistry {
    jobs: RwLock<HashMap<JobKey, JobSlot>>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Register `task` to run every `cadence` under `key`.
    ///
    /// An existing job at `key` is stopped first, exactly once, before
    /// the replacement loop is installed. The registry never fires the
    /// task eagerly: the first tick lands one full cadence after
    /// registration.
    pub async fn set_job(&self, key: JobKey, cadence: Duration, task: JobTask) {
        let mut jobs = self.jobs.write().await;
        if let Some(prior) = jobs.get_mut(&key) {
            debug!(job = %key, "replacing registered job");
            prior.stop();
        }

        let slot = spawn_slot(key.clone(), cadence, task);
        jobs.insert(key.clone(), slot);
        info!(job = %key, ?cadence, "job registered");
    }

    /// Convenience wrapper at the fixed collection-polling cadence.
    pub async fn set_collection_job(&self, key: JobKey, task: JobTask) {
        self.set_job(key, COLLECTION_POLL_CADENCE, task).await;
    }

    /// Current state of the job at `key`, if registered.
    pub async fn job_state(&self, key: &JobKey) -> Option<JobState> {
        self.jobs.read().await.get(key).map(|slot| slot.state)
    }

    /// Pause the job at `key` without discarding its registration.
    ///
    /// An in-flight tick finishes; only the next firing is suppressed.
    /// Returns `false` for an unknown key — tolerated, but it shows up
    /// in the logs.
    pub async fn stop_job(&self, key: &JobKey) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(key) {
            Some(slot) => {
                if slot.state == JobState::Running {
                    slot.stop();
                    info!(job = %key, "job stopped");
                } else {
                    debug!(job = %key, "stop for already-stopped job");
                }
                true
            }
            None => {
                debug!(job = %key, "stop for unknown job");
                false
            }
        }
    }

    /// Resume a stopped job from its retained task and cadence.
    ///
    /// No-op for an already-running job; `false` for an unknown key.
    pub async fn start_job(&self, key: &JobKey) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(key) {
            Some(slot) => {
                if slot.state == JobState::Stopped {
                    let resumed = spawn_slot(key.clone(), slot.cadence, slot.task.clone());
                    *slot = resumed;
                    info!(job = %key, "job resumed");
                } else {
                    debug!(job = %key, "start for already-running job");
                }
                true
            }
            None => {
                debug!(job = %key, "start for unknown job");
                false
            }
        }
    }

    /// Stop every running job (shutdown path).
    pub async fn stop_all(&self) {
        let mut jobs = self.jobs.write().await;
        for (key, slot) in jobs.iter_mut() {
            if slot.state == JobState::Running {
                slot.stop();
                debug!(job = %key, "job stopped");
            }
        }
        info!("all jobs stopped");
    }
}

impl Default for ScheduleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a job loop and return its slot.
fn spawn_slot(key: JobKey, cadence: Duration, task: JobTask) -> JobSlot {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_task = task.clone();
    let handle = tokio::spawn(async move {
        run_job_loop(key, cadence, loop_task, shutdown_rx).await;
    });

    JobSlot {
        cadence,
        task,
        state: JobState::Running,
        shutdown_tx: Some(shutdown_tx),
        handle: Some(handle),
    }
}

/// The loop for a single job. One tick body runs to completion before
/// the next firing is considered — ticks of the same job never overlap.
async fn run_job_loop(
    key: JobKey,
    cadence: Duration,
    task: JobTask,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // An interval's first tick completes immediately; consume it so the
    // first execution lands one full cadence after registration.
    ticker.tick().await;

    debug!(job = %key, "job loop starting");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = task().await {
                    warn!(job = %key, error = %e, "job tick failed");
                }
            }
            _ = shutdown.changed() => {
                debug!(job = %key, "job loop exiting");
                break;
            }
        }
    }
}
