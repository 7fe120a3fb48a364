//! Background work decoupled from the request path.
//!
//! Handlers submit [`BackgroundTask`]s to a bounded channel; one worker task
//! drains it against the database. A failing task is retried a few times
//! before it is dropped with an error log, so every accepted task runs at
//! least once unless the store stays down.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::store::{Database, ResetSummary};

/// Default capacity of the task channel.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Attempts per task before it is given up.
pub const MAX_TASK_ATTEMPTS: u32 = 3;

const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Work the background worker knows how to do.
#[derive(Debug)]
pub enum BackgroundTask {
    /// Append an entry to the action log.
    RecordAction {
        /// Action name.
        action: String,
        /// Free-form payload.
        info: Value,
    },
    /// Remove all cells and rows of a year.
    ResetYear {
        /// Year to wipe.
        year: i64,
        /// Fires after the reset committed.
        done: Option<oneshot::Sender<ResetSummary>>,
    },
}

impl BackgroundTask {
    fn name(&self) -> &'static str {
        match self {
            Self::RecordAction { .. } => "record_action",
            Self::ResetYear { .. } => "reset_year",
        }
    }

    async fn execute(&self, database: &Database) -> EngineResult<Option<ResetSummary>> {
        match self {
            Self::RecordAction { action, info } => {
                database.audit().record(action, info).await?;
                Ok(None)
            }
            Self::ResetYear { year, .. } => database.finance().reset_year(*year).await.map(Some),
        }
    }

    fn complete(self, outcome: Option<ResetSummary>) {
        if let (Self::ResetYear { done: Some(done), .. }, Some(summary)) = (self, outcome) {
            // The submitter may have stopped waiting.
            let _ = done.send(summary);
        }
    }
}

/// Sending half of the background task channel.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<BackgroundTask>,
}

impl TaskQueue {
    /// Starts the worker and returns the queue feeding it.
    ///
    /// The worker exits once every clone of the queue is dropped and the
    /// remaining tasks are done; await the handle to drain it.
    pub fn spawn(database: Database, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(run_worker(database, receiver));
        (Self { sender }, handle)
    }

    /// Queues a task, waiting for room if the channel is full.
    ///
    /// # Errors
    ///
    /// `TaskQueueClosed` if the worker is gone.
    pub async fn submit(&self, task: BackgroundTask) -> EngineResult<()> {
        self.sender
            .send(task)
            .await
            .map_err(|_| EngineError::TaskQueueClosed)
    }

    /// Queues an action log entry without waiting for room.
    ///
    /// # Errors
    ///
    /// `TaskQueueFull` if the channel has no capacity left, `TaskQueueClosed`
    /// if the worker is gone. The entry is dropped in both cases.
    pub fn record(&self, action: &str, info: Value) -> EngineResult<()> {
        self.sender
            .try_send(BackgroundTask::RecordAction {
                action: action.to_string(),
                info,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => EngineError::TaskQueueFull,
                TrySendError::Closed(_) => EngineError::TaskQueueClosed,
            })
    }

    /// Queues a year reset and returns a receiver that resolves once the
    /// reset committed.
    pub async fn reset_year(&self, year: i64) -> EngineResult<oneshot::Receiver<ResetSummary>> {
        let (done, completed) = oneshot::channel();
        self.submit(BackgroundTask::ResetYear {
            year,
            done: Some(done),
        })
        .await?;
        Ok(completed)
    }
}

async fn run_worker(database: Database, mut receiver: mpsc::Receiver<BackgroundTask>) {
    info!("Background worker started");

    while let Some(task) = receiver.recv().await {
        let mut attempt = 1;
        loop {
            match task.execute(&database).await {
                Ok(outcome) => {
                    debug!(task = task.name(), attempt = attempt, "Background task done");
                    task.complete(outcome);
                    break;
                }
                Err(e) if attempt < MAX_TASK_ATTEMPTS => {
                    warn!(
                        task = task.name(),
                        attempt = attempt,
                        error = %e,
                        "Background task failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                }
                Err(e) => {
                    error!(
                        task = task.name(),
                        attempts = attempt,
                        error = %e,
                        "Background task dropped"
                    );
                    break;
                }
            }
        }
    }

    info!("Background worker stopped");
}
