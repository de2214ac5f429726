//! Command worker - the single consumer of the task queue
//!
//! Runs one task at a time, to completion, in submission order. A task that
//! fails or panics is logged and counted; the loop keeps going.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::queue::{QueuedTask, TaskReceiver};

/// Outcome counters, shared with whoever wants to observe the worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    completed: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
}

impl WorkerStats {
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::SeqCst)
    }

    /// Tasks finished in any way
    pub fn processed(&self) -> u64 {
        self.completed() + self.failed() + self.panicked()
    }
}

pub struct CommandWorker {
    receiver: TaskReceiver,
    cancel: CancellationToken,
    stats: Arc<WorkerStats>,
}

impl CommandWorker {
    pub fn new(receiver: TaskReceiver, cancel: CancellationToken) -> Self {
        Self {
            receiver,
            cancel,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Run on a tokio task until cancelled
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain the queue until cancelled or every producer is gone
    pub async fn run(mut self) {
        info!("Command worker started");

        while let Some(task) = self.receiver.receive(&self.cancel).await {
            self.execute(task).await;
        }

        info!(
            completed = self.stats.completed(),
            failed = self.stats.failed(),
            panicked = self.stats.panicked(),
            "Command worker stopped"
        );
    }

    #[instrument(skip_all, fields(task_id = task.id, label = task.label))]
    async fn execute(&self, task: QueuedTask) {
        let outcome = AssertUnwindSafe(async move { (task.run)().await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {
                self.stats.completed.fetch_add(1, Ordering::SeqCst);
                debug!("Task completed");
            }
            Ok(Err(e)) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(error = %e, "Executing a command failed");
            }
            Err(panic) => {
                self.stats.panicked.fetch_add(1, Ordering::SeqCst);
                error!(panic = panic_message(panic.as_ref()), "Executing a command failed");
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
