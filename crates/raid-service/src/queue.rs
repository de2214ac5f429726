//! Task queue - unbounded FIFO of deferred actions with a single consumer
//!
//! Producers submit from request handlers and never block. The receiving half
//! is owned by exactly one [`CommandWorker`](crate::worker::CommandWorker).

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A deferred action. Errors are logged by the worker and go nowhere else.
pub type Task = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// A task with its submission id and a label for logs
pub struct QueuedTask {
    pub id: u64,
    pub label: &'static str,
    pub run: Task,
}

impl std::fmt::Debug for QueuedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedTask")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish()
    }
}

/// Receiving half was dropped; the worker is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("task queue is closed")]
pub struct QueueClosed;

/// Producer handle, cheap to clone
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<QueuedTask>,
    /// Last id handed out; held across the send so ids enter the queue in order
    sequence: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("submitted", &self.submitted())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Consumer handle
#[derive(Debug)]
pub struct TaskReceiver {
    rx: mpsc::UnboundedReceiver<QueuedTask>,
}

impl TaskQueue {
    /// Create a queue and its single receiver
    pub fn new() -> (Self, TaskReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                sequence: Arc::new(Mutex::new(0)),
            },
            TaskReceiver { rx },
        )
    }

    /// Append an action to the tail. Never blocks.
    ///
    /// Returns the task id, increasing in submission order.
    pub fn submit<F, Fut>(&self, label: &'static str, action: F) -> Result<u64, QueueClosed>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let run: Task = Box::new(move || action().boxed());
        let mut sequence = self.sequence.lock();
        let id = *sequence + 1;
        self.tx
            .send(QueuedTask { id, label, run })
            .map_err(|_| QueueClosed)?;
        *sequence = id;
        drop(sequence);
        trace!(task_id = id, label, "Task queued");
        Ok(id)
    }

    /// Number of tasks submitted so far
    pub fn submitted(&self) -> u64 {
        *self.sequence.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl TaskReceiver {
    /// Wait for the next task.
    ///
    /// Returns `None` once `cancel` fires or every producer is gone. A task
    /// already handed out is unaffected by cancellation.
    pub async fn receive(&mut self, cancel: &CancellationToken) -> Option<QueuedTask> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            task = self.rx.recv() => task,
        }
    }

    /// Tasks waiting to run
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
