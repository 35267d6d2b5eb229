use tokio::sync::mpsc;
use tracing::trace;

use crate::job::Job;

/// Failure to hand a job to the queue. Enqueuing is fire-and-forget; the
/// retry policy, if any, lives on the queue's consuming side.
#[derive(Debug, thiserror::Error)]
pub enum EnqueueError {
    #[error("queue is closed")]
    Closed,
}

/// Seam between the request path and whatever executes delivery tasks.
/// Implementations must not block and must not wait for task completion.
pub trait TaskQueue: Send + Sync {
    fn enqueue(&self, job: Job) -> Result<(), EnqueueError>;
}

/// In-process queue over an unbounded channel. The receiving half belongs
/// to the worker runtime; once it is dropped, enqueues fail with `Closed`.
#[derive(Clone)]
pub struct LocalQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl LocalQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TaskQueue for LocalQueue {
    fn enqueue(&self, job: Job) -> Result<(), EnqueueError> {
        self.tx.send(job).map_err(|e| {
            trace!("Enqueue on closed queue: {}", e.0.task);
            EnqueueError::Closed
        })
    }
}
