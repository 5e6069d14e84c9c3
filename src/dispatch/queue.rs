//! Serial dispatch queue backed by a dedicated thread.

use std::fmt;
use std::io;
use std::sync::{Arc, LazyLock};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use super::{DispatchTarget, Job, Target, run_job, runtime};

/// Label of the process-wide default queue.
pub(crate) const DEFAULT_QUEUE_LABEL: &str = "promises.default";

static DEFAULT_QUEUE: LazyLock<Target> = LazyLock::new(|| {
    Target::new(DispatchQueue::new(DEFAULT_QUEUE_LABEL))
});

pub(crate) fn default_queue() -> Target {
    DEFAULT_QUEUE.clone()
}

/// Errors that can occur when creating a [`DispatchQueue`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// The operating system refused to start the queue's worker thread.
    #[error("failed to spawn worker thread for queue `{label}`")]
    Spawn {
        /// Label of the queue that failed to start.
        label: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
}

/// A serial queue: jobs run one at a time, in submission order, on a
/// dedicated named thread.
///
/// Delayed jobs wait on a timer of the shared runtime and are appended to the
/// queue when the timer fires, so they run on the queue's thread as well.
///
/// The worker thread exits once every handle to the queue (including those
/// captured by pending delayed jobs) has been dropped and the backlog is
/// drained.
///
/// # Examples
///
/// ```rust
/// use promises::{DispatchQueue, Promise, Target};
///
/// let queue = Target::new(DispatchQueue::new("io"));
/// let promise = Promise::<i32>::spawn_on(&queue, || {
///     assert_eq!(std::thread::current().name(), Some("io"));
///     Ok(42)
/// });
/// assert_eq!(promise.wait(), Ok(42));
/// ```
pub struct DispatchQueue {
    label: Arc<str>,
    sender: mpsc::UnboundedSender<Job>,
}

impl DispatchQueue {
    /// Creates a queue and starts its worker thread.
    ///
    /// # Panics
    ///
    /// Panics if the worker thread cannot be spawned. Use
    /// [`DispatchQueue::try_new`] to handle that case.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::try_new(label).expect("Failed to spawn dispatch queue thread")
    }

    /// Creates a queue, returning an error if the worker thread cannot be
    /// spawned.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Spawn`] when the OS refuses to create the thread.
    pub fn try_new(label: impl Into<String>) -> Result<Self, QueueError> {
        let label: String = label.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
        let worker_label: Arc<str> = Arc::from(label.as_str());
        let thread_label = Arc::clone(&worker_label);

        thread::Builder::new()
            .name(label.clone())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    run_job(&thread_label, job);
                }
                tracing::trace!(queue = %thread_label, "dispatch queue drained and closed");
            })
            .map_err(|source| QueueError::Spawn {
                label: label.clone(),
                source,
            })?;

        Ok(Self {
            label: worker_label,
            sender,
        })
    }

    fn enqueue(sender: &mpsc::UnboundedSender<Job>, label: &str, job: Job) {
        if sender.send(job).is_err() {
            tracing::warn!(queue = label, "dispatch queue worker has exited, dropping job");
        }
    }
}

impl DispatchTarget for DispatchQueue {
    fn submit(&self, job: Job) {
        Self::enqueue(&self.sender, &self.label, job);
    }

    fn submit_after(&self, delay: Duration, job: Job) {
        let sender = self.sender.clone();
        let label = Arc::clone(&self.label);
        runtime::spawn_after(
            delay,
            Box::new(move || Self::enqueue(&sender, &label, job)),
        );
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DispatchQueue")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
