//! Concurrent dispatch target on the shared runtime's blocking pool.

use std::sync::Arc;
use std::time::Duration;

use super::{DispatchTarget, Job, run_job, runtime};

/// Runs jobs in parallel on the blocking thread pool of the shared runtime.
///
/// Jobs are dequeued in submission order but may run concurrently and finish
/// in any order. Use it for CPU-bound or blocking continuations that should
/// not hold up a serial [`DispatchQueue`](super::DispatchQueue).
#[derive(Debug, Clone)]
pub struct ConcurrentQueue {
    label: Arc<str>,
}

impl ConcurrentQueue {
    /// Creates a concurrent target with the given log label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        let label: String = label.into();
        Self {
            label: Arc::from(label),
        }
    }
}

impl Default for ConcurrentQueue {
    fn default() -> Self {
        Self::new("promises.concurrent")
    }
}

impl DispatchTarget for ConcurrentQueue {
    fn submit(&self, job: Job) {
        let label = Arc::clone(&self.label);
        runtime::global().spawn_blocking(move || run_job(&label, job));
    }

    fn submit_after(&self, delay: Duration, job: Job) {
        let label = Arc::clone(&self.label);
        runtime::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::task::spawn_blocking(move || run_job(&label, job));
        });
    }

    fn label(&self) -> &str {
        &self.label
    }
}
