//! Dispatch targets: where promise continuations run.
//!
//! The promise core never runs user code on its own. Each continuation is
//! packaged as a [`Job`] and handed to a [`DispatchTarget`], which decides on
//! which thread and when it runs. A target only has to provide two
//! operations:
//!
//! - [`submit`](DispatchTarget::submit): run the job as soon as possible.
//! - [`submit_after`](DispatchTarget::submit_after): run the job no earlier
//!   than a given delay from now.
//!
//! Jobs submitted to one target from one thread must start in submission
//! order. Targets may drop jobs (for example during shutdown); a dropped job
//! simply never runs.
//!
//! # Shipped targets
//!
//! | Target | Runs jobs on | Ordering |
//! |---|---|---|
//! | [`DispatchQueue`] | one dedicated thread per queue | serial, FIFO |
//! | [`ConcurrentQueue`] | the shared runtime's blocking pool | FIFO start, parallel |
//! | [`Inline`] | the submitting thread | immediate |
//!
//! [`Target`] is the cloneable, type-erased handle the rest of the crate
//! passes around. `Target::default()` returns the process-wide default,
//! which is a serial queue labelled `promises.default` unless
//! [`Config`](crate::Config) overrides it.

mod concurrent;
mod group;
mod queue;
pub mod runtime;

pub use concurrent::ConcurrentQueue;
pub use group::wait_for_promises;
pub use queue::{DispatchQueue, QueueError};

pub(crate) use group::WorkToken;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::error::PromiseError;

/// A unit of work handed to a dispatch target.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An execution context that accepts jobs for immediate or delayed execution.
///
/// Implementations must start jobs submitted from a single thread in the
/// order they were submitted. They should run each job with
/// [`run_job`] (or an equivalent `catch_unwind`) so that a panicking
/// continuation cannot take the executing thread down with it.
pub trait DispatchTarget: Send + Sync + 'static {
    /// Queues `job` for execution as soon as possible.
    fn submit(&self, job: Job);

    /// Queues `job` for execution after at least `delay` has elapsed.
    fn submit_after(&self, delay: Duration, job: Job);

    /// Human-readable name used in logs.
    fn label(&self) -> &str {
        "anonymous"
    }
}

/// Runs a job, catching and logging any panic it raises.
///
/// Custom [`DispatchTarget`] implementations can use this to get the same
/// panic isolation as the shipped targets.
pub fn run_job(label: &str, job: Job) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
        tracing::error!(
            queue = label,
            panic = panic_message(payload.as_ref()),
            "dispatched job panicked"
        );
    }
}

/// Runs a user closure on behalf of a promise, turning a panic into
/// [`PromiseError::Panicked`].
pub(crate) fn guarded<R, F>(work: F) -> Result<R, PromiseError>
where
    F: FnOnce() -> R,
{
    panic::catch_unwind(AssertUnwindSafe(work)).map_err(|payload| {
        tracing::error!(
            panic = panic_message(payload.as_ref()),
            "promise callback panicked"
        );
        PromiseError::Panicked
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

// =============================================================================
// Inline
// =============================================================================

/// Runs jobs immediately on the thread that submits them.
///
/// Continuations attached through an inline target run on whichever thread
/// resolves the upstream promise (or on the registering thread if it is
/// already resolved). Delayed jobs run on a worker of the shared runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct Inline;

impl DispatchTarget for Inline {
    fn submit(&self, job: Job) {
        run_job(self.label(), job);
    }

    fn submit_after(&self, delay: Duration, job: Job) {
        runtime::spawn_after(delay, Box::new(move || run_job("inline", job)));
    }

    fn label(&self) -> &str {
        "inline"
    }
}

// =============================================================================
// Target
// =============================================================================

static INLINE: LazyLock<Target> = LazyLock::new(|| Target::new(Inline));

/// Shared handle to a [`DispatchTarget`].
///
/// Cloning is cheap. Two handles compare equal with [`Target::ptr_eq`] when
/// they refer to the same underlying target.
#[derive(Clone)]
pub struct Target(Arc<dyn DispatchTarget>);

impl Target {
    /// Wraps a dispatch target.
    pub fn new<D: DispatchTarget>(target: D) -> Self {
        Self(Arc::new(target))
    }

    /// The shared [`Inline`] target.
    #[must_use]
    pub fn inline() -> Self {
        INLINE.clone()
    }

    /// Name of the underlying target.
    #[must_use]
    pub fn label(&self) -> &str {
        self.0.label()
    }

    /// Returns `true` if both handles refer to the same target.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Submits a raw job. The job is not tracked by
    /// [`wait_for_promises`].
    pub fn submit(&self, job: Job) {
        self.0.submit(job);
    }

    /// Submits a raw delayed job. The job is not tracked by
    /// [`wait_for_promises`].
    pub fn submit_after(&self, delay: Duration, job: Job) {
        self.0.submit_after(delay, job);
    }

    /// Submits promise work, counting it as outstanding until it finishes.
    pub(crate) fn dispatch<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = WorkToken::enter();
        self.0.submit(Box::new(move || {
            let _token = token;
            work();
        }));
    }

    /// Delayed variant of [`Target::dispatch`]; the work counts as outstanding
    /// while its timer is pending.
    pub(crate) fn dispatch_after<F>(&self, delay: Duration, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = WorkToken::enter();
        self.0.submit_after(
            delay,
            Box::new(move || {
                let _token = token;
                work();
            }),
        );
    }
}

impl Default for Target {
    /// The process-wide default target.
    ///
    /// Returns the target installed through [`Config`](crate::Config), or the
    /// shared `promises.default` serial queue.
    fn default() -> Self {
        crate::config::current()
            .default_target()
            .cloned()
            .unwrap_or_else(queue::default_queue)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Target").field(&self.label()).finish()
    }
}

static_assertions::assert_impl_all!(Target: Send, Sync, Clone);
