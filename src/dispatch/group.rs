//! Process-wide count of outstanding promise work.
//!
//! Two kinds of work are counted: every pending promise, from creation until
//! it resolves or is dropped, and every job the library hands to a dispatch
//! target, from submission until it has finished running (delayed jobs
//! included). [`wait_for_promises`] turns that count into a synchronization
//! barrier for test harnesses and host shutdown code. Nothing in the library
//! relies on the count for correctness.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

static OUTSTANDING: WorkGroup = WorkGroup::new();

struct WorkGroup {
    count: Mutex<usize>,
    idle: Condvar,
}

impl WorkGroup {
    const fn new() -> Self {
        Self {
            count: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    fn enter(&self) {
        *self.count.lock() += 1;
    }

    fn leave(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count > 0 {
            if self.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}

/// Marks one unit of outstanding work; leaving happens on drop.
///
/// Tokens travel inside the job closure, so a job that is dropped without
/// running (for example by a queue whose thread has exited) or that panics
/// still releases its slot.
#[derive(Debug)]
#[must_use = "dropping the token immediately marks the work as finished"]
pub(crate) struct WorkToken {
    _private: (),
}

impl WorkToken {
    pub(crate) fn enter() -> Self {
        OUTSTANDING.enter();
        Self { _private: () }
    }
}

impl Drop for WorkToken {
    fn drop(&mut self) {
        OUTSTANDING.leave();
    }
}

/// Blocks until every pending promise has resolved and all submitted promise
/// work has finished, or `timeout` elapses.
///
/// Returns `true` if the process reached a state with no pending promises and
/// no queued, delayed or running promise jobs before the deadline. A promise
/// that is dropped while pending stops counting.
///
/// The count is process-wide: work belonging to unrelated promises (for
/// example other tests running in parallel) is waited for as well.
///
/// # Examples
///
/// ```rust
/// use promises::{Promise, wait_for_promises};
/// use std::time::Duration;
///
/// let promise = Promise::<i32>::spawn(|| Ok(42));
/// assert!(wait_for_promises(Duration::from_secs(5)));
/// assert_eq!(promise.value(), Some(42));
/// ```
#[must_use]
pub fn wait_for_promises(timeout: Duration) -> bool {
    OUTSTANDING.wait(timeout)
}
