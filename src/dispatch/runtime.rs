//! Shared tokio runtime backing timers and the concurrent queue.
//!
//! Delayed submissions and [`ConcurrentQueue`](super::ConcurrentQueue) jobs
//! never run on a caller's runtime. A test annotated with
//! `#[tokio::test]` drives a current-thread runtime that stops making
//! progress as soon as the test thread blocks in
//! [`Promise::wait`](crate::Promise::wait); timers registered there would
//! never fire. All library timers therefore live on one process-wide
//! multi-thread runtime that is created on first use and never dropped.

use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use super::Job;

/// Process-wide runtime, one worker per CPU core.
static GLOBAL_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("promises-runtime")
        .enable_time()
        .build()
        .expect("Failed to create global tokio runtime")
});

/// Returns the process-wide runtime, building it on first call.
#[inline]
#[must_use]
pub fn global() -> &'static Runtime {
    &GLOBAL_RUNTIME
}

/// Spawns a future on the process-wide runtime.
#[inline]
pub(crate) fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    global().spawn(future)
}

/// Runs `job` on a runtime worker once `delay` has elapsed.
///
/// The job runs directly on the timer task; callers that need the job on a
/// particular thread forward it from inside `job`.
pub(crate) fn spawn_after(delay: Duration, job: Job) {
    spawn(async move {
        tokio::time::sleep(delay).await;
        job();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ptr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Instant;

    #[rstest]
    fn global_returns_same_instance() {
        let runtime1 = global();
        let runtime2 = global();
        assert!(ptr::eq(runtime1, runtime2));
    }

    #[rstest]
    fn global_runtime_is_multi_threaded() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = counter.clone();
                spawn(async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        global().block_on(async {
            for handle in handles {
                handle.await.unwrap();
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[rstest]
    fn spawn_after_waits_for_delay() {
        let (sender, receiver) = mpsc::channel();
        let started = Instant::now();

        spawn_after(
            Duration::from_millis(50),
            Box::new(move || {
                sender.send(Instant::now()).unwrap();
            }),
        );

        let fired = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(fired.duration_since(started) >= Duration::from_millis(50));
    }

    #[rstest]
    #[tokio::test(flavor = "current_thread")]
    async fn spawn_after_fires_while_caller_runtime_is_blocked() {
        let (sender, receiver) = mpsc::channel();

        spawn_after(
            Duration::from_millis(10),
            Box::new(move || {
                sender.send(42).unwrap();
            }),
        );

        // Blocking the current-thread runtime must not stall the timer.
        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)), Ok(42));
    }
}
