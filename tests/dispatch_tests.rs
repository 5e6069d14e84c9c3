//! Dispatch target tests, including a custom target implementation.

use promises::{DispatchTarget, Inline, Job, Promise, PromiseError, Target, run_job};
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records submissions and runs them on the submitting thread.
#[derive(Default)]
struct CountingTarget {
    immediate: AtomicUsize,
    delayed: AtomicUsize,
    delays: Mutex<Vec<Duration>>,
}

struct SharedCounting(Arc<CountingTarget>);

impl DispatchTarget for SharedCounting {
    fn submit(&self, job: Job) {
        self.0.immediate.fetch_add(1, Ordering::SeqCst);
        run_job(self.label(), job);
    }

    fn submit_after(&self, delay: Duration, job: Job) {
        self.0.delayed.fetch_add(1, Ordering::SeqCst);
        self.0.delays.lock().unwrap().push(delay);
        Inline.submit_after(delay, job);
    }

    fn label(&self) -> &str {
        "test.counting"
    }
}

fn counting() -> (Arc<CountingTarget>, Target) {
    let counts = Arc::new(CountingTarget::default());
    let target = Target::new(SharedCounting(Arc::clone(&counts)));
    (counts, target)
}

// =============================================================================
// Custom Target Tests
// =============================================================================

/// Continuations are submitted to the handle's target.
#[rstest]
fn test_custom_target_receives_continuations() {
    let (counts, target) = counting();
    let source = Promise::<i32>::pending_on(&target);

    let doubled = source.then(|value| Ok(value * 2));
    let tripled = source.then(|value| Ok(value * 3));
    source.fulfill(2);

    assert_eq!(doubled.value(), Some(4));
    assert_eq!(tripled.value(), Some(6));
    assert_eq!(counts.immediate.load(Ordering::SeqCst), 2);
}

/// Timers go through `submit_after` with the requested interval.
#[rstest]
fn test_custom_target_receives_delayed_jobs() {
    let (counts, target) = counting();
    let delayed = Promise::<i32>::fulfilled(1)
        .on(&target)
        .delay(Duration::from_millis(15));

    assert_eq!(delayed.wait(), Ok(1));
    assert_eq!(counts.delayed.load(Ordering::SeqCst), 1);
    assert_eq!(
        *counts.delays.lock().unwrap(),
        vec![Duration::from_millis(15)]
    );
}

/// `timeout` schedules its timer on the target.
#[rstest]
fn test_custom_target_runs_timeout_timer() {
    let (counts, target) = counting();
    let bounded = Promise::<i32>::pending_on(&target).timeout(Duration::from_millis(10));

    assert_eq!(bounded.wait(), Err(PromiseError::TimedOut));
    assert_eq!(counts.delayed.load(Ordering::SeqCst), 1);
}

/// Target handles render their label.
#[rstest]
fn test_target_label() {
    let (_, target) = counting();
    assert_eq!(target.label(), "test.counting");
    assert_eq!(Target::inline().label(), "inline");
    assert_eq!(Target::default().label(), "promises.default");
}

// =============================================================================
// Panic Containment Tests
// =============================================================================

/// A panicking raw job is logged and the queue keeps serving later jobs.
#[rstest]
fn test_queue_survives_panicking_job() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("promises=error"))
        .with_test_writer()
        .try_init();

    let queue = Target::new(promises::DispatchQueue::new("test.raw_panic"));
    queue.submit(Box::new(|| panic!("raw job failed")));
    let after = Promise::<i32>::spawn_on(&queue, || Ok(6));

    assert_eq!(after.wait_timeout(Duration::from_secs(5)), Some(Ok(6)));
}
