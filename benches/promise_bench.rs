//! Benchmark for promise resolution, chaining and combinators.
//!
//! Inline targets isolate the cost of the promise machinery itself; the
//! queue benchmarks include the thread hand-off.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use promises::{DispatchQueue, Promise, Target, all_on};
use std::hint::black_box;

// =============================================================================
// Resolution Benchmarks
// =============================================================================

fn benchmark_resolve_fan_out(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("resolve_fan_out");
    let inline = Target::inline();

    for observers in [1, 2, 16, 128] {
        group.bench_with_input(
            BenchmarkId::new("observers", observers),
            &observers,
            |bencher, &observers| {
                bencher.iter(|| {
                    let promise = Promise::<u64>::pending_on(&inline);
                    let derived: Vec<_> = (0..observers)
                        .map(|_| promise.then(|value| Ok(value + 1)))
                        .collect();
                    promise.fulfill(black_box(41));
                    black_box(derived)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Chaining Benchmarks
// =============================================================================

fn benchmark_then_chain(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("then_chain");
    let inline = Target::inline();
    let queue = Target::new(DispatchQueue::new("bench.queue"));

    for depth in [10, 100] {
        group.bench_with_input(BenchmarkId::new("inline", depth), &depth, |bencher, &depth| {
            bencher.iter(|| {
                let source = Promise::<u64>::pending_on(&inline);
                let tail = (0..depth).fold(source.clone(), |promise, _| {
                    promise.then(|value| Ok(value + 1))
                });
                source.fulfill(0);
                black_box(tail.value())
            });
        });

        group.bench_with_input(BenchmarkId::new("queue", depth), &depth, |bencher, &depth| {
            bencher.iter(|| {
                let source = Promise::<u64>::pending_on(&queue);
                let tail = (0..depth).fold(source.clone(), |promise, _| {
                    promise.then(|value| Ok(value + 1))
                });
                source.fulfill(0);
                black_box(tail.wait())
            });
        });
    }

    group.finish();
}

// =============================================================================
// Combinator Benchmarks
// =============================================================================

fn benchmark_all(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("all");
    let inline = Target::inline();

    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("inputs", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let inputs: Vec<_> = (0..size)
                    .map(|_| Promise::<u64>::pending_on(&inline))
                    .collect();
                let joined = all_on(&inline, inputs.clone());
                for (index, input) in inputs.iter().enumerate() {
                    input.fulfill(index as u64);
                }
                black_box(joined.value())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_resolve_fan_out,
    benchmark_then_chain,
    benchmark_all
);

criterion_main!(benches);
