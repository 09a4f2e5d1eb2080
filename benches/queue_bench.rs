//! Benchmarks for queue operations and end-to-end scheduling throughput.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;
use tokio::runtime::Runtime;

use workq::config::{SchedulerConfig, TaskOptions};
use workq::core::TaskScheduler;
use workq::queue::{Fifo, PriorityQueue};

fn bench_fifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("fifo");
    for size in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(
            BenchmarkId::new("enqueue_dequeue", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let mut q = Fifo::new();
                    for i in 0..size {
                        q.enqueue(black_box(i));
                    }
                    while let Ok(v) = q.dequeue() {
                        black_box(v);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_priority_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_queue");
    for size in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(
            BenchmarkId::new("random_priorities", size),
            &size,
            |b, &size| {
                let mut rng = rand::rng();
                let priorities: Vec<i64> = (0..size).map(|_| rng.random_range(-100..100)).collect();
                b.iter(|| {
                    let mut q = PriorityQueue::new();
                    for (i, &priority) in priorities.iter().enumerate() {
                        q.enqueue(black_box(i), priority);
                    }
                    while let Ok(v) = q.dequeue() {
                        black_box(v);
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_scheduler_throughput(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("scheduler");
    for tasks in [100u32, 1_000] {
        group.throughput(Throughput::Elements(u64::from(tasks)));
        group.bench_with_input(
            BenchmarkId::new("collect_trivial", tasks),
            &tasks,
            |b, &tasks| {
                b.iter(|| {
                    runtime.block_on(async {
                        let q: TaskScheduler<u32, u32> = TaskScheduler::with_factory(
                            SchedulerConfig::new().with_max_workers(8),
                            |n| async move { Ok(n) },
                        );
                        for n in 0..tasks {
                            q.enqueue(n, TaskOptions::new()).expect("factory bound");
                        }
                        black_box(q.collect().await)
                    });
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_fifo,
    bench_priority_queue,
    bench_scheduler_throughput
);
criterion_main!(benches);
