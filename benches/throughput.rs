//! Throughput Benchmark for textdrop
//!
//! This benchmark measures the text store under create, retrieve and sweep
//! workloads against a temporary SQLite file.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;
use tempfile::TempDir;
use textdrop::storage::{ManualClock, StoreConfig, TextStore, RETENTION_SECS};
use tokio::runtime::Runtime;

const START: i64 = 1_700_000_000;

/// Live rows allowed before the clock is advanced past the retention window.
/// Keeping occupancy at a tenth of the 1000-code space makes allocation
/// exhaustion practically impossible.
const LIVE_ROWS: u64 = 100;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn open_store(rt: &Runtime) -> (Arc<TextStore>, Arc<ManualClock>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(START));
    let config = StoreConfig::new(dir.path().join("bench.db").to_string_lossy());
    let store = rt
        .block_on(TextStore::connect_with_clock(config, clock.clone()))
        .unwrap();
    (Arc::new(store), clock, dir)
}

/// Benchmark create operations
fn bench_create(c: &mut Criterion) {
    let rt = runtime();
    let (store, clock, _dir) = open_store(&rt);

    let mut group = c.benchmark_group("create");
    group.throughput(Throughput::Elements(1));

    group.bench_function("create_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            // Recycle the code space before it fills up
            if i % LIVE_ROWS == 0 {
                clock.advance(RETENTION_SECS + 1);
            }
            black_box(rt.block_on(store.create("small text")).unwrap());
            i += 1;
        });
    });

    group.bench_function("create_large", |b| {
        let text = "x".repeat(64 * 1024); // 64KB text
        let mut i = 0u64;
        b.iter(|| {
            if i % LIVE_ROWS == 0 {
                clock.advance(RETENTION_SECS + 1);
            }
            black_box(rt.block_on(store.create(&text)).unwrap());
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark retrieve operations
fn bench_retrieve(c: &mut Criterion) {
    let rt = runtime();
    let (store, _clock, _dir) = open_store(&rt);

    // Pre-populate a tenth of the code space
    let codes: Vec<String> = (0..LIVE_ROWS)
        .map(|i| {
            rt.block_on(store.create(&format!("text:{}", i)))
                .unwrap()
                .to_string()
        })
        .collect();

    let mut group = c.benchmark_group("retrieve");
    group.throughput(Throughput::Elements(1));

    group.bench_function("retrieve_existing", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let code = &codes[i % codes.len()];
            black_box(rt.block_on(store.retrieve(code)).unwrap());
            i += 1;
        });
    });

    group.bench_function("retrieve_invalid", |b| {
        b.iter(|| {
            black_box(rt.block_on(store.retrieve("abc")).unwrap_err());
        });
    });

    group.finish();
}

/// Benchmark concurrent creates and reads
fn bench_concurrent(c: &mut Criterion) {
    let rt = runtime();
    let (store, clock, _dir) = open_store(&rt);

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("4_tasks_mixed", |b| {
        b.iter(|| {
            clock.advance(RETENTION_SECS + 1);
            rt.block_on(async {
                let handles: Vec<_> = (0..4)
                    .map(|t| {
                        let store = Arc::clone(&store);
                        tokio::spawn(async move {
                            for i in 0..25 {
                                let code = store.create(&format!("{}:{}", t, i)).await.unwrap();
                                store.retrieve(code.as_str()).await.unwrap();
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.await.unwrap();
                }
            });
        });
    });

    group.finish();
}

/// Benchmark the expiry sweep
fn bench_sweep(c: &mut Criterion) {
    let rt = runtime();
    let (store, clock, _dir) = open_store(&rt);

    let mut group = c.benchmark_group("sweep");

    group.bench_function("purge_100_expired", |b| {
        b.iter(|| {
            rt.block_on(async {
                for i in 0..LIVE_ROWS {
                    store.create(&format!("stale:{}", i)).await.unwrap();
                }
            });
            clock.advance(RETENTION_SECS + 1);
            black_box(rt.block_on(store.purge_expired()).unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_create,
    bench_retrieve,
    bench_concurrent,
    bench_sweep,
);

criterion_main!(benches);
