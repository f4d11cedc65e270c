//! # Courier Correlation Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | register → complete → take | < 2µs |
//! | Contended completion, 8 threads | no lost updates |
//! | Full call over the in-memory bus | < 1ms |

use courier_bus::{InMemoryEventBus, Params, ResponsePayload};
use courier_correlator::{BusTransport, Correlator, CorrelatorConfig, CorrelationTable, RequestId};
use courier_worker::{default_dispatcher, WorkerService};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

// ============================================================================
// Correlation table
// ============================================================================

fn bench_table_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation-table");

    let table = CorrelationTable::new();
    group.bench_function("register_complete_take", |b| {
        b.iter(|| {
            let id = RequestId::new();
            let completion = table.register(id).unwrap();
            table.complete(id, ResponsePayload::Result(json!(1)));
            drop(completion);
            black_box(table.take(id).unwrap())
        })
    });

    for pending in [100usize, 10_000] {
        let table = CorrelationTable::new();
        let _held: Vec<_> = (0..pending)
            .map(|_| table.register(RequestId::new()).unwrap())
            .collect();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("complete_with_backlog", pending),
            &table,
            |b, table| {
                b.iter(|| {
                    let id = RequestId::new();
                    let _completion = table.register(id).unwrap();
                    table.complete(id, ResponsePayload::Result(json!(null)));
                    black_box(table.take(id).unwrap())
                })
            },
        );
    }

    group.finish();
}

fn bench_contended_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation-table-contended");
    group.measurement_time(Duration::from_secs(5));

    let threads = 8;
    let per_thread = 1_000;
    group.throughput(Throughput::Elements((threads * per_thread) as u64));
    group.bench_function("parallel_lifecycles", |b| {
        b.iter(|| {
            let table = Arc::new(CorrelationTable::new());
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let table = Arc::clone(&table);
                    std::thread::spawn(move || {
                        for _ in 0..per_thread {
                            let id = RequestId::new();
                            let _completion = table.register(id).unwrap();
                            table.complete(id, ResponsePayload::Result(json!(true)));
                            table.take(id).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            black_box(table.is_empty())
        })
    });

    group.finish();
}

// ============================================================================
// Full round trip
// ============================================================================

fn bench_bus_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let (correlator, _shutdown) = runtime.block_on(async {
        let bus = Arc::new(InMemoryEventBus::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let worker = WorkerService::new(
            Arc::clone(&bus),
            Arc::new(default_dispatcher()),
            shutdown_rx.clone(),
        );
        tokio::spawn(worker.run());

        let transport = Arc::new(BusTransport::new(bus));
        let correlator =
            Correlator::new(&CorrelatorConfig::from_secs(5), transport.clone()).unwrap();
        tokio::spawn(
            transport
                .response_listener(Arc::clone(correlator.table()))
                .with_shutdown(shutdown_rx)
                .run(),
        );
        (correlator, shutdown)
    });

    let mut group = c.benchmark_group("round-trip");
    group.bench_function("gettestdata", |b| {
        b.to_async(&runtime).iter(|| async {
            black_box(
                correlator
                    .call("gettestdata", Params::new())
                    .await
                    .unwrap(),
            )
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_table_lifecycle,
    bench_contended_completion,
    bench_bus_round_trip
);
criterion_main!(benches);
