//! Batch engine throughput benchmarks
//!
//! Measures end-to-end `conduct` cost (fan-out, channel, collection)
//! against a sequential baseline, for specialized and keyed trials.
//!
//! Toyota Way: Measure before optimizing (Genchi Genbutsu)
//!
//! Run with: cargo bench --bench conduct_throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::sync::Arc;
use trial_conductor::trial::{KeyedTrial, TrialRegistry};
use trial_conductor::{Engine, EngineConfig, Trial};

const SMALL_BATCH: u64 = 1_000;
const LARGE_BATCH: u64 = 100_000;

/// CPU-bound trial: a short integer hash loop
struct Spin(u64);

impl Trial for Spin {
    type Output = u64;

    fn conduct(&self) -> trial_conductor::Result<u64> {
        let mut x = self.0;
        for _ in 0..256 {
            x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        }
        Ok(x)
    }
}

fn quiet_engine(workers: usize) -> Engine {
    Engine::new(
        EngineConfig::default()
            .with_workers(workers)
            .with_progress_steps(0),
    )
    .expect("pool")
}

/// Benchmark specialized trials across pool sizes
fn bench_specialized(c: &mut Criterion) {
    let mut group = c.benchmark_group("conduct_specialized");
    let runtime = tokio::runtime::Runtime::new().expect("runtime");

    for size in [SMALL_BATCH, LARGE_BATCH] {
        for workers in [1, 4] {
            let engine = quiet_engine(workers);
            let engine = &engine;
            group.bench_with_input(
                BenchmarkId::new(format!("workers_{workers}"), size),
                &size,
                |b, &size| {
                    b.to_async(&runtime).iter(move || async move {
                        let batch: Vec<Spin> = (0..size).map(Spin).collect();
                        black_box(engine.conduct(batch).await.expect("conduct"))
                    });
                },
            );
        }

        // Sequential baseline for comparison
        group.bench_with_input(BenchmarkId::new("sequential_baseline", size), &size, |b, &size| {
            b.iter(|| {
                let results: Vec<u64> = (0..size)
                    .map(|i| Spin(black_box(i)).conduct().expect("conduct"))
                    .collect();
                black_box(results)
            });
        });
    }

    group.finish();
}

/// Benchmark keyed trials (registry dispatch overhead)
fn bench_keyed(c: &mut Criterion) {
    let mut group = c.benchmark_group("conduct_keyed");
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let engine = quiet_engine(4);

    let registry = Arc::new(TrialRegistry::new());
    registry
        .register("spin", |t| {
            let seed = t.u64("seed")?;
            Ok(i64::try_from(Spin(seed).conduct()? >> 1).unwrap_or_default())
        })
        .expect("register");

    let (engine, registry) = (&engine, &registry);
    group.bench_function(BenchmarkId::new("spin", SMALL_BATCH), |b| {
        b.to_async(&runtime).iter(move || async move {
            let batch: Vec<KeyedTrial> = (0..SMALL_BATCH)
                .map(|seed| KeyedTrial::new(registry, "spin", json!({ "seed": seed })).expect("trial"))
                .collect();
            black_box(engine.conduct(batch).await.expect("conduct"))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_specialized, bench_keyed);
criterion_main!(benches);
