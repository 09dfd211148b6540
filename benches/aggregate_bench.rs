use chrono::Local;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dtop::cluster::aggregator::build_snapshot;
use dtop::cluster::telemetry::{RawWorkers, parse_identity};
use dtop::format::{format_cpu_cell, format_memory_cell};
use serde_json::json;
use std::hint::black_box;

fn make_workers(n: usize) -> RawWorkers {
    (0..n)
        .map(|i| {
            (
                format!("tcp://10.{}.{}.{}:4000", i / 65_536, (i / 256) % 256, i % 256),
                json!({
                    "memory_limit": 8_000_000_000u64,
                    "metrics": {
                        "memory": (i as u64 % 97) * 80_000_000,
                        "cpu": (i % 160) as f64,
                        "num_fds": 30 + i % 50,
                        "executing": i % 4,
                        "in_memory": i % 300,
                        "ready": i % 7,
                        "in_flight": i % 3
                    }
                }),
            )
        })
        .collect()
}

fn bench_build_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_snapshot");
    for n in [100, 1_000, 5_000] {
        let raw = make_workers(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &raw, |b, raw| {
            b.iter(|| build_snapshot(black_box(raw), Local::now()));
        });
    }
    group.finish();
}

fn bench_parse_identity(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_identity");
    for n in [100, 1_000, 5_000] {
        let body = serde_json::to_vec(&json!({ "workers": make_workers(n) }))
            .unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &body, |b, body| {
            b.iter(|| parse_identity(black_box(body)));
        });
    }
    group.finish();
}

fn bench_format_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_rows");
    for n in [100, 1_000, 5_000] {
        let snapshot = build_snapshot(&make_workers(n), Local::now());
        group.bench_with_input(BenchmarkId::from_parameter(n), &snapshot, |b, snapshot| {
            b.iter(|| {
                snapshot
                    .workers
                    .iter()
                    .map(|w| (format_cpu_cell(w), format_memory_cell(w)))
                    .collect::<Vec<_>>()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build_snapshot,
    bench_parse_identity,
    bench_format_rows
);
criterion_main!(benches);
