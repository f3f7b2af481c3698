//! Delta encoding benchmarks.

use std::time::Duration;

use clientmetric_bench::fixtures::{populate, touch, Scale};
use clientmetric_core::{EncoderConfig, Registry};
use clientmetric_proto::RecordWriter;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Registry without the encode rate limit, so every iteration scans.
fn unthrottled_registry() -> Registry {
    Registry::with_config(EncoderConfig::new().with_min_encode_interval(Duration::ZERO))
}

fn bench_encode_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode/delta");

    for scale in [Scale::Small, Scale::Medium, Scale::Large] {
        for fraction in [0.0, 0.1, 1.0] {
            let registry = unthrottled_registry();
            let metrics = populate(&registry, scale);
            touch(&metrics, 1.0, 1);
            // First frame carries names for everything.
            drop(registry.encode_delta());

            let id = format!("{}@{}", scale.count(), fraction);
            let mut seed = 0;
            group.bench_function(BenchmarkId::from_parameter(id), |b| {
                b.iter(|| {
                    seed += 1;
                    touch(&metrics, fraction, seed);
                    black_box(registry.encode_delta().len());
                });
            });
        }
    }

    group.finish();
}

fn bench_first_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode/first_frame");

    for scale in [Scale::Small, Scale::Medium] {
        group.bench_with_input(
            BenchmarkId::from_parameter(scale.count()),
            &scale,
            |b, &scale| {
                b.iter_with_setup(
                    || {
                        let registry = unthrottled_registry();
                        let metrics = populate(&registry, scale);
                        touch(&metrics, 1.0, 1);
                        registry
                    },
                    |registry| black_box(registry.encode_delta().len()),
                );
            },
        );
    }

    group.finish();
}

fn bench_record_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode/record_writer");

    group.bench_function("name_and_value", |b| {
        let mut writer = RecordWriter::with_capacity(64);
        b.iter(|| {
            writer.clear();
            writer.write_name(black_box("bench_metric_total"));
            writer.write_value(black_box(1), black_box(123_456));
            black_box(writer.len());
        });
    });

    group.bench_function("increments", |b| {
        let mut writer = RecordWriter::with_capacity(4_096);
        b.iter(|| {
            writer.clear();
            for id in 1..=256 {
                writer.write_delta(id, black_box(-id * 7));
            }
            black_box(writer.len());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_delta,
    bench_first_frame,
    bench_record_writer
);
criterion_main!(benches);
