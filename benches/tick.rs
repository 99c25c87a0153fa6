//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use petalfall::{FieldConfig, LayerConfig, ParticleField, PetalInstance, Vec2, Viewport};

const FRAME: f32 = 1.0 / 60.0;

fn field_with(count: u32) -> ParticleField {
    let config = FieldConfig::default()
        .with_seed(7)
        .with_back(LayerConfig::back().with_count(count, count / 2))
        .with_front(LayerConfig::front().with_count(count, count / 2));
    ParticleField::new(&config, Viewport::new(16.5, 9.3), Some(1.5)).unwrap()
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_tick");

    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut field = field_with(count);
            let mut elapsed = 0.0;
            b.iter(|| {
                elapsed += FRAME;
                field.tick(black_box(elapsed), black_box(FRAME), Vec2::new(0.4, -0.2));
            })
        });
    }

    group.finish();
}

fn bench_write_instances(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_instances");

    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let field = field_with(count);
            let mut instances: Vec<PetalInstance> = Vec::new();
            b.iter(|| {
                field.write_instances(&mut instances);
                black_box(instances.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_write_instances);
criterion_main!(benches);
