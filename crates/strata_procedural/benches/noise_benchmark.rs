//! Benchmark for density generation.
//!
//! Run with: cargo bench --package strata_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_core::VoxelField;
use strata_procedural::{fill_chunk, GradientNoise, NoiseTerrain, Seed};
use strata_shared::{ChunkCoord, CHUNK_VOXELS};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = GradientNoise::new(Seed::new(42));

    c.bench_function("gradient_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7), black_box(x * 0.3)))
        });
    });
}

fn benchmark_octaved(c: &mut Criterion) {
    let noise = GradientNoise::new(Seed::new(42));

    c.bench_function("gradient_noise_4_octaves", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.octaved(black_box(x), 0.5, black_box(x * 0.7), 4, 0.5, 2.0))
        });
    });
}

fn benchmark_fill_chunk(c: &mut Criterion) {
    let terrain = NoiseTerrain::with_seed(Seed::new(42));
    let mut field = VoxelField::new(CHUNK_VOXELS);

    let mut group = c.benchmark_group("fill_chunk");
    group.throughput(Throughput::Elements(field.len() as u64));
    group.bench_function("noise_terrain_32", |b| {
        b.iter(|| fill_chunk(&mut field, black_box(ChunkCoord::new(1, 0, -1)), &terrain));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_octaved,
    benchmark_fill_chunk
);
criterion_main!(benches);
