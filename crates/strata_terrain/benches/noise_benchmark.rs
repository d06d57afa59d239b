//! Benchmark for octave noise and lattice construction.
//!
//! Run with: cargo bench --package strata_terrain --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_terrain::{
    BiomeId, ChaChaRandom, ChunkCoord, DensityConfig, DensityScratch, PerlinNoise,
    PerlinOctaveGenerator, TerrainGenerator, UniformBiomeGrid, WorldOctaves, WorldSeed,
};

fn benchmark_single_sample(c: &mut Criterion) {
    let mut random = ChaChaRandom::new(WorldSeed::new(42));
    let noise = PerlinNoise::new(&mut random);

    c.bench_function("single_perlin_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.noise(black_box(x), black_box(x * 0.3), black_box(x * 0.7)))
        });
    });
}

fn benchmark_octave_sample(c: &mut Criterion) {
    let mut random = ChaChaRandom::new(WorldSeed::new(42));
    let stack = PerlinOctaveGenerator::new(&mut random, 16, 1, 1, 1);

    c.bench_function("perlin_16_octaves", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(stack.sample_3d(black_box(x), 0.0, black_box(x * 0.7), 0.5, 2.0, true))
        });
    });
}

fn benchmark_world_fields(c: &mut Criterion) {
    let octaves = WorldOctaves::new(WorldSeed::new(42), &DensityConfig::default());
    let mut out = Vec::new();

    let mut group = c.benchmark_group("fbm_fields");
    group.throughput(Throughput::Elements(octaves.roughness.grid_len() as u64));
    group.bench_function("roughness_5x33x5", |b| {
        let mut cx = 0.0f64;
        b.iter(|| {
            cx += 4.0;
            octaves
                .roughness
                .fractal_brownian_motion_into(cx, 0.0, 0.0, 0.5, 2.0, &mut out);
            black_box(out.len())
        });
    });
    group.finish();
}

fn benchmark_density_lattice(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42).expect("default config");
    let grid = UniformBiomeGrid(BiomeId::PLAINS);
    let mut scratch = DensityScratch::default();

    c.bench_function("density_lattice_build", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(
                generator
                    .density_builder()
                    .build(ChunkCoord::new(coord, -coord), &grid, &mut scratch),
            )
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_octave_sample,
    benchmark_world_fields,
    benchmark_density_lattice
);
criterion_main!(benches);
