//! Benchmark for full chunk generation.
//!
//! Run with: cargo bench --package strata_terrain --bench chunk_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_terrain::{
    BiomeSource, ChunkCoord, ChunkWorkerPool, ClimateBiomeSource, GenerationScratch,
    TerrainGenerator, WorldSeed,
};

fn benchmark_single_chunk(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42).expect("default config");
    let source = ClimateBiomeSource::new(WorldSeed::new(42));
    let mut scratch = GenerationScratch::new();

    c.bench_function("single_chunk_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(generator.generate_from_source(
                ChunkCoord::new(coord, coord / 2),
                &source,
                &mut scratch,
            ))
        });
    });
}

fn benchmark_chunk_grid(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42).expect("default config");
    let source = ClimateBiomeSource::new(WorldSeed::new(42));
    let mut scratch = GenerationScratch::new();

    let mut group = c.benchmark_group("chunk_grid");
    group.sample_size(10);

    // 8x8 chunks = 128x128 blocks
    group.throughput(Throughput::Elements(8 * 8));
    group.bench_function("8x8_chunks_sequential", |b| {
        b.iter(|| {
            for z in 0..8 {
                for x in 0..8 {
                    black_box(generator.generate_from_source(
                        ChunkCoord::new(x, z),
                        &source,
                        &mut scratch,
                    ));
                }
            }
        });
    });

    let generator = Arc::new(TerrainGenerator::with_seed(42).expect("default config"));
    let source: Arc<dyn BiomeSource> = Arc::new(ClimateBiomeSource::new(WorldSeed::new(42)));
    let pool = ChunkWorkerPool::new(generator, source, 4).expect("workers start");
    let coords: Vec<_> = (0..64).map(|i| ChunkCoord::new(i % 8, i / 8)).collect();

    group.bench_function("8x8_chunks_pool_4_workers", |b| {
        b.iter(|| black_box(pool.generate_all(&coords).expect("pool open")));
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_chunk, benchmark_chunk_grid);
criterion_main!(benches);
