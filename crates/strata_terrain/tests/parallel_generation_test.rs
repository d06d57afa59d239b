//! # Parallel Generation Tests
//!
//! The worker pool must produce exactly what a single thread produces.

use std::sync::Arc;
use std::time::{Duration, Instant};

use strata_terrain::{
    BiomeSource, ChunkCoord, ChunkWorkerPool, ClimateBiomeSource, GenerationScratch,
    GeneratorConfig, TerrainGenerator, WorldSeed,
};

fn coords(radius: i32) -> Vec<ChunkCoord> {
    let mut coords = Vec::new();
    for z in -radius..=radius {
        for x in -radius..=radius {
            coords.push(ChunkCoord::new(x * 7, z * 5));
        }
    }
    coords
}

/// Test: Pool output is byte-identical to sequential output.
#[test]
fn test_pool_matches_sequential() {
    let generator = Arc::new(TerrainGenerator::with_seed(2024).expect("valid config"));
    let source: Arc<dyn BiomeSource> = Arc::new(ClimateBiomeSource::new(WorldSeed::new(2024)));
    let coords = coords(2);

    let start = Instant::now();
    let mut scratch = GenerationScratch::new();
    let mut sequential: Vec<_> = coords
        .iter()
        .map(|&coord| generator.generate_from_source(coord, source.as_ref(), &mut scratch))
        .collect();
    sequential.sort_by_key(|chunk| chunk.coord());
    let sequential_time = start.elapsed();

    let pool = ChunkWorkerPool::new(Arc::clone(&generator), Arc::clone(&source), 4)
        .expect("workers start");
    let start = Instant::now();
    let parallel = pool.generate_all(&coords).expect("all chunks return");
    let parallel_time = start.elapsed();

    println!(
        "{} chunks: sequential {:?}, parallel {:?}",
        coords.len(),
        sequential_time,
        parallel_time
    );

    assert_eq!(parallel.len(), sequential.len());
    for (a, b) in parallel.iter().zip(&sequential) {
        assert_eq!(a.coord(), b.coord());
        assert_eq!(a.blocks.fingerprint(), b.blocks.fingerprint());
        assert_eq!(a.blocks, b.blocks);
        assert_eq!(a.report.columns, b.report.columns);
    }
}

/// Test: Chunks can be streamed one at a time.
#[test]
fn test_pool_streaming() {
    let config = GeneratorConfig {
        workers: 2,
        lattice_cache_capacity: 16,
        ..GeneratorConfig::with_seed(5)
    };
    let generator = Arc::new(TerrainGenerator::new(config).expect("valid config"));
    let source: Arc<dyn BiomeSource> = Arc::new(ClimateBiomeSource::new(WorldSeed::new(5)));
    let mut pool = ChunkWorkerPool::from_config(generator, source).expect("workers start");
    assert_eq!(pool.worker_count(), 2);

    for coord in coords(1) {
        pool.submit(coord).expect("pool open");
    }
    let mut received = 0;
    while let Some(chunk) = pool.recv_timeout(Duration::from_secs(30)) {
        assert_eq!(chunk.report.columns.len(), 256);
        received += 1;
    }
    assert_eq!(received, 9);
    assert_eq!(pool.pending(), 0);

    pool.shutdown();
    assert!(pool.submit(ChunkCoord::new(0, 0)).is_err());
}
