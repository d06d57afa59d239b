//! # Strata Terrain
//!
//! Deterministic density-field terrain for 16x16 voxel chunks, blended
//! smoothly across biome boundaries.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and same biomes always produce the same bytes
//! 2. **Built once**: Noise stacks and tables are created at construction and never mutated
//! 3. **Isolated failures**: A broken column becomes a flat sea-level column, never a broken chunk
//! 4. **Parallel**: Chunks are independent; workers only own scratch buffers
//!
//! ## Core Components
//!
//! - `OctaveNoiseGenerator`: Perlin / Simplex octave stacks with fractal sums
//! - `BiomeHeightTable`: Base height and scale per biome id
//! - `DensityFieldBuilder`: 5x5x33 density lattice per chunk
//! - `BiomeEnvironmentAnalyzer`: Neighbor biome weights per column
//! - `TerrainBlender`: Blended surface height and material layers
//! - `TerrainGenerator`: The per-chunk pipeline
//! - `ChunkWorkerPool`: Parallel generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_terrain::{BiomeId, ChunkCoord, TerrainGenerator, UniformBiomeGrid};
//!
//! let generator = TerrainGenerator::with_seed(12345)?;
//! let chunk = generator.generate(ChunkCoord::new(0, 0), &UniformBiomeGrid(BiomeId::PLAINS));
//!
//! let column = chunk.column(8, 8).unwrap();
//! assert!(column.is_uniform);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod blender;
pub mod cache;
pub mod chunk;
pub mod climate;
pub mod config;
pub mod density;
pub mod environment;
pub mod error;
pub mod generator;
pub mod material;
pub mod noise;
pub mod pool;
pub mod random;

pub use biome::{
    BiomeCategory, BiomeGrid, BiomeHeight, BiomeHeightTable, BiomeId, BiomeSource,
    ChunkBiomeView, FixedBiomeGrid, UniformBiomeGrid,
};
pub use blender::{BiomeProfile, TerrainBlender, TerrainColumnProperties};
pub use cache::{CacheStats, DensityCache};
pub use chunk::{Block, ChunkBlocks, ChunkCoord, ColumnStore, CHUNK_SIZE, COLUMNS_PER_CHUNK};
pub use climate::ClimateBiomeSource;
pub use config::{
    BiomeHeightOverride, BlendConfig, DensityConfig, GeneratorConfig, WorldGeometry, WorldType,
};
pub use density::{
    BiomeWindow, DensityFieldBuilder, DensityLattice, DensityScratch, ElevationWeightKernel,
};
pub use environment::{
    BiomeEnvironmentAnalyzer, BiomeEnvironmentSample, TransitionInfo, TransitionWidthTable,
};
pub use error::{ColumnError, ColumnResult, TerrainError, TerrainResult};
pub use generator::{
    ColumnReport, ColumnStatus, GeneratedChunk, GenerationReport, GenerationScratch,
    TerrainGenerator,
};
pub use material::{Material, MaterialLayers};
pub use noise::{
    OctaveNoiseGenerator, PerlinNoise, PerlinOctaveGenerator, SimplexNoise,
    SimplexOctaveGenerator, WorldOctaves,
};
pub use pool::ChunkWorkerPool;
pub use random::{ChaChaRandom, RandomSource, WorldSeed};
