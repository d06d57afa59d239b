//! # Terrain Generator
//!
//! Owns everything that is built once per world (noise stacks, biome height
//! table, kernel, transition widths) and runs the per-chunk pipeline:
//!
//! ```text
//! biome grid ──► DensityFieldBuilder ──► DensityLattice ─┐
//!      │                                                 │ density surface
//!      └──► BiomeEnvironmentAnalyzer ──► TerrainBlender ─┴──► ColumnStore
//!                                          ▲
//!                       surface noise ─────┘
//! ```
//!
//! ## Failure isolation
//!
//! Each column is generated on its own. A column that fails (bad height,
//! store rejection) is logged and rewritten as a flat sea-level column of
//! its center biome. If that also fails, the column is reported as
//! [`ColumnStatus::Failed`] and the rest of the chunk carries on.
//!
//! ## Threading
//!
//! The generator is read-only after construction (apart from the optional
//! lattice cache, which locks internally), so one `Arc<TerrainGenerator>`
//! serves any number of threads. Mutable buffers live in
//! [`GenerationScratch`], one per thread.

use std::sync::Arc;

use crate::biome::{BiomeGrid, BiomeHeightTable, BiomeId, BiomeSource, ChunkBiomeView};
use crate::blender::{TerrainBlender, TerrainColumnProperties};
use crate::cache::DensityCache;
use crate::chunk::{ChunkBlocks, ChunkCoord, ColumnStore, CHUNK_SIZE, COLUMNS_PER_CHUNK};
use crate::config::{GeneratorConfig, WorldGeometry};
use crate::density::{
    validate_height_table, DensityFieldBuilder, DensityLattice, DensityScratch,
    ElevationWeightKernel,
};
use crate::environment::{BiomeEnvironmentAnalyzer, TransitionWidthTable};
use crate::error::{ColumnResult, TerrainResult};
use crate::noise::WorldOctaves;
use crate::random::WorldSeed;

/// Per-thread buffers reused across chunks.
#[derive(Clone, Debug, Default)]
pub struct GenerationScratch {
    /// Noise fields for the density lattice.
    pub density: DensityScratch,
    /// Normalized surface noise, one value per column.
    pub surface: Vec<f64>,
}

impl GenerationScratch {
    /// Creates empty buffers (they grow on first use).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// How a column ended up in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnStatus {
    /// Single biome, no blending needed.
    Uniform,
    /// Blended with neighboring biomes.
    Blended,
    /// Generation failed; a flat fallback column was written.
    Fallback,
    /// Even the fallback column could not be written.
    Failed,
}

/// What happened to one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnReport {
    /// Column X within the chunk.
    pub local_x: usize,
    /// Column Z within the chunk.
    pub local_z: usize,
    /// Biome of the column.
    pub center_biome: BiomeId,
    /// Surface noise used for the column.
    pub surface_noise: f64,
    /// Whether the neighborhood held a single biome.
    pub is_uniform: bool,
    /// Properties that were written (fallback ones if generation failed).
    pub properties: TerrainColumnProperties,
    /// Outcome.
    pub status: ColumnStatus,
}

/// Per-column outcome of one chunk written into some store.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// Chunk that was generated.
    pub coord: ChunkCoord,
    /// Reports in `z`-major order (`index = z * 16 + x`).
    pub columns: Vec<ColumnReport>,
    /// Density lattice of the chunk.
    pub lattice: Arc<DensityLattice>,
    /// Vertical bounds the chunk was generated with.
    pub geometry: WorldGeometry,
}

impl GenerationReport {
    /// Report of column `(local_x, local_z)`.
    #[must_use]
    pub fn column(&self, local_x: usize, local_z: usize) -> Option<&ColumnReport> {
        if local_x >= CHUNK_SIZE || local_z >= CHUNK_SIZE {
            return None;
        }
        self.columns.get(local_z * CHUNK_SIZE + local_x)
    }

    /// Highest solid level of the interpolated density field at a column.
    ///
    /// Scans the lattice on every call; nothing is precomputed during
    /// generation.
    #[must_use]
    pub fn density_surface(&self, local_x: usize, local_z: usize) -> Option<i32> {
        if local_x >= CHUNK_SIZE || local_z >= CHUNK_SIZE {
            return None;
        }
        self.lattice.surface_level(local_x, local_z, &self.geometry)
    }

    /// Number of columns with the given status.
    #[must_use]
    pub fn count(&self, status: ColumnStatus) -> usize {
        self.columns.iter().filter(|c| c.status == status).count()
    }
}

/// A chunk generated into in-memory storage.
#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    /// Block data.
    pub blocks: ChunkBlocks,
    /// Per-column outcome.
    pub report: GenerationReport,
}

impl GeneratedChunk {
    /// Chunk position.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.blocks.coord
    }

    /// Report of column `(local_x, local_z)`.
    #[must_use]
    pub fn column(&self, local_x: usize, local_z: usize) -> Option<&ColumnReport> {
        self.report.column(local_x, local_z)
    }
}

/// Chunk terrain generator.
#[derive(Debug)]
pub struct TerrainGenerator {
    config: GeneratorConfig,
    octaves: WorldOctaves,
    heights: BiomeHeightTable,
    kernel: ElevationWeightKernel,
    analyzer: BiomeEnvironmentAnalyzer,
    blender: TerrainBlender,
    cache: DensityCache,
}

impl TerrainGenerator {
    /// Validates the configuration and builds all per-world state.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the resulting biome height
    /// table is invalid.
    pub fn new(config: GeneratorConfig) -> TerrainResult<Self> {
        config.validate()?;

        let heights = BiomeHeightTable::with_overrides(&config.biome_heights)?;
        validate_height_table(&heights, &config.density, config.world_type)?;

        let octaves = WorldOctaves::new(WorldSeed::new(config.seed), &config.density);
        let analyzer = BiomeEnvironmentAnalyzer::new(&config.blend, TransitionWidthTable::new());
        let blender = TerrainBlender::new(config.blend.clone(), config.geometry);
        let cache = DensityCache::new(config.lattice_cache_capacity);

        tracing::info!(
            "Terrain generator ready: seed {}, {:?}, Y [{}, {}), sea level {}, {} biome overrides",
            config.seed,
            config.world_type,
            config.geometry.min_y,
            config.geometry.max_y,
            config.geometry.sea_level,
            config.biome_heights.len()
        );

        Ok(Self {
            config,
            octaves,
            heights,
            kernel: ElevationWeightKernel::new(),
            analyzer,
            blender,
            cache,
        })
    }

    /// Generator with default settings for a seed.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in defaults; kept fallible for symmetry
    /// with [`Self::new`].
    pub fn with_seed(seed: u64) -> TerrainResult<Self> {
        Self::new(GeneratorConfig::with_seed(seed))
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Vertical bounds.
    #[must_use]
    pub const fn geometry(&self) -> &WorldGeometry {
        &self.config.geometry
    }

    /// World noise stacks.
    #[must_use]
    pub const fn octaves(&self) -> &WorldOctaves {
        &self.octaves
    }

    /// Biome height table (with overrides applied).
    #[must_use]
    pub const fn height_table(&self) -> &BiomeHeightTable {
        &self.heights
    }

    /// Neighborhood analyzer.
    #[must_use]
    pub const fn analyzer(&self) -> &BiomeEnvironmentAnalyzer {
        &self.analyzer
    }

    /// Column blender.
    #[must_use]
    pub const fn blender(&self) -> &TerrainBlender {
        &self.blender
    }

    /// Lattice cache.
    #[must_use]
    pub const fn cache(&self) -> &DensityCache {
        &self.cache
    }

    /// Lattice builder over this generator's shared state.
    #[must_use]
    pub const fn density_builder(&self) -> DensityFieldBuilder<'_> {
        DensityFieldBuilder::new(
            &self.octaves,
            &self.heights,
            &self.kernel,
            &self.config.density,
            self.config.world_type,
        )
    }

    /// Density lattice of a chunk, from the cache when enabled.
    pub fn density_lattice(
        &self,
        coord: ChunkCoord,
        grid: &dyn BiomeGrid,
        scratch: &mut DensityScratch,
    ) -> Arc<DensityLattice> {
        self.cache
            .get_or_insert_with(coord, || self.density_builder().build(coord, grid, scratch))
    }

    /// Fills `out` with the normalized surface noise of every column,
    /// indexed `x * 16 + z`.
    pub fn surface_noise_field(&self, coord: ChunkCoord, out: &mut Vec<f64>) {
        let surface = &self.octaves.surface;
        surface.fractal_brownian_motion_into(
            f64::from(coord.world_x()),
            0.0,
            f64::from(coord.world_z()),
            0.5,
            0.5,
            out,
        );
        let norm = surface.amplitude_sum(0.5);
        if norm > 0.0 {
            for value in out.iter_mut() {
                *value /= norm;
            }
        }
    }

    /// Normalized surface noise at one block column.
    #[must_use]
    pub fn surface_noise(&self, world_x: i32, world_z: i32) -> f64 {
        self.octaves
            .surface
            .sample_3d(f64::from(world_x), 0.0, f64::from(world_z), 0.5, 0.5, true)
    }

    /// Analyzes and blends one column without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is outside the chunk or its height is
    /// not finite.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn column_properties(
        &self,
        grid: &dyn BiomeGrid,
        local_x: usize,
        local_z: usize,
        noise: f64,
    ) -> ColumnResult<TerrainColumnProperties> {
        let sample = self
            .analyzer
            .analyze(grid, local_x as i32, local_z as i32);
        self.blender.blend(&sample, noise)
    }

    /// Generates one chunk into any column store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn generate_into<S: ColumnStore + ?Sized>(
        &self,
        coord: ChunkCoord,
        grid: &dyn BiomeGrid,
        store: &mut S,
        scratch: &mut GenerationScratch,
    ) -> GenerationReport {
        if !coord.is_in_range() {
            tracing::warn!(
                "Chunk ({}, {}) is beyond +/-{}; block positions saturate",
                coord.x,
                coord.z,
                ChunkCoord::LIMIT
            );
        }
        let lattice = self.density_lattice(coord, grid, &mut scratch.density);
        self.surface_noise_field(coord, &mut scratch.surface);

        let geometry = self.geometry();
        let mut columns = Vec::with_capacity(COLUMNS_PER_CHUNK);

        for local_z in 0..CHUNK_SIZE {
            for local_x in 0..CHUNK_SIZE {
                let noise = scratch
                    .surface
                    .get(self.octaves.surface.grid_index(local_x, 0, local_z))
                    .copied()
                    .unwrap_or(0.0);
                let sample = self
                    .analyzer
                    .analyze(grid, local_x as i32, local_z as i32);

                let written = self.blender.blend(&sample, noise).and_then(|properties| {
                    self.blender
                        .materialize(store, local_x, local_z, &properties)
                        .map(|()| properties)
                });

                let (properties, status) = match written {
                    Ok(properties) if sample.is_uniform => (properties, ColumnStatus::Uniform),
                    Ok(properties) => (properties, ColumnStatus::Blended),
                    Err(e) => {
                        tracing::warn!(
                            "Column ({}, {}) of chunk ({}, {}) failed: {}, writing fallback",
                            local_x,
                            local_z,
                            coord.x,
                            coord.z,
                            e
                        );
                        let fallback = self.blender.fallback_properties(sample.center_biome);
                        match self.blender.materialize(store, local_x, local_z, &fallback) {
                            Ok(()) => (fallback, ColumnStatus::Fallback),
                            Err(e) => {
                                tracing::error!(
                                    "Fallback for column ({}, {}) of chunk ({}, {}) failed: {}",
                                    local_x,
                                    local_z,
                                    coord.x,
                                    coord.z,
                                    e
                                );
                                (fallback, ColumnStatus::Failed)
                            }
                        }
                    }
                };

                columns.push(ColumnReport {
                    local_x,
                    local_z,
                    center_biome: sample.center_biome,
                    surface_noise: noise,
                    is_uniform: sample.is_uniform,
                    properties,
                    status,
                });
            }
        }

        let report = GenerationReport {
            coord,
            columns,
            lattice,
            geometry: *geometry,
        };
        tracing::debug!(
            "Generated chunk ({}, {}): {} blended, {} fallback, {} failed columns",
            coord.x,
            coord.z,
            report.count(ColumnStatus::Blended),
            report.count(ColumnStatus::Fallback),
            report.count(ColumnStatus::Failed)
        );
        report
    }

    /// Generates one chunk into fresh in-memory storage.
    #[must_use]
    pub fn generate_with_scratch(
        &self,
        coord: ChunkCoord,
        grid: &dyn BiomeGrid,
        scratch: &mut GenerationScratch,
    ) -> GeneratedChunk {
        let mut blocks = ChunkBlocks::new(coord, self.config.geometry);
        let report = self.generate_into(coord, grid, &mut blocks, scratch);
        GeneratedChunk { blocks, report }
    }

    /// Generates one chunk with throwaway buffers.
    #[must_use]
    pub fn generate(&self, coord: ChunkCoord, grid: &dyn BiomeGrid) -> GeneratedChunk {
        self.generate_with_scratch(coord, grid, &mut GenerationScratch::new())
    }

    /// Generates one chunk, reading biomes from a world-space source.
    #[must_use]
    pub fn generate_from_source(
        &self,
        coord: ChunkCoord,
        source: &dyn BiomeSource,
        scratch: &mut GenerationScratch,
    ) -> GeneratedChunk {
        let view = ChunkBiomeView::new(source, coord);
        self.generate_with_scratch(coord, &view, scratch)
    }
}
