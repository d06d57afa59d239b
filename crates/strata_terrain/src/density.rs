//! # Density Field
//!
//! Builds the coarse 5x5x33 density lattice of a chunk and expands it back
//! to block resolution.
//!
//! ## Design
//!
//! The lattice has one column per 4x4 block cell corner (x/z in `0..=16`
//! step 4) and one level per `(max_y - min_y) / 32` blocks. Each value is:
//!
//! ```text
//! density = select(roughness, roughness_2 by detail) - height_gradient(k)
//! ```
//!
//! where the height gradient comes from the kernel-weighted average of the
//! surrounding biomes' height entries plus a 2D height noise. Positive
//! density is solid. The top three levels are pulled towards -10 so the
//! world never reaches its ceiling.
//!
//! ```text
//!   biome grid (10x10 window) ──┐
//!   height noise (5x1x5) ───────┤
//!   roughness x2 (5x33x5) ──────┼──► DensityLattice (825 values)
//!   detail (5x33x5) ────────────┘
//! ```

use crate::biome::{BiomeGrid, BiomeHeight, BiomeHeightTable, BiomeId};
use crate::chunk::ChunkCoord;
use crate::config::{DensityConfig, WorldGeometry, WorldType};
use crate::error::{TerrainError, TerrainResult};
use crate::noise::{lerp, WorldOctaves};

pub use crate::noise::world_octaves::{LATTICE_HEIGHT, LATTICE_WIDTH};

/// Values in one lattice.
pub const LATTICE_LEN: usize = LATTICE_WIDTH * LATTICE_WIDTH * LATTICE_HEIGHT;

/// Side of the biome window around the lattice (lattice + 2 cells per side).
pub const WINDOW_SIZE: usize = LATTICE_WIDTH + 5;

/// Kernel side length.
const KERNEL_SIZE: usize = 5;

/// 5x5 weights favoring nearby biomes: `10 / sqrt(dx^2 + dz^2 + 0.2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationWeightKernel {
    weights: [[f64; KERNEL_SIZE]; KERNEL_SIZE],
}

impl ElevationWeightKernel {
    /// Computes the kernel.
    #[must_use]
    pub fn new() -> Self {
        let mut weights = [[0.0; KERNEL_SIZE]; KERNEL_SIZE];
        for (x, row) in (-2i32..=2).zip(weights.iter_mut()) {
            for (z, weight) in (-2i32..=2).zip(row.iter_mut()) {
                *weight = 10.0 / (f64::from(x * x + z * z) + 0.2).sqrt();
            }
        }
        Self { weights }
    }

    /// Weight at offset `(m, n)` (0..5 each; (2, 2) is the center).
    #[inline]
    #[must_use]
    pub fn weight(&self, m: usize, n: usize) -> f64 {
        self.weights[m][n]
    }
}

impl Default for ElevationWeightKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse density values of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityLattice {
    values: Vec<f64>,
}

impl DensityLattice {
    /// All-zero lattice.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: vec![0.0; LATTICE_LEN],
        }
    }

    /// Flat index of `(i, j, k)`: x, z, level.
    #[inline]
    #[must_use]
    pub const fn index(i: usize, j: usize, k: usize) -> usize {
        (k * LATTICE_WIDTH + j) * LATTICE_WIDTH + i
    }

    /// Value at lattice point `(i, j, k)`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[Self::index(i, j, k)]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, k: usize, value: f64) {
        self.values[Self::index(i, j, k)] = value;
    }

    /// All 825 values in index order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Trilinearly interpolated density at a block position.
    ///
    /// `local_x`/`local_z` are chunk-local (`0..=16`); `y` is clamped into
    /// the world's range.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn density_at(&self, local_x: usize, y: i32, local_z: usize, geometry: &WorldGeometry) -> f64 {
        let last_cell = LATTICE_WIDTH - 2;
        let fx = local_x.min(16) as f64 / 4.0;
        let fz = local_z.min(16) as f64 / 4.0;
        let i0 = (fx as usize).min(last_cell);
        let j0 = (fz as usize).min(last_cell);
        let tx = fx - i0 as f64;
        let tz = fz - j0 as f64;

        let top_cell = LATTICE_HEIGHT - 2;
        let cell_height = f64::from(geometry.cell_height().max(1));
        let level = f64::from(geometry.clamp_level(y) - geometry.min_y);
        let fy = (level / cell_height).clamp(0.0, top_cell as f64 + 1.0);
        let k0 = (fy as usize).min(top_cell);
        let ty = fy - k0 as f64;

        let plane = |k: usize| {
            lerp(
                tz,
                lerp(tx, self.get(i0, j0, k), self.get(i0 + 1, j0, k)),
                lerp(tx, self.get(i0, j0 + 1, k), self.get(i0 + 1, j0 + 1, k)),
            )
        };
        lerp(ty, plane(k0), plane(k0 + 1))
    }

    /// Interpolated densities of one column, from `min_y` upwards.
    #[must_use]
    pub fn column_profile(&self, local_x: usize, local_z: usize, geometry: &WorldGeometry) -> Vec<f64> {
        (geometry.min_y..geometry.max_y)
            .map(|y| self.density_at(local_x, y, local_z, geometry))
            .collect()
    }

    /// Highest level whose interpolated density is solid (> 0).
    #[must_use]
    pub fn surface_level(&self, local_x: usize, local_z: usize, geometry: &WorldGeometry) -> Option<i32> {
        (geometry.min_y..geometry.max_y)
            .rev()
            .find(|&y| self.density_at(local_x, y, local_z, geometry) > 0.0)
    }
}

impl Default for DensityLattice {
    fn default() -> Self {
        Self::new()
    }
}

/// Biome ids around a chunk at quarter resolution.
///
/// Cell `(a, b)` holds the biome of chunk-local block `((a - 2) * 4, (b - 2) * 4)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeWindow {
    cells: [[Option<BiomeId>; WINDOW_SIZE]; WINDOW_SIZE],
}

impl BiomeWindow {
    /// Samples the window from a chunk's biome grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_grid(grid: &dyn BiomeGrid) -> Self {
        let mut cells = [[None; WINDOW_SIZE]; WINDOW_SIZE];
        for (a, row) in cells.iter_mut().enumerate() {
            for (b, cell) in row.iter_mut().enumerate() {
                let local_x = (a as i32 - 2) * 4;
                let local_z = (b as i32 - 2) * 4;
                *cell = grid.biome(local_x, local_z);
            }
        }
        Self { cells }
    }

    /// Biome at window cell `(a, b)`.
    #[inline]
    #[must_use]
    pub fn get(&self, a: usize, b: usize) -> Option<BiomeId> {
        self.cells[a][b]
    }
}

/// Kernel-weighted biome parameters of one lattice column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedHeight {
    /// Normalized height scale (`* 0.9 + 0.1` applied).
    pub scale: f64,
    /// Normalized base height (`(x * 4 - 1) / 8` applied).
    pub base: f64,
    /// Sum of all neighbor weights.
    pub total_weight: f64,
}

/// Reusable noise-field buffers for lattice construction.
#[derive(Clone, Debug, Default)]
pub struct DensityScratch {
    height: Vec<f64>,
    roughness: Vec<f64>,
    roughness_2: Vec<f64>,
    detail: Vec<f64>,
}

/// Applies the configured offset/weight (and amplification) to a table entry.
#[inline]
fn configured_height(entry: BiomeHeight, config: &DensityConfig, world_type: WorldType) -> BiomeHeight {
    let adjusted = BiomeHeight::new(
        config.biome_height_offset + entry.height * config.biome_height_weight,
        config.biome_scale_offset + entry.scale * config.biome_scale_weight,
    );
    match world_type {
        WorldType::Amplified => adjusted.amplified(),
        WorldType::Normal => adjusted,
    }
}

/// Checks that every biome keeps a positive elevation weight and a
/// non-negative scale once the density configuration is applied.
///
/// # Errors
///
/// Returns the first offending biome.
pub fn validate_height_table(
    table: &BiomeHeightTable,
    config: &DensityConfig,
    world_type: WorldType,
) -> TerrainResult<()> {
    let entries = (0..=u8::MAX)
        .map(|id| (id, table.get(BiomeId(id))))
        .chain(std::iter::once((0, table.default_entry())));
    for (id, entry) in entries {
        let adjusted = configured_height(entry, config, world_type);
        if !(adjusted.height + 2.0 > 0.0) || !(adjusted.scale >= 0.0) {
            return Err(TerrainError::InvalidBiomeHeight {
                biome: id,
                height: adjusted.height,
                scale: adjusted.scale,
            });
        }
    }
    Ok(())
}

/// Produces [`DensityLattice`]s from the world's noise stacks.
#[derive(Clone, Copy)]
pub struct DensityFieldBuilder<'a> {
    octaves: &'a WorldOctaves,
    heights: &'a BiomeHeightTable,
    kernel: &'a ElevationWeightKernel,
    config: &'a DensityConfig,
    world_type: WorldType,
}

impl<'a> DensityFieldBuilder<'a> {
    /// Lowest level that is pulled towards the ceiling value.
    const TOP_SLIDE_START: usize = 29;
    /// Density the top level is forced to.
    const TOP_SLIDE_TARGET: f64 = -10.0;

    /// Creates a builder over shared, read-only inputs.
    #[must_use]
    pub const fn new(
        octaves: &'a WorldOctaves,
        heights: &'a BiomeHeightTable,
        kernel: &'a ElevationWeightKernel,
        config: &'a DensityConfig,
        world_type: WorldType,
    ) -> Self {
        Self {
            octaves,
            heights,
            kernel,
            config,
            world_type,
        }
    }

    /// Builds the lattice for one chunk.
    #[must_use]
    pub fn build(&self, coord: ChunkCoord, grid: &dyn BiomeGrid, scratch: &mut DensityScratch) -> DensityLattice {
        let window = BiomeWindow::from_grid(grid);
        self.build_from_window(coord, &window, scratch)
    }

    /// Builds the lattice for one chunk from a pre-sampled biome window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build_from_window(
        &self,
        coord: ChunkCoord,
        window: &BiomeWindow,
        scratch: &mut DensityScratch,
    ) -> DensityLattice {
        let x = f64::from(coord.x) * 4.0;
        let z = f64::from(coord.z) * 4.0;

        let octaves = self.octaves;
        octaves
            .height
            .fractal_brownian_motion_into(x, 0.0, z, 0.5, 2.0, &mut scratch.height);
        octaves
            .roughness
            .fractal_brownian_motion_into(x, 0.0, z, 0.5, 2.0, &mut scratch.roughness);
        octaves
            .roughness_2
            .fractal_brownian_motion_into(x, 0.0, z, 0.5, 2.0, &mut scratch.roughness_2);
        octaves
            .detail
            .fractal_brownian_motion_into(x, 0.0, z, 0.5, 2.0, &mut scratch.detail);

        let base_size = self.config.base_size;
        let mut lattice = DensityLattice::new();

        for i in 0..LATTICE_WIDTH {
            for j in 0..LATTICE_WIDTH {
                let weighted = self.weighted_height(window, i, j);
                let column = octaves.height.grid_index(i, 0, j);
                let noise_height = Self::shape_height_noise(scratch.height[column]);
                let center = (noise_height * 0.2 + weighted.base) * base_size / 8.0 * 4.0 + base_size;

                for k in 0..LATTICE_HEIGHT {
                    let mut gradient = (k as f64 - center) * self.config.stretch_y * 128.0 / 256.0
                        / weighted.scale;
                    if gradient < 0.0 {
                        gradient *= 4.0;
                    }

                    let index = octaves.roughness.grid_index(i, k, j);
                    let rough = scratch.roughness[index] / 512.0;
                    let rough_2 = scratch.roughness_2[index] / 512.0;
                    let detail = (scratch.detail[index] / 10.0 + 1.0) / 2.0;

                    let mut density = if detail < 0.0 {
                        rough
                    } else if detail > 1.0 {
                        rough_2
                    } else {
                        lerp(detail, rough, rough_2)
                    };
                    density -= gradient;

                    if k > Self::TOP_SLIDE_START {
                        let slide = (k - Self::TOP_SLIDE_START) as f64 / 3.0;
                        density = density * (1.0 - slide) + Self::TOP_SLIDE_TARGET * slide;
                    }

                    lattice.set(i, j, k, density);
                }
            }
        }

        lattice
    }

    /// Kernel-weighted average of the 5x5 biomes around lattice column `(i, j)`.
    #[must_use]
    pub fn weighted_height(&self, window: &BiomeWindow, i: usize, j: usize) -> WeightedHeight {
        let center = self.heights.get_or_default(window.get(i + 2, j + 2));

        let mut total_scale = 0.0;
        let mut total_base = 0.0;
        let mut total_weight = 0.0;

        for m in 0..KERNEL_SIZE {
            for n in 0..KERNEL_SIZE {
                let near = self.heights.get_or_default(window.get(i + m, j + n));
                let adjusted = configured_height(near, self.config, self.world_type);

                let mut weight = self.kernel.weight(m, n) / (adjusted.height + 2.0);
                if near.height > center.height {
                    weight /= 2.0;
                }

                total_scale += adjusted.scale * weight;
                total_base += adjusted.height * weight;
                total_weight += weight;
            }
        }

        WeightedHeight {
            scale: total_scale / total_weight * 0.9 + 0.1,
            base: (total_base / total_weight * 4.0 - 1.0) / 8.0,
            total_weight,
        }
    }

    /// Maps a raw height-noise value onto a small vertical shift.
    fn shape_height_noise(raw: f64) -> f64 {
        let mut value = raw / 8000.0;
        if value < 0.0 {
            value = -value * 0.3;
        }
        value = value * 3.0 - 2.0;
        if value < 0.0 {
            (value / 2.0).max(-1.0) / 1.4 / 2.0
        } else {
            value.min(1.0) / 8.0
        }
    }
}
