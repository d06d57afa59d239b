//! The five noise stacks a world needs, built once from the seed.

use super::octave::{PerlinOctaveGenerator, SimplexOctaveGenerator};
use crate::config::DensityConfig;
use crate::random::{ChaChaRandom, RandomSource, WorldSeed};

/// Lattice width in quarter-resolution cells.
pub const LATTICE_WIDTH: usize = 5;

/// Lattice height in cells (32 intervals + 1).
pub const LATTICE_HEIGHT: usize = 33;

/// Noise stacks for one world.
///
/// Construction order is fixed (height, roughness, roughness 2, detail,
/// surface) and every stack draws from the same stream, so the order is part
/// of the seed's meaning.
#[derive(Clone, Debug)]
pub struct WorldOctaves {
    /// 2D height variation, sampled on the 5x5 lattice columns.
    pub height: PerlinOctaveGenerator,
    /// First roughness field (5x33x5).
    pub roughness: PerlinOctaveGenerator,
    /// Second roughness field (5x33x5).
    pub roughness_2: PerlinOctaveGenerator,
    /// Selector between the two roughness fields (5x33x5).
    pub detail: PerlinOctaveGenerator,
    /// Per-block surface variation (16x1x16).
    pub surface: SimplexOctaveGenerator,
}

impl WorldOctaves {
    /// Octaves in the height stack.
    pub const HEIGHT_OCTAVES: usize = 16;
    /// Octaves in each roughness stack.
    pub const ROUGHNESS_OCTAVES: usize = 16;
    /// Octaves in the detail stack.
    pub const DETAIL_OCTAVES: usize = 8;
    /// Octaves in the surface stack.
    pub const SURFACE_OCTAVES: usize = 4;

    /// Builds all stacks from the world seed.
    #[must_use]
    pub fn new(seed: WorldSeed, config: &DensityConfig) -> Self {
        let mut random = ChaChaRandom::new(seed);
        Self::from_random(&mut random, config)
    }

    /// Builds all stacks from an existing stream.
    pub fn from_random<R: RandomSource + ?Sized>(random: &mut R, config: &DensityConfig) -> Self {
        let height = PerlinOctaveGenerator::new(
            random,
            Self::HEIGHT_OCTAVES,
            LATTICE_WIDTH,
            1,
            LATTICE_WIDTH,
        )
        .with_scale(config.height_noise_scale_x, 1.0, config.height_noise_scale_z);

        let roughness = PerlinOctaveGenerator::new(
            random,
            Self::ROUGHNESS_OCTAVES,
            LATTICE_WIDTH,
            LATTICE_HEIGHT,
            LATTICE_WIDTH,
        )
        .with_scale(
            config.coordinate_scale,
            config.height_scale,
            config.coordinate_scale,
        );

        let roughness_2 = PerlinOctaveGenerator::new(
            random,
            Self::ROUGHNESS_OCTAVES,
            LATTICE_WIDTH,
            LATTICE_HEIGHT,
            LATTICE_WIDTH,
        )
        .with_scale(
            config.coordinate_scale,
            config.height_scale,
            config.coordinate_scale,
        );

        let detail = PerlinOctaveGenerator::new(
            random,
            Self::DETAIL_OCTAVES,
            LATTICE_WIDTH,
            LATTICE_HEIGHT,
            LATTICE_WIDTH,
        )
        .with_scale(
            config.coordinate_scale / config.detail_noise_scale_x,
            config.height_scale / config.detail_noise_scale_y,
            config.coordinate_scale / config.detail_noise_scale_z,
        );

        let mut surface = SimplexOctaveGenerator::new(random, Self::SURFACE_OCTAVES, 16, 1, 16);
        surface.set_scale(config.surface_scale);

        Self {
            height,
            roughness,
            roughness_2,
            detail,
            surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_shapes() {
        let octaves = WorldOctaves::new(WorldSeed::new(12345), &DensityConfig::default());

        assert_eq!(octaves.height.octave_count(), 16);
        assert_eq!(octaves.height.grid_size(), (5, 1, 5));
        assert_eq!(octaves.roughness.grid_size(), (5, 33, 5));
        assert_eq!(octaves.roughness_2.grid_size(), (5, 33, 5));
        assert_eq!(octaves.detail.octave_count(), 8);
        assert_eq!(octaves.surface.octave_count(), 4);
        assert_eq!(octaves.surface.grid_len(), 256);

        let (dx, dy, dz, _) = octaves.detail.scales();
        assert!((dx - 684.412 / 80.0).abs() < 1e-12);
        assert!((dy - 684.412 / 160.0).abs() < 1e-12);
        assert!((dz - 684.412 / 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_roughness_fields_are_independent() {
        let octaves = WorldOctaves::new(WorldSeed::new(12345), &DensityConfig::default());
        let a = octaves.roughness.fractal_brownian_motion(4.0, 0.0, 8.0, 0.5, 2.0);
        let b = octaves.roughness_2.fractal_brownian_motion(4.0, 0.0, 8.0, 0.5, 2.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_seed_same_fields() {
        let config = DensityConfig::default();
        let a = WorldOctaves::new(WorldSeed::new(99), &config);
        let b = WorldOctaves::new(WorldSeed::new(99), &config);
        assert_eq!(
            a.detail.fractal_brownian_motion(-8.0, 0.0, 12.0, 0.5, 2.0),
            b.detail.fractal_brownian_motion(-8.0, 0.0, 12.0, 0.5, 2.0)
        );
    }
}
