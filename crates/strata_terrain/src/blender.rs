//! # Terrain Blender
//!
//! Turns a [`BiomeEnvironmentSample`] and one surface noise value into the
//! final surface height and material stack of a column, then writes the
//! column's blocks.
//!
//! ## Design
//!
//! Every biome category has a fixed profile: an offset from sea level, a
//! noise-driven variation, and three material layers. A uniform column uses
//! its biome's profile as is. A boundary column starts from its own profile
//! and is pulled toward each neighbor by
//!
//! ```text
//! (other - base) * influence * damping * falloff
//! ```
//!
//! where `falloff` shrinks with distance relative to the pair's transition
//! width. Strong neighbors also swap the material stack for a transition
//! stack, so a grass/sand seam becomes coarse dirt instead of a hard edge.
//!
//! Column layout, bottom to top:
//!
//! ```text
//! max_y  ┌──────────┐
//!        │ air      │
//! sea    │ water    │  only when the surface is below sea level
//! surf   │ surface  │
//!        │ subsurf. │  `subsurface_depth` levels
//!        │ deep     │
//!        │ bedrock  │  `bedrock_depth` levels
//! min_y  └──────────┘
//! ```

use crate::biome::{BiomeCategory, BiomeId};
use crate::chunk::{ColumnStore, CHUNK_SIZE};
use crate::config::{BlendConfig, WorldGeometry};
use crate::environment::BiomeEnvironmentSample;
use crate::error::{ColumnError, ColumnResult};
use crate::material::{Material, MaterialLayers};

/// Height and materials of one biome category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeProfile {
    /// Offset of the mean surface from sea level.
    pub offset: i32,
    /// Maximum deviation produced by the surface noise.
    pub variation: f64,
    /// Dune shaping instead of plain linear noise.
    pub dunes: bool,
    /// Material stack.
    pub materials: MaterialLayers,
}

impl BiomeProfile {
    const fn flat(offset: i32, variation: f64, materials: MaterialLayers) -> Self {
        Self {
            offset,
            variation,
            dunes: false,
            materials,
        }
    }

    /// Profile used for a category.
    #[must_use]
    pub const fn for_category(category: BiomeCategory) -> Self {
        use Material::{Clay, Dirt, Grass, Gravel, Sand, Sandstone, Stone};
        match category {
            BiomeCategory::Ocean => Self::flat(-12, 3.0, MaterialLayers::new(Sand, Sand, Stone)),
            BiomeCategory::DeepOcean => {
                Self::flat(-18, 3.0, MaterialLayers::new(Gravel, Clay, Stone))
            }
            BiomeCategory::Beach => Self {
                offset: 2,
                variation: 1.0,
                dunes: true,
                materials: MaterialLayers::new(Sand, Sand, Sandstone),
            },
            BiomeCategory::Plains => Self::flat(6, 6.0, MaterialLayers::new(Grass, Dirt, Stone)),
            BiomeCategory::Forest => Self::flat(7, 5.0, MaterialLayers::new(Grass, Dirt, Stone)),
            BiomeCategory::Desert => {
                Self::flat(4, 5.0, MaterialLayers::new(Sand, Sandstone, Stone))
            }
            BiomeCategory::Mountain => {
                Self::flat(28, 20.0, MaterialLayers::new(Stone, Stone, Stone))
            }
        }
    }

    /// Noise after shaping, in roughly `[-1, 1]`.
    #[must_use]
    pub fn shape(&self, noise: f64) -> f64 {
        let n = noise.clamp(-1.0, 1.0);
        if self.dunes {
            ((n * 1.5).sin() + 0.5 * (n * 3.0).sin()) / 1.5
        } else {
            n
        }
    }
}

/// Final surface level and material stack of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TerrainColumnProperties {
    /// Level of the topmost solid block.
    pub surface_height: i32,
    /// Materials from the surface down.
    pub materials: MaterialLayers,
}

/// Per-column height blending and block placement.
#[derive(Clone, Debug)]
pub struct TerrainBlender {
    config: BlendConfig,
    geometry: WorldGeometry,
}

impl TerrainBlender {
    /// Creates a blender.
    #[must_use]
    pub const fn new(config: BlendConfig, geometry: WorldGeometry) -> Self {
        Self { config, geometry }
    }

    /// Blend settings.
    #[must_use]
    pub const fn config(&self) -> &BlendConfig {
        &self.config
    }

    /// Vertical bounds.
    #[must_use]
    pub const fn geometry(&self) -> &WorldGeometry {
        &self.geometry
    }

    /// Unblended surface level of `biome` for a noise value, before clamping.
    ///
    /// Always a whole number for finite noise.
    #[must_use]
    pub fn base_height(&self, biome: BiomeId, noise: f64) -> f64 {
        let profile = BiomeProfile::for_category(biome.category());
        let variation = (profile.shape(noise) * profile.variation).round();
        f64::from(self.geometry.sea_level + profile.offset) + variation
    }

    /// Material stack of `biome`.
    #[must_use]
    pub const fn materials_for(&self, biome: BiomeId) -> MaterialLayers {
        BiomeProfile::for_category(biome.category()).materials
    }

    /// Single-biome column with no blending.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnError::NonFiniteHeight`] if `noise` is not finite.
    pub fn base_properties(&self, biome: BiomeId, noise: f64) -> ColumnResult<TerrainColumnProperties> {
        self.finish(self.base_height(biome, noise), self.materials_for(biome))
    }

    /// Blends a column with its neighbors.
    ///
    /// Uniform samples return exactly [`Self::base_properties`] of the center
    /// biome.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnError::NonFiniteHeight`] if the height math does not
    /// stay finite.
    pub fn blend(
        &self,
        sample: &BiomeEnvironmentSample,
        noise: f64,
    ) -> ColumnResult<TerrainColumnProperties> {
        let center = sample.center_biome;
        if sample.is_uniform {
            return self.base_properties(center, noise);
        }

        let base = self.base_height(center, noise);
        let mut height = base;
        let mut materials = self.materials_for(center);

        for (&biome, transition) in &sample.transitions {
            if transition.influence <= self.config.blend_threshold {
                continue;
            }

            let other = self.base_height(biome, noise);
            let width = f64::from(transition.transition_width.max(1));
            let falloff =
                (1.0 - f64::from(transition.nearest_distance - 1) / width).clamp(0.0, 1.0);

            height += (other - base) * transition.influence * self.damping(center, biome) * falloff;

            if transition.influence > self.config.material_threshold {
                materials = materials.transition(self.materials_for(biome));
            }
        }

        self.finish(height, materials)
    }

    /// Flat column at sea level used when a column cannot be generated.
    #[must_use]
    pub fn fallback_properties(&self, biome: BiomeId) -> TerrainColumnProperties {
        TerrainColumnProperties {
            surface_height: self.geometry.clamp_level(self.geometry.sea_level),
            materials: self.materials_for(biome),
        }
    }

    /// Material at level `y` of a column.
    #[must_use]
    pub fn block_at(&self, properties: &TerrainColumnProperties, y: i32) -> Material {
        let surface = properties.surface_height;
        if y < self.geometry.min_y + self.config.bedrock_depth {
            Material::Bedrock
        } else if y > surface {
            if y < self.geometry.sea_level {
                Material::Water
            } else {
                Material::Air
            }
        } else if y == surface {
            properties.materials.surface
        } else if y >= surface - self.config.subsurface_depth {
            properties.materials.subsurface
        } else {
            properties.materials.deep
        }
    }

    /// Writes every level of one column into `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnError::OutOfBounds`] for columns outside the chunk,
    /// or the first error the store reports.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn materialize<S: ColumnStore + ?Sized>(
        &self,
        store: &mut S,
        local_x: usize,
        local_z: usize,
        properties: &TerrainColumnProperties,
    ) -> ColumnResult<()> {
        if local_x >= CHUNK_SIZE || local_z >= CHUNK_SIZE {
            return Err(ColumnError::OutOfBounds {
                local_x: local_x as i32,
                local_z: local_z as i32,
            });
        }
        for y in self.geometry.min_y..self.geometry.max_y {
            store.set_block(local_x, y, local_z, self.block_at(properties, y))?;
        }
        Ok(())
    }

    fn damping(&self, a: BiomeId, b: BiomeId) -> f64 {
        let soft = |id: BiomeId| {
            let category = id.category();
            category.is_water() || category.is_coastal()
        };
        if soft(a) || soft(b) {
            self.config.damping * self.config.coastal_damping
        } else {
            self.config.damping
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(&self, height: f64, materials: MaterialLayers) -> ColumnResult<TerrainColumnProperties> {
        if !height.is_finite() {
            return Err(ColumnError::NonFiniteHeight { value: height });
        }
        let top = f64::from(self.geometry.max_y - 1);
        let bottom = f64::from(self.geometry.min_y);
        Ok(TerrainColumnProperties {
            surface_height: height.round().clamp(bottom, top) as i32,
            materials,
        })
    }
}

impl Default for TerrainBlender {
    fn default() -> Self {
        Self::new(BlendConfig::default(), WorldGeometry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{FixedBiomeGrid, UniformBiomeGrid};
    use crate::chunk::{Block, ChunkBlocks, ChunkCoord};
    use crate::environment::{BiomeEnvironmentAnalyzer, TransitionInfo};

    #[test]
    fn test_profile_ranges() {
        let blender = TerrainBlender::default();
        let sea = 64.0;
        let cases = [
            (BiomeId::OCEAN, -15.0, -9.0),
            (BiomeId::DEEP_OCEAN, -21.0, -15.0),
            (BiomeId::BEACH, 1.0, 3.0),
            (BiomeId::PLAINS, 0.0, 12.0),
            (BiomeId::FOREST, 2.0, 12.0),
            (BiomeId::DESERT, -1.0, 9.0),
            (BiomeId::MOUNTAINS, 8.0, 48.0),
        ];
        for (biome, low, high) in cases {
            for step in -20..=20 {
                let noise = f64::from(step) / 10.0;
                let h = blender.base_height(biome, noise);
                assert!(
                    (sea + low..=sea + high).contains(&h),
                    "{biome} noise {noise}: {h}"
                );
                assert_eq!(h, h.round());
            }
        }
    }

    #[test]
    fn test_dunes_stay_within_one_block() {
        let beach = BiomeProfile::for_category(BiomeCategory::Beach);
        for step in -100..=100 {
            let shaped = beach.shape(f64::from(step) / 100.0);
            assert!(shaped.abs() <= 1.0, "{shaped}");
        }
        assert!(beach.shape(0.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_blend_equals_base() {
        let blender = TerrainBlender::default();
        let analyzer = BiomeEnvironmentAnalyzer::default();
        let sample = analyzer.analyze(&UniformBiomeGrid(BiomeId::DESERT), 5, 5);
        for noise in [-1.0, -0.3, 0.0, 0.42, 1.0] {
            assert_eq!(
                blender.blend(&sample, noise).unwrap(),
                blender.base_properties(BiomeId::DESERT, noise).unwrap()
            );
        }
    }

    #[test]
    fn test_blend_moves_toward_neighbor() {
        let blender = TerrainBlender::default();
        let analyzer = BiomeEnvironmentAnalyzer::default();
        let grid = FixedBiomeGrid::from_fn(|x, _| {
            Some(if x < 8 { BiomeId::PLAINS } else { BiomeId::MOUNTAINS })
        });

        let noise = 0.25;
        let plains = blender.base_height(BiomeId::PLAINS, noise);
        let mountains = blender.base_height(BiomeId::MOUNTAINS, noise);

        let left = blender.blend(&analyzer.analyze(&grid, 7, 8), noise).unwrap();
        let right = blender.blend(&analyzer.analyze(&grid, 8, 8), noise).unwrap();
        println!("plains {plains}, mountains {mountains}, seam {} | {}", left.surface_height, right.surface_height);

        assert!(f64::from(left.surface_height) > plains);
        assert!(f64::from(right.surface_height) < mountains);
        assert!(left.surface_height <= right.surface_height);
    }

    #[test]
    fn test_coastal_damping_is_softer() {
        let blender = TerrainBlender::default();
        assert!((blender.damping(BiomeId::PLAINS, BiomeId::FOREST) - 0.45).abs() < 1e-12);
        assert!((blender.damping(BiomeId::OCEAN, BiomeId::PLAINS) - 0.315).abs() < 1e-12);
        assert!((blender.damping(BiomeId::PLAINS, BiomeId::BEACH) - 0.315).abs() < 1e-12);
    }

    #[test]
    fn test_material_swap_needs_strong_neighbor() {
        let blender = TerrainBlender::default();
        let analyzer = BiomeEnvironmentAnalyzer::default();
        let grid = FixedBiomeGrid::from_fn(|x, _| {
            Some(if x < 8 { BiomeId::PLAINS } else { BiomeId::DESERT })
        });

        let seam = blender.blend(&analyzer.analyze(&grid, 7, 8), 0.0).unwrap();
        assert_eq!(seam.materials.surface, Material::CoarseDirt);

        // Desert influence here is about 0.26
        let inland = blender.blend(&analyzer.analyze(&grid, 6, 8), 0.0).unwrap();
        assert_eq!(inland.materials, blender.materials_for(BiomeId::PLAINS));
    }

    fn single_neighbor(center: BiomeId, other: BiomeId, influence: f64) -> BiomeEnvironmentSample {
        BiomeEnvironmentSample {
            center_biome: center,
            biome_weights: [(center, 1.0 - influence), (other, influence)].into_iter().collect(),
            is_uniform: false,
            transitions: [(
                other,
                TransitionInfo {
                    influence,
                    transition_width: 8,
                    nearest_distance: 1,
                },
            )]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        let blender = TerrainBlender::default();
        let above = |v: f64| f64::from_bits(v.to_bits() + 1);
        let base = blender.base_properties(BiomeId::PLAINS, 0.0).unwrap();
        let mountains = blender.base_height(BiomeId::MOUNTAINS, 0.0);

        // Exactly at the blend threshold nothing moves
        let at = blender
            .blend(&single_neighbor(BiomeId::PLAINS, BiomeId::MOUNTAINS, 0.1), 0.0)
            .unwrap();
        assert_eq!(at, base);

        let past = blender
            .blend(&single_neighbor(BiomeId::PLAINS, BiomeId::MOUNTAINS, above(0.1)), 0.0)
            .unwrap();
        let shift = (mountains - f64::from(base.surface_height)) * 0.1 * 0.45;
        println!("shift just past 0.1: {shift}");
        assert!((f64::from(past.surface_height) - f64::from(base.surface_height) - shift).abs() <= 0.5);
        assert!(past.surface_height > base.surface_height);
        assert_eq!(past.materials, base.materials);

        // Exactly at the material threshold the stack stays
        let at = blender
            .blend(&single_neighbor(BiomeId::PLAINS, BiomeId::MOUNTAINS, 0.35), 0.0)
            .unwrap();
        assert_eq!(at.materials, blender.materials_for(BiomeId::PLAINS));

        let past = blender
            .blend(&single_neighbor(BiomeId::PLAINS, BiomeId::MOUNTAINS, above(0.35)), 0.0)
            .unwrap();
        let swapped = blender
            .materials_for(BiomeId::PLAINS)
            .transition(blender.materials_for(BiomeId::MOUNTAINS));
        assert_eq!(past.materials, swapped);
        assert_eq!(past.materials.surface, Material::CoarseDirt);
    }

    #[test]
    fn test_heights_clamped_into_world() {
        let blender = TerrainBlender::new(BlendConfig::default(), WorldGeometry::new(0, 64, 60));
        let props = blender.base_properties(BiomeId::MOUNTAINS, 1.0).unwrap();
        assert_eq!(props.surface_height, 63);

        let low = TerrainBlender::new(BlendConfig::default(), WorldGeometry::new(50, 82, 52));
        let props = low.base_properties(BiomeId::DEEP_OCEAN, -1.0).unwrap();
        assert_eq!(props.surface_height, 50);
    }

    #[test]
    fn test_non_finite_noise_is_a_column_error() {
        let blender = TerrainBlender::default();
        assert!(matches!(
            blender.base_properties(BiomeId::PLAINS, f64::NAN),
            Err(ColumnError::NonFiniteHeight { .. })
        ));
    }

    #[test]
    fn test_column_layout() {
        let blender = TerrainBlender::default();
        let props = TerrainColumnProperties {
            surface_height: 50,
            materials: blender.materials_for(BiomeId::OCEAN),
        };
        assert_eq!(blender.block_at(&props, 0), Material::Bedrock);
        assert_eq!(blender.block_at(&props, 4), Material::Bedrock);
        assert_eq!(blender.block_at(&props, 5), Material::Stone);
        assert_eq!(blender.block_at(&props, 42), Material::Stone);
        assert_eq!(blender.block_at(&props, 43), Material::Sand);
        assert_eq!(blender.block_at(&props, 49), Material::Sand);
        assert_eq!(blender.block_at(&props, 50), Material::Sand);
        assert_eq!(blender.block_at(&props, 51), Material::Water);
        assert_eq!(blender.block_at(&props, 63), Material::Water);
        assert_eq!(blender.block_at(&props, 64), Material::Air);
    }

    #[test]
    fn test_materialize_writes_column() {
        let blender = TerrainBlender::default();
        let coord = ChunkCoord::new(0, 0);
        let mut blocks = ChunkBlocks::new(coord, *blender.geometry());
        let props = blender.base_properties(BiomeId::PLAINS, 0.0).unwrap();

        blender.materialize(&mut blocks, 3, 4, &props).unwrap();
        assert_eq!(props.surface_height, 70);
        assert_eq!(blocks.surface_height(3, 4), Some(70));
        assert_eq!(blocks.get_block(3, 70, 4), Block::GRASS);
        assert_eq!(blocks.get_block(3, 69, 4), Block::DIRT);
        assert_eq!(blocks.get_block(3, 62, 4), Block::STONE);
        assert_eq!(blocks.get_block(3, 0, 4), Block::BEDROCK);
        assert_eq!(blocks.height(0, 0), None);

        assert!(matches!(
            blender.materialize(&mut blocks, 16, 0, &props),
            Err(ColumnError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_fallback_is_flat_sea_level() {
        let blender = TerrainBlender::default();
        let props = blender.fallback_properties(BiomeId::MOUNTAINS);
        assert_eq!(props.surface_height, 64);
        assert_eq!(props.materials, blender.materials_for(BiomeId::MOUNTAINS));
    }
}
