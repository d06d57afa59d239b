//! # Generator Configuration
//!
//! Everything tunable about terrain generation lives here, loaded once at
//! startup from TOML. Every section has defaults, so an empty file is a
//! valid configuration:
//!
//! ```toml
//! seed = 12345
//! world_type = "amplified"
//!
//! [geometry]
//! min_y = 0
//! max_y = 256
//! sea_level = 64
//!
//! [[biome_heights]]
//! id = 3
//! height = 1.2
//! scale = 0.5
//! ```
//!
//! `validate` rejects anything that would make a later per-column step
//! divide by zero or escape the world bounds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Overall shape of the terrain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldType {
    /// Standard heights.
    #[default]
    Normal,
    /// Positive biome heights and scales are exaggerated.
    Amplified,
}

/// Vertical bounds of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGeometry {
    /// Lowest block level (inclusive).
    pub min_y: i32,
    /// Highest block level (exclusive).
    pub max_y: i32,
    /// Water fills air below this level.
    pub sea_level: i32,
}

impl WorldGeometry {
    /// Number of vertical lattice cells the world is split into.
    pub const LATTICE_CELLS: i32 = 32;

    /// Creates a geometry without validating it.
    #[inline]
    #[must_use]
    pub const fn new(min_y: i32, max_y: i32, sea_level: i32) -> Self {
        Self {
            min_y,
            max_y,
            sea_level,
        }
    }

    /// Total number of block levels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Block levels covered by one vertical lattice cell.
    #[inline]
    #[must_use]
    pub const fn cell_height(&self) -> i32 {
        self.height() / Self::LATTICE_CELLS
    }

    /// Clamps a level into `[min_y, max_y)`.
    #[inline]
    #[must_use]
    pub fn clamp_level(&self, y: i32) -> i32 {
        y.clamp(self.min_y, self.max_y - 1)
    }

    /// Checks the range and sea level.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty, is not a multiple of 32
    /// levels, or the sea level falls outside it.
    pub fn validate(&self) -> TerrainResult<()> {
        let height = i64::from(self.max_y) - i64::from(self.min_y);
        if height <= 0 || height % i64::from(Self::LATTICE_CELLS) != 0 {
            return Err(TerrainError::InvalidYRange {
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        if self.sea_level < self.min_y || self.sea_level >= self.max_y {
            return Err(TerrainError::SeaLevelOutOfRange {
                sea_level: self.sea_level,
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        Ok(())
    }
}

impl Default for WorldGeometry {
    fn default() -> Self {
        Self::new(0, 256, 64)
    }
}

/// Noise scales and shaping constants of the density lattice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Horizontal scale of the roughness noise.
    pub coordinate_scale: f64,
    /// Vertical scale of the roughness noise.
    pub height_scale: f64,
    /// X scale of the 2D height noise.
    pub height_noise_scale_x: f64,
    /// Z scale of the 2D height noise.
    pub height_noise_scale_z: f64,
    /// X divisor applied to `coordinate_scale` for the detail noise.
    pub detail_noise_scale_x: f64,
    /// Y divisor applied to `height_scale` for the detail noise.
    pub detail_noise_scale_y: f64,
    /// Z divisor applied to `coordinate_scale` for the detail noise.
    pub detail_noise_scale_z: f64,
    /// Horizontal scale of the surface noise.
    pub surface_scale: f64,
    /// Lattice level around which terrain is centered.
    pub base_size: f64,
    /// Vertical stretch of the height gradient.
    pub stretch_y: f64,
    /// Added to every biome base height.
    pub biome_height_offset: f64,
    /// Multiplies every biome base height.
    pub biome_height_weight: f64,
    /// Added to every biome height scale.
    pub biome_scale_offset: f64,
    /// Multiplies every biome height scale.
    pub biome_scale_weight: f64,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            coordinate_scale: 684.412,
            height_scale: 684.412,
            height_noise_scale_x: 200.0,
            height_noise_scale_z: 200.0,
            detail_noise_scale_x: 80.0,
            detail_noise_scale_y: 160.0,
            detail_noise_scale_z: 80.0,
            surface_scale: 0.0625,
            base_size: 8.5,
            stretch_y: 12.0,
            biome_height_offset: 0.0,
            biome_height_weight: 1.0,
            biome_scale_offset: 0.0,
            biome_scale_weight: 1.0,
        }
    }
}

impl DensityConfig {
    fn validate(&self) -> TerrainResult<()> {
        let positive = [
            ("density.coordinate_scale", self.coordinate_scale),
            ("density.height_scale", self.height_scale),
            ("density.height_noise_scale_x", self.height_noise_scale_x),
            ("density.height_noise_scale_z", self.height_noise_scale_z),
            ("density.detail_noise_scale_x", self.detail_noise_scale_x),
            ("density.detail_noise_scale_y", self.detail_noise_scale_y),
            ("density.detail_noise_scale_z", self.detail_noise_scale_z),
            ("density.surface_scale", self.surface_scale),
            ("density.base_size", self.base_size),
            ("density.stretch_y", self.stretch_y),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TerrainError::ParameterOutOfRange { name, value });
            }
        }

        let finite = [
            ("density.biome_height_offset", self.biome_height_offset),
            ("density.biome_height_weight", self.biome_height_weight),
            ("density.biome_scale_offset", self.biome_scale_offset),
            ("density.biome_scale_weight", self.biome_scale_weight),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(TerrainError::ParameterOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// Thresholds and damping of the biome blender.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Chebyshev radius sampled around each column (1..=3).
    pub sample_radius: i32,
    /// Minimum raw weight for a neighbor biome to count as a transition.
    pub min_transition_weight: f64,
    /// Influence above which heights are blended.
    pub blend_threshold: f64,
    /// Influence above which the material stack is replaced.
    pub material_threshold: f64,
    /// Fraction of the height difference applied at full influence.
    pub damping: f64,
    /// Extra damping when water or coast is involved.
    pub coastal_damping: f64,
    /// Levels of bedrock at the bottom of the world.
    pub bedrock_depth: i32,
    /// Levels of subsurface material below the surface block.
    pub subsurface_depth: i32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            sample_radius: 3,
            min_transition_weight: 0.1,
            blend_threshold: 0.1,
            material_threshold: 0.35,
            damping: 0.45,
            coastal_damping: 0.7,
            bedrock_depth: 5,
            subsurface_depth: 7,
        }
    }
}

impl BlendConfig {
    fn validate(&self, geometry: &WorldGeometry) -> TerrainResult<()> {
        let out_of_range = |name: &'static str, value: f64| {
            Err(TerrainError::ParameterOutOfRange { name, value })
        };

        if !(1..=3).contains(&self.sample_radius) {
            return out_of_range("blend.sample_radius", f64::from(self.sample_radius));
        }
        if !self.min_transition_weight.is_finite() || self.min_transition_weight < 0.0 {
            return out_of_range("blend.min_transition_weight", self.min_transition_weight);
        }
        if !(0.0..1.0).contains(&self.blend_threshold) {
            return out_of_range("blend.blend_threshold", self.blend_threshold);
        }
        if !(self.blend_threshold..=1.0).contains(&self.material_threshold) {
            return out_of_range("blend.material_threshold", self.material_threshold);
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return out_of_range("blend.damping", self.damping);
        }
        if !(self.coastal_damping > 0.0 && self.coastal_damping <= 1.0) {
            return out_of_range("blend.coastal_damping", self.coastal_damping);
        }
        if self.bedrock_depth < 0 || self.bedrock_depth >= geometry.height() {
            return out_of_range("blend.bedrock_depth", f64::from(self.bedrock_depth));
        }
        if self.subsurface_depth < 1 {
            return out_of_range("blend.subsurface_depth", f64::from(self.subsurface_depth));
        }
        Ok(())
    }
}

/// Replaces one entry of the biome height table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeHeightOverride {
    /// Raw biome id.
    pub id: u8,
    /// Base height.
    pub height: f64,
    /// Height scale.
    pub scale: f64,
}

/// Complete generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World seed.
    pub seed: u64,
    /// Normal or amplified terrain.
    pub world_type: WorldType,
    /// Chunks kept in the lattice cache (0 disables it).
    pub lattice_cache_capacity: usize,
    /// Threads in the chunk worker pool.
    pub workers: usize,
    /// Vertical bounds.
    pub geometry: WorldGeometry,
    /// Density lattice constants.
    pub density: DensityConfig,
    /// Blender thresholds.
    pub blend: BlendConfig,
    /// Overrides applied on top of the built-in biome height table.
    pub biome_heights: Vec<BiomeHeightOverride>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            world_type: WorldType::Normal,
            lattice_cache_capacity: 0,
            workers: 4,
            geometry: WorldGeometry::default(),
            density: DensityConfig::default(),
            blend: BlendConfig::default(),
            biome_heights: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration for a seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| TerrainError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_toml_file(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| TerrainError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            "Loaded terrain config from {} (seed {}, {:?})",
            path.display(),
            config.seed,
            config.world_type
        );
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml_string(&self) -> TerrainResult<String> {
        toml::to_string(self).map_err(|e| TerrainError::InvalidConfig(e.to_string()))
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> TerrainResult<()> {
        self.geometry.validate()?;
        self.density.validate()?;
        self.blend.validate(&self.geometry)?;
        if self.workers == 0 {
            return Err(TerrainError::ParameterOutOfRange {
                name: "workers",
                value: 0.0,
            });
        }
        for entry in &self.biome_heights {
            if !entry.height.is_finite() || !entry.scale.is_finite() {
                return Err(TerrainError::InvalidBiomeHeight {
                    biome: entry.id,
                    height: entry.height,
                    scale: entry.scale,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.geometry.cell_height(), 8);
        assert_eq!(config.blend.sample_radius, 3);
    }

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            seed = 99
            world_type = "amplified"

            [geometry]
            sea_level = 70

            [blend]
            sample_radius = 2

            [[biome_heights]]
            id = 3
            height = 1.25
            scale = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 99);
        assert_eq!(config.world_type, WorldType::Amplified);
        assert_eq!(config.geometry, WorldGeometry::new(0, 256, 70));
        assert_eq!(config.blend.sample_radius, 2);
        assert!((config.blend.damping - 0.45).abs() < f64::EPSILON);
        assert_eq!(config.biome_heights.len(), 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = GeneratorConfig::with_seed(4242);
        config.world_type = WorldType::Amplified;
        config.lattice_cache_capacity = 64;
        config.biome_heights.push(BiomeHeightOverride {
            id: 1,
            height: 0.25,
            scale: 0.1,
        });

        let text = config.to_toml_string().unwrap();
        let parsed = GeneratorConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_bundled_default_config_matches_defaults() {
        let config = GeneratorConfig::from_toml_str(include_str!("../config/default.toml")).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let err = WorldGeometry::new(0, 100, 64).validate().unwrap_err();
        assert!(matches!(err, TerrainError::InvalidYRange { .. }));

        let err = WorldGeometry::new(64, 0, 10).validate().unwrap_err();
        assert!(matches!(err, TerrainError::InvalidYRange { .. }));

        let err = WorldGeometry::new(0, 256, 256).validate().unwrap_err();
        assert!(matches!(err, TerrainError::SeaLevelOutOfRange { .. }));

        WorldGeometry::new(-64, 320, 62).validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_blend_parameters() {
        let mut config = GeneratorConfig::default();
        config.blend.sample_radius = 4;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.blend.material_threshold = 0.05;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.density.stretch_y = 0.0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unreadable_file() {
        let err = GeneratorConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfig(_)));
    }
}
