//! # Biomes
//!
//! Biome ids, the categories the blender reasons about, the per-biome
//! height table consumed by the density lattice, and the lookup seams
//! ([`BiomeGrid`], [`BiomeSource`]) through which the host supplies biomes.
//!
//! Ids follow the classic numeric registry (0 = ocean, 1 = plains, ...).
//! Any `u8` is a valid id: unknown ids fall back to the table's default
//! entry and to the plains category.

use std::fmt;

use crate::chunk::{ChunkCoord, CHUNK_SIZE};
use crate::config::BiomeHeightOverride;
use crate::error::{TerrainError, TerrainResult};

/// Numeric biome identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BiomeId(pub u8);

impl BiomeId {
    /// Ocean.
    pub const OCEAN: Self = Self(0);
    /// Plains (the fallback biome).
    pub const PLAINS: Self = Self(1);
    /// Desert.
    pub const DESERT: Self = Self(2);
    /// Extreme hills.
    pub const MOUNTAINS: Self = Self(3);
    /// Forest.
    pub const FOREST: Self = Self(4);
    /// Taiga.
    pub const TAIGA: Self = Self(5);
    /// Swampland.
    pub const SWAMP: Self = Self(6);
    /// River.
    pub const RIVER: Self = Self(7);
    /// Frozen ocean.
    pub const FROZEN_OCEAN: Self = Self(10);
    /// Ice plains.
    pub const ICE_PLAINS: Self = Self(12);
    /// Ice mountains.
    pub const ICE_MOUNTAINS: Self = Self(13);
    /// Mushroom island shore.
    pub const MUSHROOM_SHORE: Self = Self(15);
    /// Beach.
    pub const BEACH: Self = Self(16);
    /// Desert hills.
    pub const DESERT_HILLS: Self = Self(17);
    /// Forest hills.
    pub const FOREST_HILLS: Self = Self(18);
    /// Taiga hills.
    pub const TAIGA_HILLS: Self = Self(19);
    /// Extreme hills edge.
    pub const MOUNTAIN_EDGE: Self = Self(20);
    /// Jungle.
    pub const JUNGLE: Self = Self(21);
    /// Deep ocean.
    pub const DEEP_OCEAN: Self = Self(24);
    /// Stone beach.
    pub const STONE_BEACH: Self = Self(25);
    /// Cold beach.
    pub const COLD_BEACH: Self = Self(26);
    /// Birch forest.
    pub const BIRCH_FOREST: Self = Self(27);
    /// Roofed forest.
    pub const ROOFED_FOREST: Self = Self(29);
    /// Extreme hills with trees.
    pub const WOODED_MOUNTAINS: Self = Self(34);
    /// Savanna.
    pub const SAVANNA: Self = Self(35);
    /// Savanna plateau.
    pub const SAVANNA_PLATEAU: Self = Self(36);
    /// Mesa.
    pub const MESA: Self = Self(37);
    /// Sunflower plains.
    pub const SUNFLOWER_PLAINS: Self = Self(129);
    /// Desert (mutated).
    pub const DESERT_MUTATED: Self = Self(130);
    /// Extreme hills (mutated).
    pub const MOUNTAINS_MUTATED: Self = Self(131);
    /// Extreme hills with trees (mutated).
    pub const WOODED_MOUNTAINS_MUTATED: Self = Self(162);

    /// Category the blender uses for this biome.
    #[must_use]
    pub const fn category(self) -> BiomeCategory {
        match self.0 {
            0 | 10 => BiomeCategory::Ocean,
            24 => BiomeCategory::DeepOcean,
            15 | 16 | 25 | 26 => BiomeCategory::Beach,
            2 | 17 | 130 => BiomeCategory::Desert,
            3 | 13 | 20 | 34 | 131 | 162 => BiomeCategory::Mountain,
            4 | 5 | 18 | 19 | 21..=23 | 27..=33 | 132 | 133 | 149 | 151 | 155..=158 | 160
            | 161 => BiomeCategory::Forest,
            _ => BiomeCategory::Plains,
        }
    }

    /// Raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.category().name(), self.0)
    }
}

/// Coarse terrain class of a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BiomeCategory {
    /// Shallow water.
    Ocean,
    /// Deep water.
    DeepOcean,
    /// Coastline.
    Beach,
    /// Flat grassland (also the catch-all).
    Plains,
    /// Wooded land.
    Forest,
    /// Sand dunes.
    Desert,
    /// High, rough land.
    Mountain,
}

impl BiomeCategory {
    /// Ocean or deep ocean.
    #[inline]
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Ocean | Self::DeepOcean)
    }

    /// Beach-like shoreline.
    #[inline]
    #[must_use]
    pub const fn is_coastal(self) -> bool {
        matches!(self, Self::Beach)
    }

    /// Anything that is neither water nor coast.
    #[inline]
    #[must_use]
    pub const fn is_land(self) -> bool {
        !self.is_water() && !self.is_coastal()
    }

    /// Lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::DeepOcean => "deep_ocean",
            Self::Beach => "beach",
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Desert => "desert",
            Self::Mountain => "mountain",
        }
    }
}

/// Base height and height scale of one biome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeHeight {
    /// Base height (negative = below sea level).
    pub height: f64,
    /// Amount of vertical variation.
    pub scale: f64,
}

impl BiomeHeight {
    /// Entry used for ids without one of their own.
    pub const DEFAULT: Self = Self::new(0.1, 0.2);

    /// Creates an entry.
    #[inline]
    #[must_use]
    pub const fn new(height: f64, scale: f64) -> Self {
        Self { height, scale }
    }

    /// Amplified-world variant: `1 + 2h`, `1 + 4s` for positive heights.
    #[inline]
    #[must_use]
    pub fn amplified(self) -> Self {
        if self.height > 0.0 {
            Self::new(1.0 + self.height * 2.0, 1.0 + self.scale * 4.0)
        } else {
            self
        }
    }

    /// Checks that the elevation weight `1 / (height + 2)` stays positive.
    fn validate(self, biome: u8) -> TerrainResult<Self> {
        if self.height.is_finite() && self.scale.is_finite() && self.height > -2.0 && self.scale >= 0.0 {
            Ok(self)
        } else {
            Err(TerrainError::InvalidBiomeHeight {
                biome,
                height: self.height,
                scale: self.scale,
            })
        }
    }
}

/// Biome id -> [`BiomeHeight`] lookup.
///
/// Total over all 256 ids. Built once, then shared read-only.
#[derive(Clone, Debug)]
pub struct BiomeHeightTable {
    entries: [Option<BiomeHeight>; 256],
    default: BiomeHeight,
}

impl BiomeHeightTable {
    /// `(id, height, scale)` rows of the built-in table.
    const VANILLA: &'static [(u8, f64, f64)] = &[
        (0, -1.0, 0.1),
        (1, 0.125, 0.05),
        (2, 0.125, 0.05),
        (3, 1.0, 0.5),
        (4, 0.1, 0.2),
        (5, 0.2, 0.2),
        (6, -0.2, 0.1),
        (7, -0.5, 0.0),
        (10, -1.0, 0.1),
        (11, -0.5, 0.0),
        (12, 0.125, 0.05),
        (13, 0.45, 0.3),
        (14, 0.2, 0.3),
        (15, 0.0, 0.025),
        (16, 0.0, 0.025),
        (17, 0.45, 0.3),
        (18, 0.45, 0.3),
        (19, 0.45, 0.3),
        (20, 0.8, 0.3),
        (21, 0.1, 0.2),
        (22, 0.45, 0.3),
        (23, 0.1, 0.2),
        (24, -1.8, 0.1),
        (25, 0.1, 0.8),
        (26, 0.0, 0.025),
        (27, 0.1, 0.2),
        (28, 0.45, 0.3),
        (29, 0.1, 0.2),
        (30, 0.2, 0.2),
        (31, 0.45, 0.3),
        (32, 0.2, 0.2),
        (33, 0.45, 0.3),
        (34, 1.0, 0.5),
        (35, 0.125, 0.05),
        (36, 1.5, 0.025),
        (37, 0.1, 0.2),
        (38, 1.5, 0.025),
        (39, 1.5, 0.025),
        (129, 0.125, 0.05),
        (130, 0.225, 0.25),
        (131, 1.0, 0.5),
        (132, 0.1, 0.4),
        (133, 0.3, 0.4),
        (134, -0.1, 0.3),
        (140, 0.425, 0.45),
        (149, 0.2, 0.4),
        (151, 0.2, 0.4),
        (155, 0.2, 0.4),
        (156, 0.55, 0.5),
        (157, 0.2, 0.4),
        (158, 0.3, 0.4),
        (160, 0.2, 0.2),
        (161, 0.2, 0.2),
        (162, 1.0, 0.5),
        (163, 0.3625, 1.225),
        (164, 1.05, 1.2125),
        (165, 0.1, 0.2),
        (166, 0.45, 0.3),
        (167, 0.45, 0.3),
    ];

    /// Table with no explicit entries.
    #[must_use]
    pub const fn empty(default: BiomeHeight) -> Self {
        Self {
            entries: [None; 256],
            default,
        }
    }

    /// The built-in table.
    #[must_use]
    pub fn vanilla() -> Self {
        let mut table = Self::empty(BiomeHeight::DEFAULT);
        for &(id, height, scale) in Self::VANILLA {
            table.entries[usize::from(id)] = Some(BiomeHeight::new(height, scale));
        }
        table
    }

    /// The built-in table with configured overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is malformed.
    pub fn with_overrides(overrides: &[BiomeHeightOverride]) -> TerrainResult<Self> {
        let mut table = Self::vanilla();
        for entry in overrides {
            table.insert(BiomeId(entry.id), BiomeHeight::new(entry.height, entry.scale))?;
        }
        Ok(table)
    }

    /// Sets the entry for one biome.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not finite, the scale is negative or
    /// the height is at or below -2.
    pub fn insert(&mut self, biome: BiomeId, height: BiomeHeight) -> TerrainResult<()> {
        self.entries[usize::from(biome.0)] = Some(height.validate(biome.0)?);
        Ok(())
    }

    /// Entry for a biome, or the default entry.
    #[inline]
    #[must_use]
    pub fn get(&self, biome: BiomeId) -> BiomeHeight {
        self.entries[usize::from(biome.0)].unwrap_or(self.default)
    }

    /// Entry for an optional biome (unset cells use the default).
    #[inline]
    #[must_use]
    pub fn get_or_default(&self, biome: Option<BiomeId>) -> BiomeHeight {
        biome.map_or(self.default, |b| self.get(b))
    }

    /// Whether a biome has its own entry.
    #[must_use]
    pub fn contains(&self, biome: BiomeId) -> bool {
        self.entries[usize::from(biome.0)].is_some()
    }

    /// Entry used for unknown or unset biomes.
    #[must_use]
    pub const fn default_entry(&self) -> BiomeHeight {
        self.default
    }
}

impl Default for BiomeHeightTable {
    fn default() -> Self {
        Self::vanilla()
    }
}

/// Biome lookup for one chunk, in chunk-local block coordinates.
///
/// Lookups are made for `local_x`/`local_z` in `[0, 16)` by the blender and
/// in `[-8, 28]` by the density lattice (its window reaches two quarter-cells
/// past the chunk on every side). `None` means "unset".
pub trait BiomeGrid {
    /// Biome of the column at the given local position.
    fn biome(&self, local_x: i32, local_z: i32) -> Option<BiomeId>;
}

/// World-space biome lookup, shareable between worker threads.
pub trait BiomeSource: Send + Sync {
    /// Biome of the column at world block coordinates.
    fn biome_at(&self, world_x: i32, world_z: i32) -> Option<BiomeId>;
}

/// Adapts a [`BiomeSource`] to one chunk's local coordinates.
#[derive(Clone, Copy)]
pub struct ChunkBiomeView<'a> {
    source: &'a dyn BiomeSource,
    origin_x: i32,
    origin_z: i32,
}

impl<'a> ChunkBiomeView<'a> {
    /// Creates a view of `source` anchored at the chunk's origin.
    #[must_use]
    pub fn new(source: &'a dyn BiomeSource, coord: ChunkCoord) -> Self {
        Self {
            source,
            origin_x: coord.world_x(),
            origin_z: coord.world_z(),
        }
    }
}

impl BiomeGrid for ChunkBiomeView<'_> {
    #[inline]
    fn biome(&self, local_x: i32, local_z: i32) -> Option<BiomeId> {
        self.source.biome_at(
            self.origin_x.saturating_add(local_x),
            self.origin_z.saturating_add(local_z),
        )
    }
}

/// The same biome everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformBiomeGrid(pub BiomeId);

impl BiomeGrid for UniformBiomeGrid {
    #[inline]
    fn biome(&self, _local_x: i32, _local_z: i32) -> Option<BiomeId> {
        Some(self.0)
    }
}

impl BiomeSource for UniformBiomeGrid {
    #[inline]
    fn biome_at(&self, _world_x: i32, _world_z: i32) -> Option<BiomeId> {
        Some(self.0)
    }
}

/// Explicit 16x16 biome map for one chunk.
///
/// Lookups outside the chunk are clamped to the nearest edge column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedBiomeGrid {
    cells: [[Option<BiomeId>; CHUNK_SIZE]; CHUNK_SIZE],
}

impl FixedBiomeGrid {
    /// Grid with every cell set to `fill`.
    #[must_use]
    pub const fn filled(fill: Option<BiomeId>) -> Self {
        Self {
            cells: [[fill; CHUNK_SIZE]; CHUNK_SIZE],
        }
    }

    /// Grid computed from `f(local_x, local_z)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn from_fn(f: impl Fn(i32, i32) -> Option<BiomeId>) -> Self {
        let mut grid = Self::filled(None);
        for (x, row) in grid.cells.iter_mut().enumerate() {
            for (z, cell) in row.iter_mut().enumerate() {
                *cell = f(x as i32, z as i32);
            }
        }
        grid
    }

    /// Sets one cell. Out-of-range positions are ignored.
    pub fn set(&mut self, local_x: usize, local_z: usize, biome: Option<BiomeId>) {
        if local_x < CHUNK_SIZE && local_z < CHUNK_SIZE {
            self.cells[local_x][local_z] = biome;
        }
    }
}

impl BiomeGrid for FixedBiomeGrid {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn biome(&self, local_x: i32, local_z: i32) -> Option<BiomeId> {
        let last = CHUNK_SIZE as i32 - 1;
        let x = local_x.clamp(0, last) as usize;
        let z = local_z.clamp(0, last) as usize;
        self.cells[x][z]
    }
}
