//! # Biome Environment Analysis
//!
//! For one column, looks at the biomes within a small Chebyshev radius and
//! reports how strongly each neighbor biome pulls on the column.
//!
//! Samples closer to the column weigh more (`1 / (1 + 0.5 d)`). Only cells
//! inside the chunk are read, so a column's result never depends on
//! neighboring chunks' biome data.
//!
//! Results use ordered maps: the blender folds transitions in biome-id
//! order, which keeps floating-point sums identical from run to run.

use std::collections::BTreeMap;

use crate::biome::{BiomeCategory, BiomeGrid, BiomeId};
use crate::chunk::CHUNK_SIZE;
use crate::config::BlendConfig;

/// How one neighbor biome affects a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionInfo {
    /// Share of the total sample weight, in `[0, 1]`.
    pub influence: f64,
    /// Blocks over which the transition fades out.
    pub transition_width: i32,
    /// Chebyshev distance of the nearest cell of this biome.
    pub nearest_distance: i32,
}

/// Neighborhood summary of one column.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeEnvironmentSample {
    /// Biome of the column itself.
    pub center_biome: BiomeId,
    /// Raw accumulated weight per biome.
    pub biome_weights: BTreeMap<BiomeId, f64>,
    /// Only one biome in range.
    pub is_uniform: bool,
    /// Neighbor biomes strong enough to matter.
    pub transitions: BTreeMap<BiomeId, TransitionInfo>,
}

impl BiomeEnvironmentSample {
    /// Sum of all sample weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.biome_weights.values().sum()
    }
}

/// Symmetric biome pair -> transition width lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionWidthTable {
    explicit: BTreeMap<(BiomeId, BiomeId), i32>,
}

impl TransitionWidthTable {
    /// Water meeting water.
    pub const WATER_WATER: i32 = 8;
    /// Water meeting coast.
    pub const WATER_COASTAL: i32 = 8;
    /// Water meeting land directly.
    pub const WATER_LAND: i32 = 12;
    /// Two kinds of coast.
    pub const COASTAL_COASTAL: i32 = 4;
    /// Coast meeting land.
    pub const COASTAL_LAND: i32 = 6;
    /// Two land biomes.
    pub const LAND_LAND: i32 = 4;
    /// Extra width when a mountain is involved.
    pub const MOUNTAIN_BONUS: i32 = 4;

    /// Table with the built-in explicit pairs.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.insert(BiomeId::OCEAN, BiomeId::DEEP_OCEAN, 16);
        table.insert(BiomeId::DESERT, BiomeId::PLAINS, 6);
        table.insert(BiomeId::SAVANNA, BiomeId::SAVANNA_PLATEAU, 10);
        table
    }

    /// Table with category defaults only.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            explicit: BTreeMap::new(),
        }
    }

    /// Sets the width for a pair (order does not matter).
    pub fn insert(&mut self, a: BiomeId, b: BiomeId, width: i32) {
        self.explicit.insert(Self::key(a, b), width.max(1));
    }

    /// Width for a pair (order does not matter).
    #[must_use]
    pub fn get(&self, a: BiomeId, b: BiomeId) -> i32 {
        if let Some(&width) = self.explicit.get(&Self::key(a, b)) {
            return width;
        }
        Self::category_width(a.category(), b.category())
    }

    /// Default width for two categories.
    #[must_use]
    pub const fn category_width(a: BiomeCategory, b: BiomeCategory) -> i32 {
        let base = match (a.is_water(), a.is_coastal(), b.is_water(), b.is_coastal()) {
            (true, _, true, _) => Self::WATER_WATER,
            (true, _, _, true) | (_, true, true, _) => Self::WATER_COASTAL,
            (true, ..) | (_, _, true, _) => Self::WATER_LAND,
            (_, true, _, true) => Self::COASTAL_COASTAL,
            (_, true, ..) | (.., true) => Self::COASTAL_LAND,
            _ => Self::LAND_LAND,
        };
        if matches!(a, BiomeCategory::Mountain) || matches!(b, BiomeCategory::Mountain) {
            base + Self::MOUNTAIN_BONUS
        } else {
            base
        }
    }

    fn key(a: BiomeId, b: BiomeId) -> (BiomeId, BiomeId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl Default for TransitionWidthTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes [`BiomeEnvironmentSample`]s.
#[derive(Clone, Debug)]
pub struct BiomeEnvironmentAnalyzer {
    sample_radius: i32,
    min_transition_weight: f64,
    widths: TransitionWidthTable,
}

impl BiomeEnvironmentAnalyzer {
    /// Biome assumed when the column itself is unset.
    pub const FALLBACK_BIOME: BiomeId = BiomeId::PLAINS;

    /// Creates an analyzer from the blend settings.
    #[must_use]
    pub fn new(config: &BlendConfig, widths: TransitionWidthTable) -> Self {
        Self {
            sample_radius: config.sample_radius.clamp(1, 3),
            min_transition_weight: config.min_transition_weight,
            widths,
        }
    }

    /// Width table in use.
    #[must_use]
    pub const fn widths(&self) -> &TransitionWidthTable {
        &self.widths
    }

    /// Analyzes the neighborhood of column `(local_x, local_z)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn analyze(&self, grid: &dyn BiomeGrid, local_x: i32, local_z: i32) -> BiomeEnvironmentSample {
        let size = CHUNK_SIZE as i32;
        let center_biome = grid
            .biome(local_x, local_z)
            .unwrap_or(Self::FALLBACK_BIOME);

        let mut biome_weights: BTreeMap<BiomeId, f64> = BTreeMap::new();
        let mut nearest: BTreeMap<BiomeId, i32> = BTreeMap::new();

        let r = self.sample_radius;
        for dx in -r..=r {
            for dz in -r..=r {
                let x = local_x + dx;
                let z = local_z + dz;
                if x < 0 || x >= size || z < 0 || z >= size {
                    continue;
                }

                let biome = grid.biome(x, z).unwrap_or(center_biome);
                let distance = dx.abs().max(dz.abs());
                let weight = 1.0 / (1.0 + f64::from(distance) * 0.5);

                *biome_weights.entry(biome).or_insert(0.0) += weight;
                nearest
                    .entry(biome)
                    .and_modify(|d| *d = (*d).min(distance))
                    .or_insert(distance);
            }
        }

        // An out-of-chunk column still knows its own biome
        if biome_weights.is_empty() {
            biome_weights.insert(center_biome, 1.0);
        }

        let is_uniform = biome_weights.len() <= 1;
        let mut transitions = BTreeMap::new();

        if !is_uniform {
            let total: f64 = biome_weights.values().sum();
            for (&biome, &weight) in &biome_weights {
                if biome == center_biome || weight <= self.min_transition_weight {
                    continue;
                }
                transitions.insert(
                    biome,
                    TransitionInfo {
                        influence: (weight / total).clamp(0.0, 1.0),
                        transition_width: self.widths.get(center_biome, biome),
                        nearest_distance: nearest.get(&biome).copied().unwrap_or(r),
                    },
                );
            }
        }

        BiomeEnvironmentSample {
            center_biome,
            biome_weights,
            is_uniform,
            transitions,
        }
    }
}

impl Default for BiomeEnvironmentAnalyzer {
    fn default() -> Self {
        Self::new(&BlendConfig::default(), TransitionWidthTable::new())
    }
}
