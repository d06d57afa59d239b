//! # Climate Biome Source
//!
//! World-space biome provider driven by three noise channels:
//! - Elevation (oceans, coasts, mountains)
//! - Temperature (lowered by elevation)
//! - Humidity
//!
//! Each channel is a 4-octave simplex stack seeded from its own derived
//! seed, so the source never disturbs the terrain noise streams.

use crate::biome::{BiomeGrid, BiomeId, BiomeSource};
use crate::noise::SimplexOctaveGenerator;
use crate::random::{ChaChaRandom, WorldSeed};

/// Biomes from a simple climate model.
#[derive(Clone, Debug)]
pub struct ClimateBiomeSource {
    temperature: SimplexOctaveGenerator,
    humidity: SimplexOctaveGenerator,
    elevation: SimplexOctaveGenerator,
}

impl ClimateBiomeSource {
    /// Octaves per channel.
    const OCTAVES: usize = 4;
    /// Scale for temperature noise (larger = more gradual changes).
    const TEMPERATURE_SCALE: f64 = 0.002;
    /// Scale for humidity noise.
    const HUMIDITY_SCALE: f64 = 0.003;
    /// Scale for elevation noise.
    const ELEVATION_SCALE: f64 = 0.0025;

    /// Creates a source from a world seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        let channel = |purpose: u64, scale: f64| {
            let mut random = ChaChaRandom::new(seed.derive(purpose));
            let mut stack = SimplexOctaveGenerator::new(&mut random, Self::OCTAVES, 1, 1, 1);
            stack.set_scale(scale);
            stack
        };
        Self {
            temperature: channel(1, Self::TEMPERATURE_SCALE),
            humidity: channel(2, Self::HUMIDITY_SCALE),
            elevation: channel(3, Self::ELEVATION_SCALE),
        }
    }

    /// Elevation in roughly `[-1, 1]`.
    #[must_use]
    pub fn elevation(&self, world_x: i32, world_z: i32) -> f64 {
        Self::sample(&self.elevation, world_x, world_z)
    }

    /// Temperature in `[-1, 1]`; high ground is colder.
    #[must_use]
    pub fn temperature(&self, world_x: i32, world_z: i32, elevation: f64) -> f64 {
        let base = Self::sample(&self.temperature, world_x, world_z);
        (base - elevation.max(0.0) * 0.5).clamp(-1.0, 1.0)
    }

    /// Humidity in roughly `[-1, 1]`.
    #[must_use]
    pub fn humidity(&self, world_x: i32, world_z: i32) -> f64 {
        Self::sample(&self.humidity, world_x, world_z)
    }

    /// Biome at a block column.
    #[must_use]
    pub fn classify(&self, world_x: i32, world_z: i32) -> BiomeId {
        let elevation = self.elevation(world_x, world_z);
        let temperature = self.temperature(world_x, world_z, elevation);
        let humidity = self.humidity(world_x, world_z);
        Self::classify_from_climate(elevation, temperature, humidity)
    }

    fn sample(stack: &SimplexOctaveGenerator, world_x: i32, world_z: i32) -> f64 {
        stack.sample_3d(f64::from(world_x), 0.0, f64::from(world_z), 2.0, 0.5, true)
    }

    fn classify_from_climate(elevation: f64, temperature: f64, humidity: f64) -> BiomeId {
        if elevation < -0.5 {
            return BiomeId::DEEP_OCEAN;
        }
        if elevation < -0.2 {
            return BiomeId::OCEAN;
        }
        if elevation < -0.1 {
            return BiomeId::BEACH;
        }

        if elevation > 0.7 {
            if temperature < -0.2 {
                return BiomeId::ICE_MOUNTAINS;
            }
            return BiomeId::MOUNTAINS;
        }

        match (temperature, humidity) {
            // Cold
            (t, _) if t < -0.5 => BiomeId::ICE_PLAINS,
            (t, h) if t < -0.2 && h > 0.0 => BiomeId::TAIGA,
            (t, _) if t < -0.2 => BiomeId::ICE_PLAINS,

            // Hot
            (t, h) if t > 0.5 && h < -0.3 => BiomeId::DESERT,
            (t, h) if t > 0.5 && h > 0.5 => BiomeId::JUNGLE,
            (t, h) if t > 0.3 && h < 0.0 => BiomeId::SAVANNA,
            (t, _) if t > 0.6 => BiomeId::MESA,

            // Temperate
            (_, h) if h > 0.5 && elevation < 0.1 => BiomeId::SWAMP,
            (_, h) if h > 0.2 => BiomeId::FOREST,
            _ => BiomeId::PLAINS,
        }
    }
}

impl BiomeSource for ClimateBiomeSource {
    fn biome_at(&self, world_x: i32, world_z: i32) -> Option<BiomeId> {
        Some(self.classify(world_x, world_z))
    }
}

impl BiomeGrid for ClimateBiomeSource {
    /// Treats local coordinates as world coordinates (chunk at the origin).
    fn biome(&self, local_x: i32, local_z: i32) -> Option<BiomeId> {
        self.biome_at(local_x, local_z)
    }
}
