//! # Gradient Noise
//!
//! Single-octave samplers ([`PerlinNoise`], [`SimplexNoise`]) and the octave
//! stacks built from them.
//!
//! ## Determinism Guarantee
//!
//! A sampler is fully described by its permutation table and coordinate
//! offsets, both drawn from a [`RandomSource`](crate::random::RandomSource)
//! in a fixed order. Sampling itself is pure `f64` arithmetic, so the same
//! stream gives the same values on every run.

pub mod octave;
pub mod perlin;
pub mod simplex;
pub mod world_octaves;

pub use octave::{NoiseSampler, OctaveNoiseGenerator, PerlinOctaveGenerator, SimplexOctaveGenerator};
pub use perlin::PerlinNoise;
pub use simplex::SimplexNoise;
pub use world_octaves::WorldOctaves;

use crate::random::RandomSource;

/// Shuffled permutation plus coordinate offsets of one noise octave.
///
/// Draw order: three `next_int` calls for the x/y/z offsets, then one bounded
/// draw per Fisher-Yates step.
#[derive(Clone, Debug)]
pub(crate) struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
    /// Offsets added to every sample coordinate, each in `[0, 256)`.
    pub(crate) offset: [f64; 3],
}

impl PermutationTable {
    pub(crate) fn from_random<R: RandomSource + ?Sized>(random: &mut R) -> Self {
        let offset = [
            unit_offset(random.next_int()),
            unit_offset(random.next_int()),
            unit_offset(random.next_int()),
        ];

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }
        for i in 0..256 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let span = (256 - i) as i32;
            #[allow(clippy::cast_sign_loss)]
            let j = i + random.next_bounded_int(span) as usize;
            perm.swap(i, j);
        }
        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm, offset }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    pub(crate) fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// Maps a raw `i32` draw onto `[0, 256)`.
#[inline]
fn unit_offset(draw: i32) -> f64 {
    #[allow(clippy::cast_sign_loss)]
    let bits = draw as u32;
    f64::from(bits) / 4_294_967_296.0 * 256.0
}

/// Period applied to scaled octave coordinates before sampling.
///
/// A multiple of the 256-cell permutation period, so Perlin octaves are
/// unchanged by the wrap.
pub const COORDINATE_PERIOD: f64 = 16_777_216.0;

/// Folds a scaled coordinate into `[-P/2, P/2]` with `P` the coordinate period.
///
/// Identity for `|v| < P/2`. Keeps [`fast_floor`] far from the `i32` limits
/// at any world position.
#[inline]
#[must_use]
pub fn wrap_coordinate(v: f64) -> f64 {
    v - (v / COORDINATE_PERIOD).round() * COORDINATE_PERIOD
}

/// Fast floor for f64 -> i32.
///
/// Inputs must stay inside the `i32` range; the octave stacks wrap their
/// coordinates with [`wrap_coordinate`] first.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

/// Wraps a lattice coordinate to a permutation index.
#[inline]
#[allow(clippy::cast_sign_loss)]
pub(crate) fn wrap(i: i32) -> usize {
    (i & 255) as usize
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1).
#[inline]
#[must_use]
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ChaChaRandom, WorldSeed};

    #[test]
    fn test_permutation_is_a_permutation() {
        let mut random = ChaChaRandom::new(WorldSeed::new(3));
        let table = PermutationTable::from_random(&mut random);

        let mut seen = [false; 256];
        for i in 0..256 {
            seen[table.get(i)] = true;
            assert_eq!(table.get(i), table.get(i + 256));
        }
        assert!(seen.iter().all(|&s| s));
        assert!(table.offset.iter().all(|o| (0.0..256.0).contains(o)));
    }

    #[test]
    fn test_fast_floor() {
        assert_eq!(fast_floor(1.5), 1);
        assert_eq!(fast_floor(-1.5), -2);
        assert_eq!(fast_floor(-2.0), -2);
        assert_eq!(fast_floor(0.0), 0);
    }

    #[test]
    fn test_wrap_coordinate() {
        for v in [0.0, 1.5, -1.5, 8_000_000.25, -8_000_000.25] {
            assert_eq!(wrap_coordinate(v).to_bits(), v.to_bits());
        }
        for v in [3.0e9, -3.0e9, 1.0e12, -7.5e15] {
            let wrapped = wrap_coordinate(v);
            assert!(wrapped.abs() <= COORDINATE_PERIOD / 2.0, "{v} -> {wrapped}");
            let steps = (v - wrapped) / COORDINATE_PERIOD;
            assert_eq!(steps, steps.round());
        }
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(0.0, 3.0, 9.0), 3.0);
        assert!((lerp(1.0, 3.0, 9.0) - 9.0).abs() < 1e-12);
        assert!((lerp(0.5, 3.0, 9.0) - 6.0).abs() < 1e-12);
    }
}
