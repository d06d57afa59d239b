//! Improved Perlin noise, one octave.

use super::octave::NoiseSampler;
use super::{fast_floor, lerp, wrap, PermutationTable};
use crate::random::RandomSource;

/// Single-octave 3D Perlin noise.
///
/// Output lies roughly in `[-1, 1]` and is exactly zero on integer lattice
/// points (after offsets).
#[derive(Clone, Debug)]
pub struct PerlinNoise {
    table: PermutationTable,
}

impl PerlinNoise {
    /// Seeds a new octave from the stream (3 offset draws, then the shuffle).
    pub fn new<R: RandomSource + ?Sized>(random: &mut R) -> Self {
        Self {
            table: PermutationTable::from_random(random),
        }
    }

    /// Samples the noise at a point.
    #[must_use]
    #[allow(clippy::many_single_char_names, clippy::similar_names)]
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let x = x + self.table.offset[0];
        let y = y + self.table.offset[1];
        let z = z + self.table.offset[2];

        let fx = fast_floor(x);
        let fy = fast_floor(y);
        let fz = fast_floor(z);

        let x = x - f64::from(fx);
        let y = y - f64::from(fy);
        let z = z - f64::from(fz);

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let p = &self.table;
        let (xi, yi, zi) = (wrap(fx), wrap(fy), wrap(fz));

        let a = p.get(xi) + yi;
        let aa = p.get(a) + zi;
        let ab = p.get(a + 1) + zi;
        let b = p.get(xi + 1) + yi;
        let ba = p.get(b) + zi;
        let bb = p.get(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p.get(aa), x, y, z), grad(p.get(ba), x - 1.0, y, z)),
                lerp(
                    u,
                    grad(p.get(ab), x, y - 1.0, z),
                    grad(p.get(bb), x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p.get(aa + 1), x, y, z - 1.0),
                    grad(p.get(ba + 1), x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p.get(ab + 1), x, y - 1.0, z - 1.0),
                    grad(p.get(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }
}

impl NoiseSampler for PerlinNoise {
    const AMPLITUDE_DECAY: f64 = 1.0;

    fn from_random<R: RandomSource + ?Sized>(random: &mut R) -> Self {
        Self::new(random)
    }

    #[inline]
    fn noise_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise(x, y, z)
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Dot product with one of 12 edge gradients (16 hash slots).
#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ChaChaRandom, WorldSeed};

    fn noise(seed: u64) -> PerlinNoise {
        PerlinNoise::new(&mut ChaChaRandom::new(WorldSeed::new(seed)))
    }

    #[test]
    fn test_determinism() {
        let a = noise(42);
        let b = noise(42);
        for i in 0..200 {
            let t = f64::from(i) * 0.37;
            assert_eq!(
                a.noise(t, t * 0.5, -t).to_bits(),
                b.noise(t, t * 0.5, -t).to_bits()
            );
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let a = noise(1);
        let b = noise(2);
        let differs = (0..50).any(|i| {
            let t = f64::from(i) * 1.13;
            (a.noise(t, 0.0, t) - b.noise(t, 0.0, t)).abs() > 1e-9
        });
        assert!(differs);
    }

    #[test]
    fn test_range() {
        let n = noise(7);
        for i in 0..10_000 {
            let t = f64::from(i);
            let v = n.noise(t * 0.173, t * 0.031, t * -0.219);
            assert!(v.is_finite());
            assert!((-1.1..=1.1).contains(&v), "value out of range: {v}");
        }
    }

    #[test]
    fn test_continuity() {
        let n = noise(9);
        let mut prev = n.noise(0.0, 0.0, 0.0);
        for i in 1..1000 {
            let x = f64::from(i) * 0.001;
            let value = n.noise(x, 0.0, 0.0);
            assert!((value - prev).abs() < 0.05, "jump at x={x}");
            prev = value;
        }
    }
}
