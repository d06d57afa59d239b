//! # Simplex Noise (3D / 4D)
//!
//! Skewed-lattice gradient noise. Shares the permutation and offset seeding
//! of [`PerlinNoise`](super::PerlinNoise), with one extra offset draw for the
//! fourth axis.
//!
//! Output lies in roughly `[-1, 1]`.

use super::octave::NoiseSampler;
use super::{fast_floor, wrap, PermutationTable};
use crate::random::RandomSource;

/// 12 edge gradients for the 3D simplex.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// 32 edge gradients for the 4D simplex.
const GRAD4: [[f64; 4]; 32] = [
    [0.0, 1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0, -1.0],
    [0.0, 1.0, -1.0, 1.0],
    [0.0, 1.0, -1.0, -1.0],
    [0.0, -1.0, 1.0, 1.0],
    [0.0, -1.0, 1.0, -1.0],
    [0.0, -1.0, -1.0, 1.0],
    [0.0, -1.0, -1.0, -1.0],
    [1.0, 0.0, 1.0, 1.0],
    [1.0, 0.0, 1.0, -1.0],
    [1.0, 0.0, -1.0, 1.0],
    [1.0, 0.0, -1.0, -1.0],
    [-1.0, 0.0, 1.0, 1.0],
    [-1.0, 0.0, 1.0, -1.0],
    [-1.0, 0.0, -1.0, 1.0],
    [-1.0, 0.0, -1.0, -1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0, -1.0],
    [1.0, -1.0, 0.0, 1.0],
    [1.0, -1.0, 0.0, -1.0],
    [-1.0, 1.0, 0.0, 1.0],
    [-1.0, 1.0, 0.0, -1.0],
    [-1.0, -1.0, 0.0, 1.0],
    [-1.0, -1.0, 0.0, -1.0],
    [1.0, 1.0, 1.0, 0.0],
    [1.0, 1.0, -1.0, 0.0],
    [1.0, -1.0, 1.0, 0.0],
    [1.0, -1.0, -1.0, 0.0],
    [-1.0, 1.0, 1.0, 0.0],
    [-1.0, 1.0, -1.0, 0.0],
    [-1.0, -1.0, 1.0, 0.0],
    [-1.0, -1.0, -1.0, 0.0],
];

/// Single-octave simplex noise in three and four dimensions.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    table: PermutationTable,
    offset_w: f64,
}

impl SimplexNoise {
    /// Skewing factor for 3D.
    const F3: f64 = 1.0 / 3.0;
    /// Unskewing factor for 3D.
    const G3: f64 = 1.0 / 6.0;
    /// Skewing factor for 4D: (sqrt(5) - 1) / 4.
    const F4: f64 = 0.309_016_994_374_947_4;
    /// Unskewing factor for 4D: (5 - sqrt(5)) / 20.
    const G4: f64 = 0.138_196_601_125_010_5;

    /// Seeds a new octave: the shared permutation draws, then the w offset.
    pub fn new<R: RandomSource + ?Sized>(random: &mut R) -> Self {
        let table = PermutationTable::from_random(random);
        #[allow(clippy::cast_sign_loss)]
        let offset_w = f64::from(random.next_int() as u32) / 4_294_967_296.0 * 256.0;
        Self { table, offset_w }
    }

    /// Samples 3D simplex noise.
    #[must_use]
    #[allow(
        clippy::many_single_char_names,
        clippy::similar_names,
        clippy::cast_precision_loss
    )]
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let x = x + self.table.offset[0];
        let y = y + self.table.offset[1];
        let z = z + self.table.offset[2];

        let s = (x + y + z) * Self::F3;
        let i = fast_floor(x + s);
        let j = fast_floor(y + s);
        let k = fast_floor(z + s);

        let t = f64::from(i + j + k) * Self::G3;
        let x0 = x - (f64::from(i) - t);
        let y0 = y - (f64::from(j) - t);
        let z0 = z - (f64::from(k) - t);

        // Which of the six tetrahedra we are in
        let (i1, j1, k1, i2, j2, k2): (usize, usize, usize, usize, usize, usize) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f64 + Self::G3;
        let y1 = y0 - j1 as f64 + Self::G3;
        let z1 = z0 - k1 as f64 + Self::G3;
        let x2 = x0 - i2 as f64 + 2.0 * Self::G3;
        let y2 = y0 - j2 as f64 + 2.0 * Self::G3;
        let z2 = z0 - k2 as f64 + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        let p = &self.table;
        let (ii, jj, kk) = (wrap(i), wrap(j), wrap(k));
        let gi0 = p.get(ii + p.get(jj + p.get(kk))) % 12;
        let gi1 = p.get(ii + i1 + p.get(jj + j1 + p.get(kk + k1))) % 12;
        let gi2 = p.get(ii + i2 + p.get(jj + j2 + p.get(kk + k2))) % 12;
        let gi3 = p.get(ii + 1 + p.get(jj + 1 + p.get(kk + 1))) % 12;

        let n0 = corner_3d(gi0, x0, y0, z0);
        let n1 = corner_3d(gi1, x1, y1, z1);
        let n2 = corner_3d(gi2, x2, y2, z2);
        let n3 = corner_3d(gi3, x3, y3, z3);

        32.0 * (n0 + n1 + n2 + n3)
    }

    /// Samples 4D simplex noise.
    #[must_use]
    #[allow(
        clippy::many_single_char_names,
        clippy::similar_names,
        clippy::cast_precision_loss
    )]
    pub fn noise_4d(&self, x: f64, y: f64, z: f64, w: f64) -> f64 {
        let x = x + self.table.offset[0];
        let y = y + self.table.offset[1];
        let z = z + self.table.offset[2];
        let w = w + self.offset_w;

        let s = (x + y + z + w) * Self::F4;
        let i = fast_floor(x + s);
        let j = fast_floor(y + s);
        let k = fast_floor(z + s);
        let l = fast_floor(w + s);

        let t = f64::from(i + j + k + l) * Self::G4;
        let x0 = x - (f64::from(i) - t);
        let y0 = y - (f64::from(j) - t);
        let z0 = z - (f64::from(k) - t);
        let w0 = w - (f64::from(l) - t);

        // Rank the coordinates to pick the simplex traversal order
        let mut rank = [0usize; 4];
        let coords = [x0, y0, z0, w0];
        for a in 0..4 {
            for b in (a + 1)..4 {
                if coords[a] > coords[b] {
                    rank[a] += 1;
                } else {
                    rank[b] += 1;
                }
            }
        }
        let step = |threshold: usize| -> [usize; 4] {
            [
                usize::from(rank[0] >= threshold),
                usize::from(rank[1] >= threshold),
                usize::from(rank[2] >= threshold),
                usize::from(rank[3] >= threshold),
            ]
        };
        let o1 = step(3);
        let o2 = step(2);
        let o3 = step(1);

        let corner = |o: [usize; 4], g: f64| -> [f64; 4] {
            [
                x0 - o[0] as f64 + g,
                y0 - o[1] as f64 + g,
                z0 - o[2] as f64 + g,
                w0 - o[3] as f64 + g,
            ]
        };
        let c0 = [x0, y0, z0, w0];
        let c1 = corner(o1, Self::G4);
        let c2 = corner(o2, 2.0 * Self::G4);
        let c3 = corner(o3, 3.0 * Self::G4);
        let c4 = corner([1, 1, 1, 1], 4.0 * Self::G4);

        let p = &self.table;
        let (ii, jj, kk, ll) = (wrap(i), wrap(j), wrap(k), wrap(l));
        let hash = |o: [usize; 4]| -> usize {
            p.get(ii + o[0] + p.get(jj + o[1] + p.get(kk + o[2] + p.get(ll + o[3])))) % 32
        };

        let n0 = corner_4d(hash([0, 0, 0, 0]), c0);
        let n1 = corner_4d(hash(o1), c1);
        let n2 = corner_4d(hash(o2), c2);
        let n3 = corner_4d(hash(o3), c3);
        let n4 = corner_4d(hash([1, 1, 1, 1]), c4);

        27.0 * (n0 + n1 + n2 + n3 + n4)
    }
}

impl NoiseSampler for SimplexNoise {
    const AMPLITUDE_DECAY: f64 = 0.93;

    fn from_random<R: RandomSource + ?Sized>(random: &mut R) -> Self {
        Self::new(random)
    }

    #[inline]
    fn noise_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise(x, y, z)
    }
}

#[inline]
fn corner_3d(gradient: usize, x: f64, y: f64, z: f64) -> f64 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        return 0.0;
    }
    let g = &GRAD3[gradient];
    let t2 = t * t;
    t2 * t2 * (g[0] * x + g[1] * y + g[2] * z)
}

#[inline]
fn corner_4d(gradient: usize, c: [f64; 4]) -> f64 {
    let t = 0.6 - c[0] * c[0] - c[1] * c[1] - c[2] * c[2] - c[3] * c[3];
    if t < 0.0 {
        return 0.0;
    }
    let g = &GRAD4[gradient];
    let t2 = t * t;
    t2 * t2 * (g[0] * c[0] + g[1] * c[1] + g[2] * c[2] + g[3] * c[3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ChaChaRandom, WorldSeed};

    fn noise(seed: u64) -> SimplexNoise {
        SimplexNoise::new(&mut ChaChaRandom::new(WorldSeed::new(seed)))
    }

    #[test]
    fn test_determinism() {
        let a = noise(42);
        let b = noise(42);
        for i in 0..200 {
            let t = f64::from(i) * 0.41;
            assert_eq!(
                a.noise(t, -t, t * 0.3).to_bits(),
                b.noise(t, -t, t * 0.3).to_bits()
            );
            assert_eq!(
                a.noise_4d(t, -t, t * 0.3, t * 2.0).to_bits(),
                b.noise_4d(t, -t, t * 0.3, t * 2.0).to_bits()
            );
        }
    }

    #[test]
    fn test_range_3d() {
        let n = noise(11);
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for i in 0..20_000 {
            let t = f64::from(i);
            let v = n.noise(t * 0.0731, t * 0.0113, t * -0.0527);
            assert!(v.is_finite());
            min = min.min(v);
            max = max.max(v);
        }
        println!("3D simplex range: [{min:.3}, {max:.3}]");
        assert!(min >= -1.1 && max <= 1.1);
        assert!(max - min > 0.5, "noise looks flat");
    }

    #[test]
    fn test_range_4d() {
        let n = noise(12);
        for i in 0..20_000 {
            let t = f64::from(i);
            let v = n.noise_4d(t * 0.0731, t * 0.0113, t * -0.0527, t * 0.019);
            assert!(v.is_finite());
            assert!((-1.2..=1.2).contains(&v), "value out of range: {v}");
        }
    }

    #[test]
    fn test_continuity() {
        let n = noise(13);
        let mut prev = n.noise(0.0, 0.5, 0.25);
        for i in 1..1000 {
            let x = f64::from(i) * 0.001;
            let value = n.noise(x, 0.5, 0.25);
            assert!((value - prev).abs() < 0.05, "jump at x={x}");
            prev = value;
        }
    }
}
