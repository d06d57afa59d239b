//! # Octave Noise Stacks
//!
//! An [`OctaveNoiseGenerator`] owns N independent single-octave samplers,
//! seeded one after another from a single random stream, plus per-axis
//! scales and a dense grid size.
//!
//! ## Design
//!
//! Two evaluation modes:
//!
//! - **Point sampling** (`sample_3d` / `sample_4d`): frequency is multiplied
//!   by `frequency` each octave, amplitude by `amplitude * k` where `k` is the
//!   sampler's decay constant (1.0 Perlin, 0.93 Simplex 3D, 0.91 Simplex 4D).
//! - **Grid evaluation** (`fractal_brownian_motion`): the same octave sum over
//!   every cell of the configured `size_x * size_y * size_z` grid, written
//!   into one flat buffer. The density lattice reads its four noise fields
//!   this way.
//!
//! Scaled coordinates are folded by [`wrap_coordinate`] before each octave
//! sample, so far-out chunks sample the same range as chunks near the origin.
//!
//! Grid layout: cell `(i, j, k)` (x, y, z offsets from the origin) lives at
//! `(i * size_z + k) * size_y + j`, so a vertical run is contiguous.

use super::perlin::PerlinNoise;
use super::wrap_coordinate;
use super::simplex::SimplexNoise;
use crate::random::RandomSource;

/// A single octave of 3D gradient noise.
pub trait NoiseSampler: Send + Sync + Sized {
    /// Per-octave amplitude decay constant.
    const AMPLITUDE_DECAY: f64;

    /// Seeds one octave from the stream.
    fn from_random<R: RandomSource + ?Sized>(random: &mut R) -> Self;

    /// Samples the octave at a point.
    fn noise_3d(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Stack of Perlin octaves.
pub type PerlinOctaveGenerator = OctaveNoiseGenerator<PerlinNoise>;

/// Stack of Simplex octaves.
pub type SimplexOctaveGenerator = OctaveNoiseGenerator<SimplexNoise>;

/// Ordered stack of noise octaves with per-axis scaling.
///
/// Immutable after construction and therefore freely shared between threads.
#[derive(Clone, Debug)]
pub struct OctaveNoiseGenerator<N> {
    octaves: Vec<N>,
    x_scale: f64,
    y_scale: f64,
    z_scale: f64,
    w_scale: f64,
    size_x: usize,
    size_y: usize,
    size_z: usize,
}

impl<N: NoiseSampler> OctaveNoiseGenerator<N> {
    /// Seeds `octave_count` octaves in order from `random`.
    ///
    /// All scales start at 1.0.
    pub fn new<R: RandomSource + ?Sized>(
        random: &mut R,
        octave_count: usize,
        size_x: usize,
        size_y: usize,
        size_z: usize,
    ) -> Self {
        let octaves = (0..octave_count).map(|_| N::from_random(random)).collect();
        Self {
            octaves,
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            w_scale: 1.0,
            size_x,
            size_y,
            size_z,
        }
    }

    /// Sets the x/y/z scales.
    #[must_use]
    pub fn with_scale(mut self, x_scale: f64, y_scale: f64, z_scale: f64) -> Self {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
        self.z_scale = z_scale;
        self
    }

    /// Sets every scale, including w, to the same value.
    pub fn set_scale(&mut self, scale: f64) {
        self.x_scale = scale;
        self.y_scale = scale;
        self.z_scale = scale;
        self.w_scale = scale;
    }

    /// Sets the x scale.
    pub fn set_x_scale(&mut self, scale: f64) {
        self.x_scale = scale;
    }

    /// Sets the y scale.
    pub fn set_y_scale(&mut self, scale: f64) {
        self.y_scale = scale;
    }

    /// Sets the z scale.
    pub fn set_z_scale(&mut self, scale: f64) {
        self.z_scale = scale;
    }

    /// Number of octaves.
    #[inline]
    #[must_use]
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }

    /// Current `(x, y, z, w)` scales.
    #[inline]
    #[must_use]
    pub const fn scales(&self) -> (f64, f64, f64, f64) {
        (self.x_scale, self.y_scale, self.z_scale, self.w_scale)
    }

    /// Dense grid size `(size_x, size_y, size_z)`.
    #[inline]
    #[must_use]
    pub const fn grid_size(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Number of values `fractal_brownian_motion` produces.
    #[inline]
    #[must_use]
    pub const fn grid_len(&self) -> usize {
        self.size_x * self.size_y * self.size_z
    }

    /// Flat index of grid cell `(i, j, k)`.
    #[inline]
    #[must_use]
    pub const fn grid_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.size_z + k) * self.size_y + j
    }

    /// Sum of the per-octave amplitudes for a given amplitude factor.
    #[must_use]
    pub fn amplitude_sum(&self, amplitude: f64) -> f64 {
        amplitude_sum(self.octaves.len(), amplitude, N::AMPLITUDE_DECAY)
    }

    /// Octave sum at a single point.
    ///
    /// With `normalized` the result is divided by the amplitude sum (skipped
    /// when that sum is not strictly positive).
    #[must_use]
    pub fn sample_3d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        frequency: f64,
        amplitude: f64,
        normalized: bool,
    ) -> f64 {
        let mut result = 0.0;
        let mut freq = 1.0;
        let mut amp = 1.0;
        let mut max = 0.0;

        for octave in &self.octaves {
            result += octave.noise_3d(
                wrap_coordinate(x * self.x_scale * freq),
                wrap_coordinate(y * self.y_scale * freq),
                wrap_coordinate(z * self.z_scale * freq),
            ) * amp;
            max += amp;
            freq *= frequency;
            amp *= amplitude * N::AMPLITUDE_DECAY;
        }

        normalize(result, max, normalized)
    }

    /// Octave sum over the whole grid, as a new buffer.
    #[must_use]
    pub fn fractal_brownian_motion(
        &self,
        x: f64,
        y: f64,
        z: f64,
        frequency: f64,
        amplitude: f64,
    ) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.grid_len());
        self.fractal_brownian_motion_into(x, y, z, frequency, amplitude, &mut out);
        out
    }

    /// Octave sum over the whole grid, into a reused buffer.
    ///
    /// `out` is cleared and resized to exactly [`grid_len`](Self::grid_len).
    /// Each octave halves/doubles like `sample_3d`: at octave `o` cell
    /// `(i, j, k)` samples `((x + i) * xs * f, (y + j) * ys * f, (z + k) * zs * f)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn fractal_brownian_motion_into(
        &self,
        x: f64,
        y: f64,
        z: f64,
        frequency: f64,
        amplitude: f64,
        out: &mut Vec<f64>,
    ) {
        out.clear();
        out.resize(self.grid_len(), 0.0);

        let mut freq = 1.0;
        let mut amp = 1.0;

        for octave in &self.octaves {
            let sx = self.x_scale * freq;
            let sy = self.y_scale * freq;
            let sz = self.z_scale * freq;

            let mut index = 0;
            for i in 0..self.size_x {
                let px = wrap_coordinate((x + i as f64) * sx);
                for k in 0..self.size_z {
                    let pz = wrap_coordinate((z + k as f64) * sz);
                    for j in 0..self.size_y {
                        let py = wrap_coordinate((y + j as f64) * sy);
                        out[index] += octave.noise_3d(px, py, pz) * amp;
                        index += 1;
                    }
                }
            }

            freq *= frequency;
            amp *= amplitude * N::AMPLITUDE_DECAY;
        }
    }
}

impl OctaveNoiseGenerator<SimplexNoise> {
    /// Amplitude decay of the 4D stack.
    pub const AMPLITUDE_DECAY_4D: f64 = 0.91;

    /// Sets the w scale.
    pub fn set_w_scale(&mut self, scale: f64) {
        self.w_scale = scale;
    }

    /// Octave sum of 4D simplex noise at a single point.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn sample_4d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        w: f64,
        frequency: f64,
        amplitude: f64,
        normalized: bool,
    ) -> f64 {
        let mut result = 0.0;
        let mut freq = 1.0;
        let mut amp = 1.0;
        let mut max = 0.0;

        for octave in &self.octaves {
            result += octave.noise_4d(
                wrap_coordinate(x * self.x_scale * freq),
                wrap_coordinate(y * self.y_scale * freq),
                wrap_coordinate(z * self.z_scale * freq),
                wrap_coordinate(w * self.w_scale * freq),
            ) * amp;
            max += amp;
            freq *= frequency;
            amp *= amplitude * Self::AMPLITUDE_DECAY_4D;
        }

        normalize(result, max, normalized)
    }
}

fn amplitude_sum(octaves: usize, amplitude: f64, decay: f64) -> f64 {
    let mut sum = 0.0;
    let mut amp = 1.0;
    for _ in 0..octaves {
        sum += amp;
        amp *= amplitude * decay;
    }
    sum
}

#[inline]
fn normalize(result: f64, max: f64, normalized: bool) -> f64 {
    if normalized && max > 0.0 {
        result / max
    } else {
        result
    }
}
