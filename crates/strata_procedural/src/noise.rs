//! # Gradient Noise
//!
//! Seeded 3D gradient (Perlin-style) noise for density fields.
//!
//! ## Determinism Guarantee
//!
//! Given the same `Seed`, every sample is bit-identical on every run. The
//! permutation is built with integer arithmetic only and sampling never
//! touches global state, so one `GradientNoise` can be shared across threads.

/// Seed for deterministic generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seed(u64);

impl Seed {
    /// Creates a new seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent seed for a sub-generator (caves, surface, ...).
    #[inline]
    #[must_use]
    pub const fn derive(self, stream: u64) -> Self {
        Self(splitmix64(self.0 ^ stream.wrapping_mul(0xA24B_AED4_963E_E407)))
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self(0x5EED_0F_57A7A)
    }
}

/// One step of SplitMix64.
const fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seeded lattice permutation, doubled so `perm[i + j]` never wraps.
#[derive(Clone)]
struct Lattice {
    perm: [u8; 512],
}

impl Lattice {
    fn new(seed: Seed) -> Self {
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates driven by SplitMix64.
        let mut state = seed.value();
        for i in (1..256usize).rev() {
            state = splitmix64(state);
            let j = (state % (i as u64 + 1)) as usize;
            table.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);
        Self { perm }
    }

    #[inline]
    fn hash(&self, index: usize) -> usize {
        usize::from(self.perm[index])
    }
}

/// Dot product of the offset with one of the 12 cube-edge gradients.
///
/// Hashes 12..16 repeat four of them so the lookup stays a mask.
#[inline]
fn gradient(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    match hash & 15 {
        0 | 12 => x + y,
        1 | 13 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 | 14 => -y + z,
        10 => y - z,
        _ => -y - z,
    }
}

/// Quintic fade `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// 3D gradient noise generator.
///
/// Samples are continuous, zero at every integer lattice point and stay
/// within roughly `[-1, 1]`.
///
/// # Example
///
/// ```rust
/// use strata_procedural::{GradientNoise, Seed};
///
/// let noise = GradientNoise::new(Seed::new(42));
/// let v = noise.sample(10.5, 3.25, -7.75);
/// assert!(v.abs() <= 1.25);
/// assert_eq!(noise.sample(4.0, 5.0, 6.0), 0.0);
/// ```
#[derive(Clone)]
pub struct GradientNoise {
    lattice: Lattice,
}

impl GradientNoise {
    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: Seed) -> Self {
        Self {
            lattice: Lattice::new(seed),
        }
    }

    /// Samples the noise at `(x, y, z)`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
        // Two's complement masking keeps negative cells in 0..256.
        let xi = (x0 as i64 & 255) as usize;
        let yi = (y0 as i64 & 255) as usize;
        let zi = (z0 as i64 & 255) as usize;

        let (fx, fy, fz) = (x - x0, y - y0, z - z0);
        let (u, v, w) = (fade(fx), fade(fy), fade(fz));

        let p = &self.lattice;
        let a = p.hash(xi) + yi;
        let aa = p.hash(a) + zi;
        let ab = p.hash(a + 1) + zi;
        let b = p.hash(xi + 1) + yi;
        let ba = p.hash(b) + zi;
        let bb = p.hash(b + 1) + zi;

        let near = lerp(
            v,
            lerp(
                u,
                gradient(p.hash(aa), fx, fy, fz),
                gradient(p.hash(ba), fx - 1.0, fy, fz),
            ),
            lerp(
                u,
                gradient(p.hash(ab), fx, fy - 1.0, fz),
                gradient(p.hash(bb), fx - 1.0, fy - 1.0, fz),
            ),
        );
        let far = lerp(
            v,
            lerp(
                u,
                gradient(p.hash(aa + 1), fx, fy, fz - 1.0),
                gradient(p.hash(ba + 1), fx - 1.0, fy, fz - 1.0),
            ),
            lerp(
                u,
                gradient(p.hash(ab + 1), fx, fy - 1.0, fz - 1.0),
                gradient(p.hash(bb + 1), fx - 1.0, fy - 1.0, fz - 1.0),
            ),
        );
        lerp(w, near, far)
    }

    /// Fractal sum of `octaves` layers, normalized by the total amplitude.
    ///
    /// `persistence` scales the amplitude and `lacunarity` the frequency of
    /// each successive layer. Zero octaves yields 0.
    #[must_use]
    pub fn octaved(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}

impl std::fmt::Debug for GradientNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientNoise").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let a = GradientNoise::new(Seed::new(12345));
        let b = GradientNoise::new(Seed::new(12345));

        for i in 0..200 {
            let t = f64::from(i);
            let (x, y, z) = (t * 0.37 - 20.0, t * 0.11, -t * 0.23);
            assert_eq!(a.sample(x, y, z).to_bits(), b.sample(x, y, z).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = GradientNoise::new(Seed::new(1));
        let b = GradientNoise::new(Seed::new(2));

        let differs = (0..50).any(|i| {
            let t = f64::from(i) * 0.731 + 0.5;
            a.sample(t, t * 0.5, t * 0.25) != b.sample(t, t * 0.5, t * 0.25)
        });
        assert!(differs);
    }

    #[test]
    fn test_zero_on_lattice() {
        let noise = GradientNoise::new(Seed::new(7));
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (3.0, -2.0, 7.0), (-128.0, 255.0, 256.0)] {
            assert_eq!(noise.sample(x, y, z), 0.0);
        }
    }

    #[test]
    fn test_range() {
        let noise = GradientNoise::new(Seed::new(42));
        for i in 0..20_000 {
            let t = f64::from(i);
            let v = noise.sample(t * 0.071 - 300.0, t * 0.013, t * -0.029);
            assert!(v.abs() <= 1.25, "value {v} out of range");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = GradientNoise::new(Seed::new(42));
        let (x, y, z) = (10.3, -4.7, 2.2);
        let delta = 0.001;

        let v = noise.sample(x, y, z);
        for (dx, dy, dz) in [(delta, 0.0, 0.0), (0.0, delta, 0.0), (0.0, 0.0, delta)] {
            let diff = (v - noise.sample(x + dx, y + dy, z + dz)).abs();
            assert!(diff < 0.01, "noise should be continuous: diff = {diff}");
        }
    }

    #[test]
    fn test_octaved_range_and_zero_octaves() {
        let noise = GradientNoise::new(Seed::new(42));
        let v = noise.octaved(12.5, 3.5, 8.25, 5, 0.5, 2.0);
        assert!(v.abs() <= 1.25);
        assert_eq!(noise.octaved(12.5, 3.5, 8.25, 0, 0.5, 2.0), 0.0);
    }

    #[test]
    fn test_seed_derivation() {
        let base = Seed::new(42);
        assert_eq!(base.derive(1), base.derive(1));
        assert_ne!(base.derive(1), base.derive(2));
        assert_ne!(base.derive(1), base);
    }

    #[test]
    fn test_zero_seed_still_shuffles() {
        let lattice = Lattice::new(Seed::new(0));
        let identity = (0..256).all(|i| lattice.hash(i) == i);
        assert!(!identity);
    }
}
