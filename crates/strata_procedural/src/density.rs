//! # Density Functions
//!
//! Scalar fields sampled in world voxel coordinates. Positive values are solid
//! for the default target of 0.

use crate::noise::{GradientNoise, Seed};

/// A scalar field over world voxel space.
///
/// Implementations must be pure: the same point always yields the same
/// density, whichever chunk asks for it.
pub trait DensityFunction: Send + Sync {
    /// Density at a world voxel position.
    fn density(&self, world: [f32; 3]) -> f32;
}

impl<F> DensityFunction for F
where
    F: Fn([f32; 3]) -> f32 + Send + Sync,
{
    #[inline]
    fn density(&self, world: [f32; 3]) -> f32 {
        self(world)
    }
}

/// Solid ball: `radius - distance(center)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDensity {
    /// Center in world voxels.
    pub center: [f32; 3],
    /// Radius in voxels.
    pub radius: f32,
}

impl SphereDensity {
    /// Creates a sphere.
    #[must_use]
    pub const fn new(center: [f32; 3], radius: f32) -> Self {
        Self { center, radius }
    }
}

impl DensityFunction for SphereDensity {
    #[inline]
    fn density(&self, world: [f32; 3]) -> f32 {
        let dx = world[0] - self.center[0];
        let dy = world[1] - self.center[1];
        let dz = world[2] - self.center[2];
        self.radius - (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Solid half-space below a horizontal plane: `height - y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneDensity {
    /// Surface height in world voxels.
    pub height: f32,
}

impl PlaneDensity {
    /// Creates a ground plane at `height`.
    #[must_use]
    pub const fn new(height: f32) -> Self {
        Self { height }
    }
}

impl DensityFunction for PlaneDensity {
    #[inline]
    fn density(&self, world: [f32; 3]) -> f32 {
        self.height - world[1]
    }
}

/// Parameters for `NoiseTerrain`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParams {
    /// Mean ground height in voxels.
    pub base_height: f32,
    /// Peak deviation of the surface from `base_height`.
    pub amplitude: f32,
    /// Horizontal surface frequency (cycles per voxel).
    pub frequency: f64,
    /// Surface octaves.
    pub octaves: u32,
    /// Cave frequency (cycles per voxel).
    pub cave_frequency: f64,
    /// Cave noise above this value carves space. Values `>= 1` disable caves.
    pub cave_threshold: f64,
    /// Density removed per unit of cave noise above the threshold.
    pub cave_strength: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_height: 16.0,
            amplitude: 8.0,
            frequency: 1.0 / 48.0,
            octaves: 4,
            cave_frequency: 1.0 / 12.0,
            cave_threshold: 0.35,
            cave_strength: 40.0,
        }
    }
}

/// Rolling heightfield carved by 3D noise caves.
///
/// The surface is `base_height + amplitude * fbm(x, z)`; the density is the
/// signed height above the sample point minus a cave term that only kicks in
/// where the cave noise exceeds its threshold.
#[derive(Debug, Clone)]
pub struct NoiseTerrain {
    surface: GradientNoise,
    caves: GradientNoise,
    params: TerrainParams,
}

impl NoiseTerrain {
    /// Surface noise stream.
    const SURFACE_STREAM: u64 = 1;
    /// Cave noise stream.
    const CAVE_STREAM: u64 = 2;

    /// Creates terrain from a seed and parameters.
    #[must_use]
    pub fn new(seed: Seed, params: TerrainParams) -> Self {
        Self {
            surface: GradientNoise::new(seed.derive(Self::SURFACE_STREAM)),
            caves: GradientNoise::new(seed.derive(Self::CAVE_STREAM)),
            params,
        }
    }

    /// Creates terrain with default parameters.
    #[must_use]
    pub fn with_seed(seed: Seed) -> Self {
        Self::new(seed, TerrainParams::default())
    }

    /// The parameters this terrain was built with.
    #[must_use]
    pub const fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Surface height at a world column.
    #[must_use]
    pub fn surface_height(&self, x: f32, z: f32) -> f32 {
        let p = &self.params;
        let n = self.surface.octaved(
            f64::from(x) * p.frequency,
            0.5,
            f64::from(z) * p.frequency,
            p.octaves,
            0.5,
            2.0,
        );
        p.base_height + p.amplitude * n as f32
    }
}

impl DensityFunction for NoiseTerrain {
    fn density(&self, world: [f32; 3]) -> f32 {
        let [x, y, z] = world;
        let ground = self.surface_height(x, z) - y;

        let p = &self.params;
        if p.cave_threshold >= 1.0 {
            return ground;
        }
        let cave = self.caves.sample(
            f64::from(x) * p.cave_frequency,
            f64::from(y) * p.cave_frequency,
            f64::from(z) * p.cave_frequency,
        );
        let carve = (cave - p.cave_threshold).max(0.0) as f32;
        ground - carve * p.cave_strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_sign() {
        let sphere = SphereDensity::new([8.0, 8.0, 8.0], 4.0);
        assert_eq!(sphere.density([8.0, 8.0, 8.0]), 4.0);
        assert_eq!(sphere.density([12.0, 8.0, 8.0]), 0.0);
        assert!(sphere.density([14.0, 8.0, 8.0]) < 0.0);
    }

    #[test]
    fn test_plane_sign() {
        let plane = PlaneDensity::new(3.5);
        assert!(plane.density([0.0, 3.0, 0.0]) > 0.0);
        assert!(plane.density([100.0, 4.0, -100.0]) < 0.0);
    }

    #[test]
    fn test_closures_are_density_functions() {
        let f = |p: [f32; 3]| p[0] - 1.0;
        assert_eq!(f.density([3.0, 0.0, 0.0]), 2.0);
    }

    #[test]
    fn test_terrain_is_solid_deep_and_empty_high() {
        let terrain = NoiseTerrain::new(
            Seed::new(9),
            TerrainParams {
                cave_threshold: 1.0,
                ..TerrainParams::default()
            },
        );
        let p = *terrain.params();
        let below = p.base_height - p.amplitude * 1.5;
        let above = p.base_height + p.amplitude * 1.5;
        for i in 0..64 {
            let x = i as f32 * 3.7;
            let z = i as f32 * -2.3;
            assert!(terrain.density([x, below, z]) > 0.0);
            assert!(terrain.density([x, above, z]) < 0.0);
        }
    }

    #[test]
    fn test_caves_only_remove_density() {
        let seed = Seed::new(3);
        let solid = NoiseTerrain::new(
            seed,
            TerrainParams {
                cave_threshold: 1.0,
                ..TerrainParams::default()
            },
        );
        let carved = NoiseTerrain::with_seed(seed);
        for i in 0..200 {
            let t = i as f32;
            let p = [t * 0.9, t * 0.13, t * -0.4];
            assert!(carved.density(p) <= solid.density(p));
        }
    }
}
