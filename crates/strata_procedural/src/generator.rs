//! # Chunk Field Generation
//!
//! Fills a `VoxelField` by sampling a density function at world voxel
//! coordinates. Sample `(x, y, z)` of the chunk at `coord` is taken at
//! `coord.origin_voxels() + (x, y, z)`, border included, so the positive
//! border of one chunk reads exactly the values its neighbour stores in its
//! first layer.

use strata_core::VoxelField;
use strata_shared::ChunkCoord;
use tracing::trace;

use crate::density::DensityFunction;

/// Overwrites every sample of `field` (border included) from `func`.
///
/// # Returns
///
/// The number of solid samples (`density >= 0`).
pub fn fill_chunk<D>(field: &mut VoxelField, coord: ChunkCoord, func: &D) -> usize
where
    D: DensityFunction + ?Sized,
{
    let origin = coord.origin_voxels(field.chunk_voxels());
    let [w, h, d] = field.dims();
    let mut solid = 0usize;

    for z in 0..d {
        let wz = (origin[2] + z as i32) as f32;
        for y in 0..h {
            let wy = (origin[1] + y as i32) as f32;
            for x in 0..w {
                let wx = (origin[0] + x as i32) as f32;
                let density = func.density([wx, wy, wz]);
                if density >= 0.0 {
                    solid += 1;
                }
                field.set(x, y, z, density);
            }
        }
    }

    trace!(
        chunk = ?coord,
        solid,
        total = field.len(),
        "filled chunk field"
    );
    solid
}

/// Allocates a field of `chunk_voxels` cubes per axis and fills it from `func`.
#[must_use]
pub fn generate_chunk<D>(coord: ChunkCoord, chunk_voxels: [u32; 3], func: &D) -> VoxelField
where
    D: DensityFunction + ?Sized,
{
    let mut field = VoxelField::new(chunk_voxels);
    fill_chunk(&mut field, coord, func);
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::PlaneDensity;

    #[test]
    fn test_samples_world_coordinates() {
        let coord = ChunkCoord::new(2, -1, 0);
        let field = generate_chunk(coord, [4, 4, 4], &|p: [f32; 3]| p[0] + 100.0 * p[1]);

        // origin = (8, -4, 0)
        assert_eq!(field.get(0, 0, 0), 8.0 - 400.0);
        assert_eq!(field.get(3, 2, 1), 11.0 - 200.0);
        assert_eq!(field.get(4, 4, 4), 12.0);
    }

    #[test]
    fn test_fill_counts_solid_samples() {
        let mut field = VoxelField::new([4, 4, 4]);
        // y in 0..=4; y <= 1.5 is solid.
        let solid = fill_chunk(&mut field, ChunkCoord::new(0, 0, 0), &PlaneDensity::new(1.5));
        assert_eq!(solid, 2 * 5 * 5);
        assert_eq!(field.solid_count(0.0), solid);
    }

    #[test]
    fn test_dyn_density_function() {
        let boxed: Box<dyn DensityFunction> = Box::new(PlaneDensity::new(0.0));
        let field = generate_chunk(ChunkCoord::new(0, 1, 0), [2, 2, 2], &*boxed);
        assert!(field.voxels().iter().all(|&d| d <= 0.0));
    }
}
