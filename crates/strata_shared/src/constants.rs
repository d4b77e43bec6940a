//! # Chunk & Buffer Constants
//!
//! Compile-time configuration for chunk meshing.
//!
//! **CRITICAL:** Generators and meshers must agree on these values.
//! `MeshingConfig` can override most of them at startup, but never at runtime.

// =============================================================================
// CHUNK GEOMETRY
// =============================================================================

/// Nominal voxels per chunk along each axis (x, y, z).
pub const CHUNK_VOXELS: [u32; 3] = [32, 32, 32];

/// Border voxels on the positive side of every axis.
///
/// A chunk samples one voxel past its nominal extent so its surface meets the
/// neighbour's surface without a seam. There is no negative border.
pub const BORDER: u32 = 1;

/// Stored field dimensions per axis (`CHUNK_VOXELS + BORDER`).
pub const FIELD_DIMS: [u32; 3] = [
    CHUNK_VOXELS[0] + BORDER,
    CHUNK_VOXELS[1] + BORDER,
    CHUNK_VOXELS[2] + BORDER,
];

/// Physical size of one voxel along each axis, in world units.
pub const VOXEL_SIZE: [f32; 3] = [1.0, 1.0, 1.0];

/// Default isovalue. Densities `>= DEFAULT_TARGET` are solid.
pub const DEFAULT_TARGET: f32 = 0.0;

// =============================================================================
// MARCHING CUBES BOUNDS
// =============================================================================

/// Most triangles a single marched cube can emit.
pub const MAX_TRIANGLES_PER_CUBE: u32 = 5;

/// Most indices a single marched cube can emit.
pub const MAX_INDICES_PER_CUBE: u32 = MAX_TRIANGLES_PER_CUBE * 3;

/// Most vertices a single marched cube can emit (one per crossed edge).
pub const MAX_VERTICES_PER_CUBE: u32 = 12;

// =============================================================================
// MESHLETS
// =============================================================================

/// Triangles per meshlet.
pub const MESHLET_MAX_TRIANGLES: u32 = 128;

/// Indices per meshlet. Always a multiple of 3.
pub const MESHLET_MAX_INDICES: u32 = MESHLET_MAX_TRIANGLES * 3;

// =============================================================================
// SHARED GEOMETRY BUFFERS
// =============================================================================

/// Default vertex capacity of the shared geometry buffer.
pub const DEFAULT_VERTEX_CAPACITY: u32 = 2 * 1024 * 1024;

/// Default index capacity of the shared geometry buffer.
pub const DEFAULT_INDEX_CAPACITY: u32 = 6 * 1024 * 1024;

/// Default meshlet capacity of the shared geometry buffer.
pub const DEFAULT_MESHLET_CAPACITY: u32 = 64 * 1024;

/// Default number of meshing worker threads.
pub const DEFAULT_WORKER_THREADS: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_dims_include_border() {
        for axis in 0..3 {
            assert_eq!(FIELD_DIMS[axis], CHUNK_VOXELS[axis] + 1);
        }
    }

    #[test]
    fn test_meshlet_holds_whole_triangles() {
        assert_eq!(MESHLET_MAX_INDICES % 3, 0);
        assert!(MESHLET_MAX_INDICES >= MAX_INDICES_PER_CUBE);
    }
}
