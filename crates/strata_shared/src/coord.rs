//! Chunk coordinates.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Chunk coordinate in the world grid (in chunks, not voxels).
///
/// Doubles as the chunk identifier in the geometry assembler.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, Pod, Zeroable, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub struct ChunkCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
    /// Padding for alignment.
    #[serde(skip)]
    pub _pad: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, _pad: 0 }
    }

    /// Chunk containing the given world voxel position.
    #[inline]
    #[must_use]
    pub const fn from_voxel_pos(pos: [i32; 3], chunk_voxels: [u32; 3]) -> Self {
        Self::new(
            pos[0].div_euclid(chunk_voxels[0] as i32),
            pos[1].div_euclid(chunk_voxels[1] as i32),
            pos[2].div_euclid(chunk_voxels[2] as i32),
        )
    }

    /// World voxel position of this chunk's minimum corner.
    #[inline]
    #[must_use]
    pub const fn origin_voxels(self, chunk_voxels: [u32; 3]) -> [i32; 3] {
        [
            self.x * chunk_voxels[0] as i32,
            self.y * chunk_voxels[1] as i32,
            self.z * chunk_voxels[2] as i32,
        ]
    }

    /// Returns the neighbouring coordinate offset by `(dx, dy, dz)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_to_chunk_rounds_down() {
        let dims = [32, 32, 32];
        assert_eq!(ChunkCoord::from_voxel_pos([0, 31, 32], dims), ChunkCoord::new(0, 0, 1));
        assert_eq!(ChunkCoord::from_voxel_pos([-1, -32, -33], dims), ChunkCoord::new(-1, -1, -2));
    }

    #[test]
    fn test_origin_round_trip() {
        let dims = [16, 8, 4];
        let coord = ChunkCoord::new(-3, 2, 7);
        let origin = coord.origin_voxels(dims);
        assert_eq!(origin, [-48, 16, 28]);
        assert_eq!(ChunkCoord::from_voxel_pos(origin, dims), coord);
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut coords = vec![ChunkCoord::new(1, 0, 0), ChunkCoord::new(0, 5, 0), ChunkCoord::new(0, 0, 9)];
        coords.sort();
        assert_eq!(coords[0], ChunkCoord::new(0, 0, 9));
        assert_eq!(coords[2], ChunkCoord::new(1, 0, 0));
    }
}
