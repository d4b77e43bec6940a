//! Dense density field for one chunk.
//!
//! A field covers `CHUNK_VOXELS + BORDER` samples per axis. The extra layer on
//! the positive side holds the neighbouring chunk's first interior layer, so
//! the cubes along this chunk's far faces can be marched without reading
//! another chunk.

use ndshape::{RuntimeShape, Shape};
use strata_shared::{BORDER, CHUNK_VOXELS};

/// Density written by `VoxelField::new`: outside for the default target.
pub const EMPTY_DENSITY: f32 = -1.0;

/// One of the three grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All axes in x, y, z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Array index of this axis.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// A chunk's density samples.
///
/// Layout: `voxels[x + W * (y + H * z)]`, x fastest.
///
/// Out-of-range coordinates are a caller bug; `get`/`set` only check them in
/// debug builds. Use `try_get` where the coordinate is not known to be valid.
#[derive(Clone)]
pub struct VoxelField {
    /// Linearization for the stored (bordered) dimensions.
    shape: RuntimeShape<u32, 3>,
    /// Nominal voxels per axis, without the border.
    chunk_voxels: [u32; 3],
    /// Density samples.
    voxels: Box<[f32]>,
}

impl VoxelField {
    /// Creates a field of `chunk_voxels` cubes per axis filled with `EMPTY_DENSITY`.
    ///
    /// Note: This allocates. Call during loading, never in the meshing loop.
    #[must_use]
    pub fn new(chunk_voxels: [u32; 3]) -> Self {
        Self::filled(chunk_voxels, EMPTY_DENSITY)
    }

    /// Creates a field with every sample set to `density`.
    ///
    /// # Panics
    /// Panics if any axis has zero voxels.
    #[must_use]
    pub fn filled(chunk_voxels: [u32; 3], density: f32) -> Self {
        assert!(
            chunk_voxels.iter().all(|&n| n > 0),
            "chunk must have at least one voxel per axis"
        );
        let dims = [
            chunk_voxels[0] + BORDER,
            chunk_voxels[1] + BORDER,
            chunk_voxels[2] + BORDER,
        ];
        let shape = RuntimeShape::<u32, 3>::new(dims);
        let volume: usize = dims.iter().map(|&n| n as usize).product();
        let voxels = vec![density; volume].into_boxed_slice();
        Self {
            shape,
            chunk_voxels,
            voxels,
        }
    }

    /// Creates a field by sampling `f(x, y, z)` at every stored coordinate,
    /// border included.
    #[must_use]
    pub fn from_fn(chunk_voxels: [u32; 3], mut f: impl FnMut(u32, u32, u32) -> f32) -> Self {
        let mut field = Self::filled(chunk_voxels, 0.0);
        let [w, h, d] = field.dims();
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let idx = field.index(x, y, z);
                    field.voxels[idx] = f(x, y, z);
                }
            }
        }
        field
    }

    /// Stored dimensions per axis, border included.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> [u32; 3] {
        self.shape.as_array()
    }

    /// Nominal voxels per axis. Also the number of marchable cubes per axis.
    #[inline]
    #[must_use]
    pub const fn chunk_voxels(&self) -> [u32; 3] {
        self.chunk_voxels
    }

    /// Last cube index along `axis` whose eight corners are all stored.
    #[inline]
    #[must_use]
    pub fn last_cube_index(&self, axis: Axis) -> u32 {
        self.dims()[axis.index()] - BORDER - 1
    }

    /// Number of cubes the extractor marches.
    #[inline]
    #[must_use]
    pub fn cube_count(&self) -> usize {
        self.chunk_voxels.iter().map(|&n| n as usize).product()
    }

    /// Total stored samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Always false: a field has at least 2x2x2 samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Linear index of a stored coordinate.
    #[inline]
    #[must_use]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        debug_assert!(self.contains(x, y, z), "voxel ({x}, {y}, {z}) out of bounds");
        self.shape.linearize([x, y, z]) as usize
    }

    /// Returns true if the coordinate is stored in this field.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        let [w, h, d] = self.dims();
        x < w && y < h && z < d
    }

    /// Density at a stored coordinate.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32, z: u32) -> f32 {
        self.voxels[self.index(x, y, z)]
    }

    /// Density at a coordinate, or None if it is not stored.
    #[inline]
    #[must_use]
    pub fn try_get(&self, x: u32, y: u32, z: u32) -> Option<f32> {
        if self.contains(x, y, z) {
            Some(self.voxels[self.index(x, y, z)])
        } else {
            None
        }
    }

    /// Writes the density at a stored coordinate.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, z: u32, density: f32) {
        let idx = self.index(x, y, z);
        self.voxels[idx] = density;
    }

    /// Overwrites every sample.
    pub fn fill(&mut self, density: f32) {
        self.voxels.fill(density);
    }

    /// Full dense array for direct access by the field's owner.
    #[inline]
    #[must_use]
    pub fn voxels(&self) -> &[f32] {
        &self.voxels
    }

    /// Full dense array for direct writes by the field's owner.
    #[inline]
    pub fn voxels_mut(&mut self) -> &mut [f32] {
        &mut self.voxels
    }

    /// Samples as bytes for upload or hashing.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.voxels)
    }

    /// Copies `neighbour`'s first layer along `axis` into this field's border layer.
    ///
    /// `neighbour` must be the chunk directly on the positive side of this one
    /// along `axis` and share this field's dimensions.
    ///
    /// # Panics
    /// Panics if the two fields have different dimensions.
    pub fn copy_border_from(&mut self, axis: Axis, neighbour: &Self) {
        assert_eq!(self.dims(), neighbour.dims(), "neighbouring fields must match");
        let dims = self.dims();
        let border = dims[axis.index()] - 1;
        let (u_axis, v_axis) = match axis {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        };
        for v in 0..dims[v_axis] {
            for u in 0..dims[u_axis] {
                let mut dst = [0u32; 3];
                dst[u_axis] = u;
                dst[v_axis] = v;
                let mut src = dst;
                dst[axis.index()] = border;
                src[axis.index()] = 0;
                let value = neighbour.get(src[0], src[1], src[2]);
                self.set(dst[0], dst[1], dst[2], value);
            }
        }
    }

    /// Number of samples at or above `target` (solid), border included.
    #[must_use]
    pub fn solid_count(&self, target: f32) -> usize {
        self.voxels.iter().filter(|&&d| d >= target).count()
    }
}

impl Default for VoxelField {
    fn default() -> Self {
        Self::new(CHUNK_VOXELS)
    }
}

impl std::fmt::Debug for VoxelField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelField")
            .field("dims", &self.dims())
            .field("chunk_voxels", &self.chunk_voxels)
            .finish_non_exhaustive()
    }
}
