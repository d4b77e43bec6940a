//! Voxel density storage.

mod field;

pub use field::{Axis, VoxelField, EMPTY_DENSITY};
