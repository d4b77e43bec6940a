//! # STRATA Shared
//!
//! Constants, math and chunk addressing shared by every STRATA crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on `wgpu` or any GPU-related crate.
//! GPU-facing layouts live in `strata_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod coord;
pub mod math;

pub use constants::{
    BORDER, CHUNK_VOXELS, DEFAULT_TARGET, FIELD_DIMS, MESHLET_MAX_INDICES, VOXEL_SIZE,
};
pub use coord::ChunkCoord;
pub use math::{Vec3, Vec4};
