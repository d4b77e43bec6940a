//! # STRATA Core
//!
//! Data the meshing pipeline runs on:
//! - `VoxelField`: one chunk's dense density samples, plus a one-voxel border
//!   on the positive side of every axis for seamless stitching
//! - `RangeAllocator`: contiguous offset reservation with an exact-extent
//!   free list, backing the shared vertex/index/meshlet buffers
//!
//! ## Example
//!
//! ```rust
//! use strata_core::VoxelField;
//!
//! let mut field = VoxelField::new([8, 8, 8]);
//! assert_eq!(field.dims(), [9, 9, 9]);
//! field.set(4, 4, 4, 1.0);
//! assert_eq!(field.get(4, 4, 4), 1.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;
pub mod voxel;

pub use memory::RangeAllocator;
pub use voxel::{Axis, VoxelField, EMPTY_DENSITY};
