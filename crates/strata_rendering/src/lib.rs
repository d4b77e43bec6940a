//! # STRATA Rendering
//!
//! Turns voxel density fields into GPU-ready chunk geometry:
//! - Marching Cubes over every chunk, seamless across chunk borders
//! - One shared vertex, index and meshlet buffer for the whole world
//! - A `ChunkData` record per chunk telling the GPU where its geometry lives
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     MESHING PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  VoxelField → Marching Cubes → ChunkMesh → Assembler         │
//! │                                              ↓               │
//! │        shared vertex / index / meshlet buffers + ChunkData   │
//! │                                              ↓               │
//! │                          DrawList → multi-draw indirect      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use strata_core::VoxelField;
//! use strata_rendering::geometry::ChunkGeometryAssembler;
//! use strata_rendering::isosurface::meshify;
//! use strata_shared::ChunkCoord;
//!
//! let field = VoxelField::from_fn([4, 4, 4], |x, y, z| {
//!     let d = |v: u32| v as f32 - 2.0;
//!     1.5 - (d(x) * d(x) + d(y) * d(y) + d(z) * d(z)).sqrt()
//! });
//! let mesh = meshify(&field, 0.0);
//! assert!(!mesh.is_empty());
//!
//! let assembler = ChunkGeometryAssembler::default();
//! let data = assembler.append_mesh(ChunkCoord::new(0, 0, 0), &mesh).unwrap();
//! assert_eq!(data.vertex_offset, 0);
//! ```
//!
//! ## MANDATE
//!
//! - Identical fields produce identical geometry
//! - Adjacent chunks share their border vertices exactly
//! - A chunk's `ChunkData` only changes when that chunk is re-meshed

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod geometry;
pub mod isosurface;
pub mod pipeline;

pub use geometry::{
    AssemblerError, ChunkData, ChunkGeometryAssembler, DrawList, GeometryCapacity, Meshlet,
};
pub use isosurface::{meshify, ChunkMesh, IsosurfaceExtractor, Vertex};
pub use pipeline::{MeshJob, MeshingConfig, MeshingPipeline, MeshingStats, PipelineReport};
