//! # STRATA
//!
//! Voxel isosurface meshing, from density field to GPU-ready chunk geometry.
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐    ┌──────────────────────┐
//! │ strata_procedural│───>│ strata_core      │───>│ strata_rendering     │
//! │ density fields   │    │ VoxelField       │    │ Marching Cubes       │
//! └──────────────────┘    └──────────────────┘    │ geometry assembler   │
//!                                                 │ meshing pipeline     │
//!                                                 └──────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use strata::{mesh_region, ChunkRegion, MeshingConfig, MeshingPipeline};
//! use strata::procedural::PlaneDensity;
//! use strata::shared::ChunkCoord;
//!
//! let config = MeshingConfig { chunk_voxels: [8, 8, 8], ..MeshingConfig::default() };
//! let pipeline = MeshingPipeline::from_config(config).unwrap();
//! let region = ChunkRegion::new(ChunkCoord::new(0, 0, 0), ChunkCoord::new(1, 0, 1));
//! let report = mesh_region(&pipeline, &PlaneDensity::new(4.5), region);
//! assert_eq!(report.stats.chunks, 4);
//! assert_eq!(report.stats.failures, 0);
//! ```

pub mod region;

pub use strata_core as core;
pub use strata_procedural as procedural;
pub use strata_rendering as rendering;
pub use strata_shared as shared;

pub use region::{mesh_region, ChunkRegion};
pub use strata_rendering::{
    ChunkData, ChunkGeometryAssembler, MeshingConfig, MeshingPipeline, MeshingStats,
    PipelineReport,
};
