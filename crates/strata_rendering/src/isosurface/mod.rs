//! Isosurface extraction.
//!
//! Marching Cubes turns a chunk's density field into a chunk-local vertex and
//! index stream. Extraction never fails: cubes with non-finite corners are
//! skipped and counted, and output size is bounded by the cube count.

mod extractor;
pub mod tables;
mod vertex;

pub use extractor::{
    classify, fill_cube, get_normal, get_offset, meshify, ExtractorOptions, IsosurfaceExtractor,
};
pub use vertex::{ChunkMesh, Vertex};
