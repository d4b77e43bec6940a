//! Chunk geometry assembly.
//!
//! - **Shared buffers**: one vertex, one index and one meshlet array for all chunks
//! - **ChunkData**: per-chunk offsets the GPU uses to find its geometry
//! - **Meshlets**: fixed-size triangle runs for culling granularity
//! - **Retirement**: replaced geometry stays valid until the renderer lets go

mod assembler;
mod chunk_data;
mod error;
mod meshlet;

pub use assembler::{
    BufferUsage, ChunkGeometryAssembler, DrawList, GeometryBuffers, GeometryCapacity,
    GeometryUsage, ReplacedChunk, Reservation,
};
pub use chunk_data::{ChunkData, ChunkExtent, DrawIndexedIndirectArgs};
pub use error::{AssemblerError, AssemblerResult, GeometryBuffer};
pub use meshlet::{meshlet_count, partition, Meshlet};
