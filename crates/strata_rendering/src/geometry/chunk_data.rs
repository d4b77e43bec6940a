//! Per-chunk GPU records.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

/// Where one chunk's geometry lives in the shared buffers.
///
/// Uploaded as-is to a storage buffer; a culling pass reads it to emit draws.
/// Indices in the shared index buffer are relative to `vertex_offset`, which
/// the draw supplies as its base vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct ChunkData {
    /// First meshlet of the chunk in the meshlet buffer.
    pub meshlet_offset: u32,
    /// Number of meshlets.
    pub meshlet_count: u32,
    /// First index of the chunk in the index buffer.
    pub index_offset: u32,
    /// First vertex of the chunk in the vertex buffer.
    pub vertex_offset: u32,
}

impl ChunkData {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Record of a chunk with no geometry.
    pub const EMPTY: Self = Self {
        meshlet_offset: 0,
        meshlet_count: 0,
        index_offset: 0,
        vertex_offset: 0,
    };

    /// True if the chunk draws nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.meshlet_count == 0
    }
}

/// `draw_indexed_indirect` arguments for one chunk.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedIndirectArgs {
    /// Indices to draw.
    pub index_count: u32,
    /// Instances to draw.
    pub instance_count: u32,
    /// First index.
    pub first_index: u32,
    /// Base vertex added to every index.
    pub base_vertex: i32,
    /// First instance.
    pub first_instance: u32,
}

impl DrawIndexedIndirectArgs {
    /// Draws `extent`'s whole index range once. `first_instance` carries the
    /// chunk's slot so shaders can look up its record.
    ///
    /// Vertex offsets are bounded by the vertex capacity, which is a `u32`;
    /// offsets above `i32::MAX` saturate.
    #[must_use]
    pub fn for_extent(extent: &ChunkExtent, slot: u32) -> Self {
        Self {
            index_count: extent.index_count(),
            instance_count: u32::from(!extent.indices.is_empty()),
            first_index: extent.indices.start,
            base_vertex: i32::try_from(extent.vertices.start).unwrap_or(i32::MAX),
            first_instance: slot,
        }
    }
}

/// Ranges a live chunk occupies in each shared buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ChunkExtent {
    /// Vertex buffer range.
    pub vertices: Range<u32>,
    /// Index buffer range.
    pub indices: Range<u32>,
    /// Meshlet buffer range.
    pub meshlets: Range<u32>,
}

impl ChunkExtent {
    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.end - self.vertices.start
    }

    /// Number of indices.
    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.end - self.indices.start
    }

    /// Number of meshlets.
    #[inline]
    #[must_use]
    pub fn meshlet_count(&self) -> u32 {
        self.meshlets.end - self.meshlets.start
    }

    /// The record the GPU sees for this extent.
    #[must_use]
    pub fn chunk_data(&self) -> ChunkData {
        ChunkData {
            meshlet_offset: self.meshlets.start,
            meshlet_count: self.meshlet_count(),
            index_offset: self.indices.start,
            vertex_offset: self.vertices.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_data_is_16_bytes() {
        assert_eq!(ChunkData::SIZE, 16);
        assert_eq!(std::mem::size_of::<DrawIndexedIndirectArgs>(), 20);
        assert!(ChunkData::EMPTY.is_empty());
        assert_eq!(ChunkData::default(), ChunkData::EMPTY);
    }

    #[test]
    fn test_extent_to_chunk_data() {
        let extent = ChunkExtent {
            vertices: 100..130,
            indices: 600..690,
            meshlets: 7..8,
        };
        assert_eq!(
            extent.chunk_data(),
            ChunkData {
                meshlet_offset: 7,
                meshlet_count: 1,
                index_offset: 600,
                vertex_offset: 100,
            }
        );

        let args = DrawIndexedIndirectArgs::for_extent(&extent, 3);
        assert_eq!(args.index_count, 90);
        assert_eq!(args.instance_count, 1);
        assert_eq!(args.first_index, 600);
        assert_eq!(args.base_vertex, 100);
        assert_eq!(args.first_instance, 3);
    }

    #[test]
    fn test_empty_extent_draws_nothing() {
        let args = DrawIndexedIndirectArgs::for_extent(&ChunkExtent::default(), 0);
        assert_eq!(args.instance_count, 0);
        assert_eq!(ChunkExtent::default().chunk_data(), ChunkData::EMPTY);
    }
}
