//! Vertex format and per-chunk mesh output.

use bytemuck::{Pod, Zeroable};
use strata_shared::constants::MAX_TRIANGLES_PER_CUBE;
use strata_shared::{Vec3, Vec4};

// =============================================================================
// VERTEX FORMAT
// =============================================================================

/// Isosurface vertex, two vec4s for std430-friendly alignment.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// World-space position, w = 1.
    pub position: [f32; 4],
    /// Unit surface normal, w = 0.
    pub normal: [f32; 4],
}

impl Vertex {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Vertex buffer attributes for WGPU.
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x4,  // position
        1 => Float32x4,  // normal
    ];

    /// Creates a vertex from a position and a normal.
    #[inline]
    #[must_use]
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: Vec4::extend(position, 1.0).to_array(),
            normal: Vec4::extend(normal, 0.0).to_array(),
        }
    }

    /// Position without the w lane.
    #[inline]
    #[must_use]
    pub const fn position3(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Normal without the w lane.
    #[inline]
    #[must_use]
    pub const fn normal3(&self) -> Vec3 {
        Vec3::new(self.normal[0], self.normal[1], self.normal[2])
    }

    /// Vertex buffer layout descriptor
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// =============================================================================
// CHUNK MESH
// =============================================================================

/// Triangles extracted from one chunk.
///
/// Indices are chunk-local: index `i` refers to `vertices[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    /// Vertex stream.
    pub vertices: Vec<Vertex>,
    /// Index stream, three per triangle.
    pub indices: Vec<u32>,
    /// Cubes skipped because a corner density was NaN or infinite.
    pub skipped_cubes: u32,
}

impl ChunkMesh {
    /// Upper bound on triangles for a field with `cube_count` marchable cubes.
    #[inline]
    #[must_use]
    pub const fn max_triangles_for(cube_count: usize) -> usize {
        cube_count * MAX_TRIANGLES_PER_CUBE as usize
    }

    /// True if no triangle was produced.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Get triangle count
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get vertex count
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Empties the mesh, keeping its allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.skipped_cubes = 0;
    }

    /// Vertex stream as bytes.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index stream as bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(Vertex::SIZE, 32);
        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 32);
        assert_eq!(desc.attributes[1].offset, 16);
    }

    #[test]
    fn test_vertex_lanes() {
        let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);
        assert_eq!(v.position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(v.normal, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(v.position3(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_mesh_counts() {
        let mut mesh = ChunkMesh::default();
        assert!(mesh.is_empty());
        mesh.vertices.extend([Vertex::default(); 3]);
        mesh.indices.extend([0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.index_bytes().len(), 12);
        assert_eq!(mesh.vertex_bytes().len(), 96);

        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(ChunkMesh::max_triangles_for(8), 40);
    }
}
