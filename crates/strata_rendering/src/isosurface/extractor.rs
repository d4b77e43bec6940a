//! Marching Cubes over a `VoxelField`.
//!
//! Every cube whose eight corners are stored in the field is marched once,
//! in z, y, x order. Output order depends only on the field, so the same
//! field always yields the same bytes.

use strata_core::VoxelField;
use strata_shared::constants::MAX_VERTICES_PER_CUBE;
use strata_shared::{ChunkCoord, Vec3, DEFAULT_TARGET, VOXEL_SIZE};
use tracing::{trace, warn};

use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use super::vertex::{ChunkMesh, Vertex};

/// Per-chunk extraction parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorOptions {
    /// Isovalue. Densities `>= target` are solid.
    pub target: f32,
    /// World units per voxel along each axis.
    pub voxel_size: [f32; 3],
    /// World voxel position of the field's sample (0, 0, 0).
    pub origin: [i32; 3],
}

impl ExtractorOptions {
    /// Options for the chunk at `coord`, default target and voxel size.
    #[must_use]
    pub const fn for_chunk(coord: ChunkCoord, chunk_voxels: [u32; 3]) -> Self {
        Self {
            target: DEFAULT_TARGET,
            voxel_size: VOXEL_SIZE,
            origin: coord.origin_voxels(chunk_voxels),
        }
    }

    /// Replaces the isovalue.
    #[must_use]
    pub const fn with_target(mut self, target: f32) -> Self {
        self.target = target;
        self
    }

    /// Replaces the voxel size.
    #[must_use]
    pub const fn with_voxel_size(mut self, voxel_size: [f32; 3]) -> Self {
        self.voxel_size = voxel_size;
        self
    }
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            voxel_size: VOXEL_SIZE,
            origin: [0; 3],
        }
    }
}

/// Stateless Marching Cubes extractor.
///
/// Holds only its options; a single instance can mesh any number of fields
/// from any number of threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsosurfaceExtractor {
    options: ExtractorOptions,
}

impl IsosurfaceExtractor {
    /// Creates an extractor.
    #[must_use]
    pub const fn new(options: ExtractorOptions) -> Self {
        Self { options }
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Extracts the isosurface of `field`.
    #[must_use]
    pub fn meshify(&self, field: &VoxelField) -> ChunkMesh {
        let mut mesh = ChunkMesh::default();
        self.meshify_into(field, &mut mesh);
        mesh
    }

    /// Extracts the isosurface of `field` into `mesh`, reusing its buffers.
    ///
    /// Triangles with two coincident corners are dropped. They appear when a
    /// sample lies exactly on the target and would otherwise leave edges that
    /// no neighbouring triangle shares once vertices are welded.
    pub fn meshify_into(&self, field: &VoxelField, mesh: &mut ChunkMesh) {
        mesh.clear();
        let target = self.options.target;
        let [nx, ny, nz] = field.chunk_voxels();
        let vertex_limit = field
            .cube_count()
            .saturating_mul(MAX_VERTICES_PER_CUBE as usize);
        debug_assert!(u32::try_from(vertex_limit).is_ok());

        'march: for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let cube = fill_cube(field, x, y, z);
                    let Some(case) = classify(&cube, target) else {
                        mesh.skipped_cubes += 1;
                        continue;
                    };
                    if EDGE_TABLE[usize::from(case)] == 0 {
                        continue;
                    }
                    if self.march_cube(field, &cube, case, [x, y, z], mesh).is_none() {
                        warn!(
                            origin = ?self.options.origin,
                            vertices = mesh.vertices.len(),
                            "vertex count exceeds u32 indices, mesh truncated"
                        );
                        break 'march;
                    }
                }
            }
        }

        debug_assert!(mesh.vertex_count() <= vertex_limit);
        debug_assert!(mesh.triangle_count() <= ChunkMesh::max_triangles_for(field.cube_count()));
        trace!(
            origin = ?self.options.origin,
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            skipped = mesh.skipped_cubes,
            "meshified chunk"
        );
    }

    /// Emits the triangles of one classified cube.
    ///
    /// Vertices are pushed the first time a kept triangle uses their edge, so
    /// dropped triangles leave nothing behind. Returns None, with the cube
    /// left out entirely, if an index would not fit in a u32.
    fn march_cube(
        &self,
        field: &VoxelField,
        cube: &[f32; 8],
        case: u8,
        cell: [u32; 3],
        mesh: &mut ChunkMesh,
    ) -> Option<()> {
        let crossed = EDGE_TABLE[usize::from(case)];
        let [x, y, z] = cell;
        let normal = get_normal(field, x, y, z);

        let mut edge_vertex = [Vertex::default(); 12];
        for (edge, vertex) in edge_vertex.iter_mut().enumerate() {
            if crossed & (1 << edge) != 0 {
                *vertex = self.create_vertex(edge, cube, cell, normal);
            }
        }

        let vertex_mark = mesh.vertices.len();
        let index_mark = mesh.indices.len();
        let mut emitted: [Option<u32>; 12] = [None; 12];
        for tri in TRI_TABLE[usize::from(case)]
            .chunks_exact(3)
            .take_while(|tri| tri[0] >= 0)
        {
            let edges = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if is_degenerate(edges.map(|e| &edge_vertex[e])) {
                continue;
            }
            for edge in edges {
                let index = match emitted[edge] {
                    Some(index) => index,
                    None => {
                        let Ok(index) = u32::try_from(mesh.vertices.len()) else {
                            mesh.vertices.truncate(vertex_mark);
                            mesh.indices.truncate(index_mark);
                            return None;
                        };
                        mesh.vertices.push(edge_vertex[edge]);
                        emitted[edge] = Some(index);
                        index
                    }
                };
                mesh.indices.push(index);
            }
        }
        Some(())
    }

    /// Builds the vertex where `edge` of the cube at `cell` crosses the surface.
    ///
    /// The edge is walked from its lower-coordinate corner to its
    /// higher-coordinate corner, so the cubes sharing an edge (in this chunk
    /// or the next) compute exactly the same position.
    fn create_vertex(&self, edge: usize, cube: &[f32; 8], cell: [u32; 3], normal: Vec3) -> Vertex {
        let [mut a, mut b] = EDGE_CORNERS[edge];
        if CORNER_OFFSETS[a] > CORNER_OFFSETS[b] {
            std::mem::swap(&mut a, &mut b);
        }
        let t = get_offset(cube[a], cube[b], self.options.target);

        let mut position = [0.0f32; 3];
        for axis in 0..3 {
            let lo = CORNER_OFFSETS[a][axis];
            let step = (CORNER_OFFSETS[b][axis] - lo) as f32;
            let corner = (self.options.origin[axis] + (cell[axis] + lo) as i32) as f32;
            position[axis] = (corner + t * step) * self.options.voxel_size[axis];
        }
        Vertex::new(Vec3::from_array(position), normal)
    }
}

/// Extracts the isosurface of a field at the origin with unit voxels.
#[must_use]
pub fn meshify(field: &VoxelField, target: f32) -> ChunkMesh {
    IsosurfaceExtractor::new(ExtractorOptions::default().with_target(target)).meshify(field)
}

/// Reads the eight corner densities of the cube whose base cell is `(x, y, z)`.
#[inline]
#[must_use]
pub fn fill_cube(field: &VoxelField, x: u32, y: u32, z: u32) -> [f32; 8] {
    let mut cube = [0.0; 8];
    for (density, [dx, dy, dz]) in cube.iter_mut().zip(CORNER_OFFSETS) {
        *density = field.get(x + dx, y + dy, z + dz);
    }
    cube
}

/// Case index for a cube: bit `i` set when corner `i` is below `target`.
///
/// Returns None if any corner is NaN or infinite.
#[inline]
#[must_use]
pub fn classify(cube: &[f32; 8], target: f32) -> Option<u8> {
    let mut case = 0u8;
    for (i, &density) in cube.iter().enumerate() {
        if !density.is_finite() {
            return None;
        }
        if density < target {
            case |= 1 << i;
        }
    }
    Some(case)
}

/// Fraction of the way from `v1` to `v2` at which the density equals `target`.
///
/// Clamped to `[0, 1]`. Equal densities give the midpoint. The ratio is
/// taken in f64 so finite densities near `f32::MAX` cannot overflow it.
#[inline]
#[must_use]
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
pub fn get_offset(v1: f32, v2: f32, target: f32) -> f32 {
    if v1 == v2 {
        return 0.5;
    }
    let (v1, v2, target) = (f64::from(v1), f64::from(v2), f64::from(target));
    ((target - v1) / (v2 - v1)).clamp(0.0, 1.0) as f32
}

/// True when two corners of a triangle share a position.
#[inline]
#[allow(clippy::float_cmp)]
fn is_degenerate([a, b, c]: [&Vertex; 3]) -> bool {
    a.position == b.position || b.position == c.position || c.position == a.position
}

/// Surface normal at a cube's base cell from the density gradient.
///
/// Central differences, one-sided where `x - 1` (or y, z) would leave the
/// field. Falls back to +Y when the gradient is zero or not finite.
#[must_use]
pub fn get_normal(field: &VoxelField, x: u32, y: u32, z: u32) -> Vec3 {
    let gradient = Vec3::new(
        field.get(x.saturating_sub(1), y, z) - field.get(x + 1, y, z),
        field.get(x, y.saturating_sub(1), z) - field.get(x, y + 1, z),
        field.get(x, y, z.saturating_sub(1)) - field.get(x, y, z + 1),
    );
    gradient.normalize_or(Vec3::Y)
}
