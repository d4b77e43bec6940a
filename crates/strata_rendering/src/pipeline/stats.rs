//! Meshing statistics.

use std::fmt;
use std::time::Duration;

use crate::isosurface::ChunkMesh;

/// Totals for one or more meshing batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshingStats {
    /// Chunks meshed.
    pub chunks: u64,
    /// Chunks whose surface was empty.
    pub empty_chunks: u64,
    /// Vertices produced.
    pub vertices: u64,
    /// Triangles produced.
    pub triangles: u64,
    /// Cubes skipped for non-finite densities.
    pub skipped_cubes: u64,
    /// Chunks whose commit replaced live geometry.
    pub replaced: u64,
    /// Chunks the assembler rejected.
    pub failures: u64,
    /// Jobs dropped because a later job in the batch targeted the same chunk.
    pub superseded: u64,
    /// Wall-clock time spent meshing.
    pub elapsed: Duration,
}

impl MeshingStats {
    /// Adds one extracted mesh.
    pub fn record_mesh(&mut self, mesh: &ChunkMesh) {
        self.chunks += 1;
        if mesh.is_empty() {
            self.empty_chunks += 1;
        }
        self.vertices += mesh.vertices.len() as u64;
        self.triangles += mesh.triangle_count() as u64;
        self.skipped_cubes += u64::from(mesh.skipped_cubes);
    }

    /// Folds another batch into this one.
    pub fn merge(&mut self, other: &Self) {
        self.chunks += other.chunks;
        self.empty_chunks += other.empty_chunks;
        self.vertices += other.vertices;
        self.triangles += other.triangles;
        self.skipped_cubes += other.skipped_cubes;
        self.replaced += other.replaced;
        self.failures += other.failures;
        self.superseded += other.superseded;
        self.elapsed += other.elapsed;
    }

    /// Chunks meshed per second of wall-clock time.
    #[must_use]
    pub fn chunks_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.chunks as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for MeshingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunks ({} empty, {} replaced, {} failed), {} vertices, {} triangles, {} skipped cubes in {:?}",
            self.chunks,
            self.empty_chunks,
            self.replaced,
            self.failures,
            self.vertices,
            self.triangles,
            self.skipped_cubes,
            self.elapsed
        )
    }
}
