//! # Meshing Pipeline
//!
//! Meshes batches of chunks on scoped worker threads and commits the results
//! into a shared `ChunkGeometryAssembler`.
//!
//! ```text
//!   jobs ──► bounded queue ──► worker 0..N: meshify → reserve → commit
//!                                               │
//!   report ◄── sorted by chunk ◄── outcomes ◄───┘
//! ```
//!
//! Workers never share a field and the extractor holds no state, so the only
//! contention is the assembler's short reservation lock. Offsets depend on
//! commit order and therefore on scheduling; geometry does not.

mod config;
mod stats;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded};
use strata_core::VoxelField;
use strata_shared::ChunkCoord;
use tracing::{debug, warn};

pub use config::{ConfigError, MeshingConfig};
pub use stats::MeshingStats;

use crate::geometry::{
    AssemblerError, AssemblerResult, ChunkGeometryAssembler, GeometryBuffer, ReplacedChunk,
};
use crate::isosurface::{ExtractorOptions, IsosurfaceExtractor};

/// One chunk to mesh.
#[derive(Debug, Clone)]
pub struct MeshJob {
    /// Chunk coordinate, also its assembler key.
    pub coord: ChunkCoord,
    /// Populated density field.
    pub field: VoxelField,
}

impl MeshJob {
    /// Creates a job.
    #[must_use]
    pub const fn new(coord: ChunkCoord, field: VoxelField) -> Self {
        Self { coord, field }
    }
}

/// Result of meshing and committing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshOutcome {
    /// The chunk.
    pub coord: ChunkCoord,
    /// Vertices extracted.
    pub vertices: usize,
    /// Triangles extracted.
    pub triangles: usize,
    /// Cubes skipped for non-finite densities.
    pub skipped_cubes: u32,
    /// The committed record, or why the assembler refused it.
    pub result: AssemblerResult<ReplacedChunk>,
}

/// Everything a batch produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// One outcome per meshed chunk, in coordinate order.
    pub outcomes: Vec<MeshOutcome>,
    /// Batch totals.
    pub stats: MeshingStats,
}

impl PipelineReport {
    /// Outcomes the assembler rejected.
    pub fn failures(&self) -> impl Iterator<Item = (&ChunkCoord, &AssemblerError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.coord, e)))
    }
}

/// Parallel chunk mesher.
#[derive(Debug, Clone)]
pub struct MeshingPipeline {
    config: MeshingConfig,
    assembler: Arc<ChunkGeometryAssembler>,
}

impl MeshingPipeline {
    /// Creates a pipeline feeding `assembler`.
    #[must_use]
    pub fn new(config: MeshingConfig, assembler: Arc<ChunkGeometryAssembler>) -> Self {
        Self { config, assembler }
    }

    /// Creates a pipeline with a fresh assembler sized by `config`.
    ///
    /// # Errors
    ///
    /// `Invalid` if the configuration does not validate.
    pub fn from_config(config: MeshingConfig) -> Result<Self, ConfigError> {
        let assembler = Arc::new(config.build_assembler()?);
        Ok(Self::new(config, assembler))
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &MeshingConfig {
        &self.config
    }

    /// The assembler results are committed to.
    #[must_use]
    pub const fn assembler(&self) -> &Arc<ChunkGeometryAssembler> {
        &self.assembler
    }

    /// Extraction options for a job. The origin comes from the field's own
    /// chunk size so fields of any size land where they belong.
    fn options_for(&self, job: &MeshJob) -> ExtractorOptions {
        ExtractorOptions::for_chunk(job.coord, job.field.chunk_voxels())
            .with_target(self.config.target)
            .with_voxel_size(self.config.voxel_size)
    }

    /// Meshes one chunk on the calling thread and commits it, replacing any
    /// live geometry for the chunk.
    #[must_use]
    pub fn mesh_chunk(&self, job: &MeshJob) -> MeshOutcome {
        let mesh = IsosurfaceExtractor::new(self.options_for(job)).meshify(&job.field);

        let result = GeometryBuffer::Vertex
            .count(job.coord, mesh.vertices.len())
            .and_then(|vertices| {
                let indices = GeometryBuffer::Index.count(job.coord, mesh.indices.len())?;
                self.assembler.reserve(job.coord, vertices, indices)
            })
            .and_then(|reservation| reservation.commit(&mesh.vertices, &mesh.indices));

        if let Err(err) = &result {
            warn!(chunk = ?job.coord, %err, "chunk geometry rejected");
        }
        MeshOutcome {
            coord: job.coord,
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            skipped_cubes: mesh.skipped_cubes,
            result,
        }
    }

    /// Meshes a batch on `worker_threads` scoped threads.
    ///
    /// When several jobs target the same chunk only the last one is meshed.
    /// Outcomes come back in coordinate order whatever order workers finish.
    #[must_use]
    pub fn mesh_chunks(&self, jobs: Vec<MeshJob>) -> PipelineReport {
        let start = Instant::now();
        let submitted = jobs.len();

        let mut unique: BTreeMap<ChunkCoord, MeshJob> = BTreeMap::new();
        for job in jobs {
            unique.insert(job.coord, job);
        }
        let superseded = (submitted - unique.len()) as u64;

        let workers = self.config.worker_threads.clamp(1, unique.len().max(1));
        let (job_tx, job_rx) = bounded::<MeshJob>(workers * 2);
        let (out_tx, out_rx) = unbounded::<MeshOutcome>();

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let out_tx = out_tx.clone();
                scope.spawn(move || {
                    for job in job_rx {
                        if out_tx.send(self.mesh_chunk(&job)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(out_tx);

            for job in unique.into_values() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            drop(job_tx);
        });

        let mut outcomes: Vec<MeshOutcome> = out_rx.into_iter().collect();
        outcomes.sort_unstable_by_key(|o| o.coord);

        let mut stats = MeshingStats {
            superseded,
            ..MeshingStats::default()
        };
        for outcome in &outcomes {
            stats.chunks += 1;
            stats.vertices += outcome.vertices as u64;
            stats.triangles += outcome.triangles as u64;
            stats.skipped_cubes += u64::from(outcome.skipped_cubes);
            if outcome.triangles == 0 {
                stats.empty_chunks += 1;
            }
            match &outcome.result {
                Ok(ReplacedChunk { previous: Some(_), .. }) => stats.replaced += 1,
                Ok(_) => {}
                Err(_) => stats.failures += 1,
            }
        }
        stats.elapsed = start.elapsed();

        debug!(
            chunks = stats.chunks,
            triangles = stats.triangles,
            failures = stats.failures,
            workers,
            "meshed batch"
        );
        PipelineReport { outcomes, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryCapacity;

    fn ball(coord: ChunkCoord) -> MeshJob {
        MeshJob::new(
            coord,
            VoxelField::from_fn([4, 4, 4], |x, y, z| {
                let d = |v: u32| v as f32 - 2.2;
                1.6 - (d(x) * d(x) + d(y) * d(y) + d(z) * d(z)).sqrt()
            }),
        )
    }

    fn pipeline(threads: usize) -> MeshingPipeline {
        let config = MeshingConfig {
            worker_threads: threads,
            vertex_capacity: 4096,
            index_capacity: 8192,
            meshlet_capacity: 256,
            meshlet_max_indices: 12,
            ..MeshingConfig::default()
        };
        MeshingPipeline::from_config(config).unwrap()
    }

    #[test]
    fn test_batch_outcomes_sorted() {
        let pipeline = pipeline(3);
        let coords = [
            ChunkCoord::new(2, 0, 0),
            ChunkCoord::new(0, 0, 1),
            ChunkCoord::new(0, 0, 0),
        ];
        let report = pipeline.mesh_chunks(coords.iter().map(|&c| ball(c)).collect());

        let got: Vec<_> = report.outcomes.iter().map(|o| o.coord).collect();
        assert_eq!(got, vec![coords[2], coords[1], coords[0]]);
        assert_eq!(report.stats.chunks, 3);
        assert_eq!(report.stats.failures, 0);
        assert!(report.stats.triangles > 0);
        assert_eq!(pipeline.assembler().live_count(), 3);
        pipeline.assembler().validate().unwrap();
    }

    #[test]
    fn test_duplicate_jobs_keep_last() {
        let pipeline = pipeline(2);
        let coord = ChunkCoord::new(0, 0, 0);
        let empty = MeshJob::new(coord, VoxelField::new([4, 4, 4]));
        let report = pipeline.mesh_chunks(vec![ball(coord), empty]);

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.stats.superseded, 1);
        assert_eq!(report.stats.empty_chunks, 1);
    }

    #[test]
    fn test_remesh_replaces_and_retires() {
        let pipeline = pipeline(1);
        let coord = ChunkCoord::new(0, 0, 0);
        let first = pipeline.mesh_chunk(&ball(coord));
        let second = pipeline.mesh_chunk(&ball(coord));

        let first = first.result.unwrap();
        let second = second.result.unwrap();
        assert_eq!(first.previous, None);
        assert_eq!(second.previous, Some(first.current));
        assert_eq!(pipeline.assembler().retired_count(), 1);
    }

    #[test]
    fn test_capacity_failures_are_reported() {
        let assembler = Arc::new(ChunkGeometryAssembler::new(GeometryCapacity::new(8, 8, 8), 3));
        let pipeline = MeshingPipeline::new(MeshingConfig::default(), assembler);
        let report = pipeline.mesh_chunks(vec![ball(ChunkCoord::new(0, 0, 0))]);

        assert_eq!(report.stats.failures, 1);
        assert_eq!(report.failures().count(), 1);
        assert!(pipeline.assembler().validate().is_ok());
    }

    #[test]
    fn test_empty_batch() {
        let report = pipeline(4).mesh_chunks(Vec::new());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.stats.chunks, 0);
    }
}
