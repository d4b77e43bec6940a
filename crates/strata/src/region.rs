//! Meshing a box of chunks from one density function.

use strata_procedural::{generate_chunk, DensityFunction};
use strata_rendering::pipeline::{MeshJob, MeshingPipeline, PipelineReport};
use strata_shared::ChunkCoord;
use tracing::debug;

/// Inclusive box of chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRegion {
    /// Minimum corner.
    pub min: ChunkCoord,
    /// Maximum corner, inclusive.
    pub max: ChunkCoord,
}

impl ChunkRegion {
    /// Region spanning `min..=max` on every axis.
    #[must_use]
    pub const fn new(min: ChunkCoord, max: ChunkCoord) -> Self {
        Self { min, max }
    }

    /// Cube of chunks within `radius` of `center` along each axis.
    #[must_use]
    pub const fn around(center: ChunkCoord, radius: i32) -> Self {
        Self {
            min: center.offset(-radius, -radius, -radius),
            max: center.offset(radius, radius, radius),
        }
    }

    /// Number of chunks in the region.
    #[must_use]
    pub fn len(&self) -> usize {
        let span = |lo: i32, hi: i32| usize::try_from(hi - lo + 1).unwrap_or(0);
        span(self.min.x, self.max.x) * span(self.min.y, self.max.y) * span(self.min.z, self.max.z)
    }

    /// True if `min` exceeds `max` on some axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `coord` lies in the region.
    #[must_use]
    pub const fn contains(&self, coord: ChunkCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// Every coordinate, x fastest.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> {
        let Self { min, max } = *self;
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ChunkCoord::new(x, y, z)))
        })
    }
}

/// Samples `density` for every chunk in `region` and meshes the lot.
pub fn mesh_region<D>(pipeline: &MeshingPipeline, density: &D, region: ChunkRegion) -> PipelineReport
where
    D: DensityFunction + ?Sized,
{
    let chunk_voxels = pipeline.config().chunk_voxels;
    let jobs: Vec<MeshJob> = region
        .coords()
        .map(|coord| MeshJob::new(coord, generate_chunk(coord, chunk_voxels, density)))
        .collect();
    debug!(chunks = jobs.len(), ?region, "sampled region");
    pipeline.mesh_chunks(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_size_and_order() {
        let region = ChunkRegion::new(ChunkCoord::new(-1, 0, 0), ChunkCoord::new(0, 1, 0));
        assert_eq!(region.len(), 4);
        let coords: Vec<_> = region.coords().collect();
        assert_eq!(
            coords,
            vec![
                ChunkCoord::new(-1, 0, 0),
                ChunkCoord::new(0, 0, 0),
                ChunkCoord::new(-1, 1, 0),
                ChunkCoord::new(0, 1, 0),
            ]
        );
        assert!(coords.iter().all(|&c| region.contains(c)));
        assert!(!region.contains(ChunkCoord::new(1, 0, 0)));
    }

    #[test]
    fn test_inverted_region_is_empty() {
        let region = ChunkRegion::new(ChunkCoord::new(1, 0, 0), ChunkCoord::new(0, 0, 0));
        assert!(region.is_empty());
        assert_eq!(region.coords().count(), 0);
    }

    #[test]
    fn test_around() {
        let region = ChunkRegion::around(ChunkCoord::new(0, 0, 0), 1);
        assert_eq!(region.len(), 27);
    }
}
