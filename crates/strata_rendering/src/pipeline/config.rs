//! Meshing configuration.
//!
//! Loaded once at startup from TOML. Every key is optional and falls back to
//! the compile-time constants in `strata_shared::constants`.
//!
//! ```toml
//! target = 0.0
//! voxel_size = [0.5, 0.5, 0.5]
//! chunk_voxels = [32, 32, 32]
//! meshlet_max_indices = 384
//! worker_threads = 8
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_shared::constants::{
    DEFAULT_INDEX_CAPACITY, DEFAULT_MESHLET_CAPACITY, DEFAULT_VERTEX_CAPACITY,
    DEFAULT_WORKER_THREADS,
};
use strata_shared::{ChunkCoord, CHUNK_VOXELS, DEFAULT_TARGET, MESHLET_MAX_INDICES, VOXEL_SIZE};
use thiserror::Error;

use crate::geometry::{ChunkGeometryAssembler, GeometryCapacity};
use crate::isosurface::ExtractorOptions;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML did not parse or had unknown keys.
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written back out.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Meshing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshingConfig {
    /// Isovalue. Densities `>= target` are solid.
    pub target: f32,
    /// World units per voxel along each axis.
    pub voxel_size: [f32; 3],
    /// Voxels per chunk along each axis, border excluded.
    pub chunk_voxels: [u32; 3],
    /// Most indices per meshlet. A positive multiple of 3.
    pub meshlet_max_indices: u32,
    /// Vertex buffer capacity.
    pub vertex_capacity: u32,
    /// Index buffer capacity.
    pub index_capacity: u32,
    /// Meshlet buffer capacity.
    pub meshlet_capacity: u32,
    /// Meshing worker threads.
    pub worker_threads: usize,
}

impl Default for MeshingConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            voxel_size: VOXEL_SIZE,
            chunk_voxels: CHUNK_VOXELS,
            meshlet_max_indices: MESHLET_MAX_INDICES,
            vertex_capacity: DEFAULT_VERTEX_CAPACITY,
            index_capacity: DEFAULT_INDEX_CAPACITY,
            meshlet_capacity: DEFAULT_MESHLET_CAPACITY,
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl MeshingConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed TOML or unknown keys, `Invalid` for values out
    /// of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as `from_toml_str`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// `Serialize` if a value has no TOML representation.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// `Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !self.target.is_finite() {
            return invalid(format!("target must be finite, got {}", self.target));
        }
        if self.voxel_size.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return invalid(format!(
                "voxel_size must be positive and finite, got {:?}",
                self.voxel_size
            ));
        }
        if self.chunk_voxels.iter().any(|&n| n == 0) {
            return invalid(format!(
                "chunk_voxels must be non-zero, got {:?}",
                self.chunk_voxels
            ));
        }
        if self.meshlet_max_indices == 0 || self.meshlet_max_indices % 3 != 0 {
            return invalid(format!(
                "meshlet_max_indices must be a positive multiple of 3, got {}",
                self.meshlet_max_indices
            ));
        }
        if self.vertex_capacity == 0 || self.index_capacity == 0 || self.meshlet_capacity == 0 {
            return invalid("buffer capacities must be non-zero".to_string());
        }
        if self.worker_threads == 0 {
            return invalid("worker_threads must be at least 1".to_string());
        }
        Ok(())
    }

    /// Buffer capacities.
    #[must_use]
    pub const fn capacity(&self) -> GeometryCapacity {
        GeometryCapacity::new(self.vertex_capacity, self.index_capacity, self.meshlet_capacity)
    }

    /// Extraction options for the chunk at `coord`.
    #[must_use]
    pub const fn extractor_options(&self, coord: ChunkCoord) -> ExtractorOptions {
        ExtractorOptions::for_chunk(coord, self.chunk_voxels)
            .with_target(self.target)
            .with_voxel_size(self.voxel_size)
    }

    /// An empty assembler sized by this configuration.
    ///
    /// # Errors
    ///
    /// `Invalid` if the configuration does not validate.
    pub fn build_assembler(&self) -> Result<ChunkGeometryAssembler, ConfigError> {
        self.validate()?;
        Ok(ChunkGeometryAssembler::new(
            self.capacity(),
            self.meshlet_max_indices,
        ))
    }
}
