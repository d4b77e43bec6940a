//! # STRATA Procedural
//!
//! Deterministic density fields for meshing.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same field
//! 2. **World-space**: Chunks sample a shared function, so borders agree
//! 3. **Pure**: Density functions hold no mutable state and are `Send + Sync`
//!
//! ## Core Components
//!
//! - `GradientNoise`: seeded 3D gradient noise
//! - `DensityFunction`: sphere, plane and noise terrain implementations
//! - `fill_chunk` / `generate_chunk`: populate a `VoxelField` for a chunk
//!
//! ## Example
//!
//! ```rust
//! use strata_procedural::{generate_chunk, SphereDensity};
//! use strata_shared::ChunkCoord;
//!
//! let sphere = SphereDensity::new([4.0, 4.0, 4.0], 3.0);
//! let field = generate_chunk(ChunkCoord::new(0, 0, 0), [8, 8, 8], &sphere);
//! assert!(field.get(4, 4, 4) > 0.0);
//! assert!(field.get(0, 0, 0) < 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod density;
pub mod generator;
pub mod noise;

pub use density::{DensityFunction, NoiseTerrain, PlaneDensity, SphereDensity, TerrainParams};
pub use generator::{fill_chunk, generate_chunk};
pub use noise::{GradientNoise, Seed};
