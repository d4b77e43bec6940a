//! # STRATA Mesh
//!
//! Meshes a cube of chunks around the origin and prints what the geometry
//! buffers ended up holding.
//!
//! ```text
//! strata_mesh [sphere|plane|terrain] [radius] [config.toml]
//! ```

use std::process::ExitCode;

use strata::procedural::{DensityFunction, NoiseTerrain, PlaneDensity, Seed, SphereDensity};
use strata::shared::ChunkCoord;
use strata::{mesh_region, ChunkRegion, MeshingConfig, MeshingPipeline};

fn usage() -> ExitCode {
    eprintln!("usage: strata_mesh [sphere|plane|terrain] [radius] [config.toml]");
    ExitCode::FAILURE
}

fn density_for(kind: &str, config: &MeshingConfig) -> Option<Box<dyn DensityFunction>> {
    let [cx, cy, cz] = config.chunk_voxels.map(|n| n as f32);
    match kind {
        "sphere" => Some(Box::new(SphereDensity::new(
            [cx * 0.5 + 0.3, cy * 0.5 - 0.2, cz * 0.5 + 0.1],
            cx.min(cy).min(cz) * 1.2,
        ))),
        "plane" => Some(Box::new(PlaneDensity::new(cy * 0.5 + 0.25))),
        "terrain" => Some(Box::new(NoiseTerrain::with_seed(Seed::new(2024)))),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let kind = args.first().map_or("terrain", String::as_str);
    let Ok(radius) = args.get(1).map_or(Ok(1), |r| r.parse::<i32>()) else {
        return usage();
    };
    if radius < 0 {
        return usage();
    }

    let config = match args.get(2) {
        Some(path) => match MeshingConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("❌ {err}");
                return ExitCode::FAILURE;
            }
        },
        None => MeshingConfig::default(),
    };
    let Some(density) = density_for(kind, &config) else {
        return usage();
    };
    let pipeline = match MeshingPipeline::from_config(config) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            eprintln!("❌ {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("═══════════════════════════════════════════════════════════════");
    println!("  STRATA MESH: {kind}, radius {radius}");
    println!("═══════════════════════════════════════════════════════════════");

    let region = ChunkRegion::around(ChunkCoord::new(0, 0, 0), radius);
    let report = mesh_region(&pipeline, &*density, region);
    let usage = pipeline.assembler().occupied();

    println!("  {}", report.stats);
    println!(
        "  throughput: {:.1} chunks/s",
        report.stats.chunks_per_second()
    );
    println!(
        "  vertices: {} / {}",
        usage.vertices.allocated, usage.vertices.capacity
    );
    println!(
        "  indices:  {} / {}",
        usage.indices.allocated, usage.indices.capacity
    );
    println!(
        "  meshlets: {} / {}",
        usage.meshlets.allocated, usage.meshlets.capacity
    );

    for (coord, err) in report.failures() {
        println!("  ⚠ chunk ({}, {}, {}): {err}", coord.x, coord.y, coord.z);
    }
    if let Err(err) = pipeline.assembler().validate() {
        eprintln!("❌ {err}");
        return ExitCode::FAILURE;
    }

    println!("  ✅ geometry buffers consistent");
    ExitCode::SUCCESS
}
